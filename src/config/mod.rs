mod server;

pub use server::{GenAiConfig, ServerConfig};
