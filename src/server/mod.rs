mod auth;
pub mod dto;
mod posts;
mod rag;
pub mod response;
mod router;

pub use router::{AppState, create_router};
