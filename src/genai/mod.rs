mod embedding;
mod generation;

pub use embedding::{EmbedTask, EmbeddingClient, GeminiEmbedder};
pub use generation::{GeminiGenerator, GenerationClient};
