mod models;

pub use models::{ChunkPayload, ChunkPoint, Post, PostWithAuthor, ScoredChunk, User};
