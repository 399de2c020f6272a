use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
}

/// A post joined with its owner's username, the shape returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithAuthor {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
}

/// Payload stored alongside each vector. Older ingests wrote the page number
/// under `page_num`; both keys are accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub text: String,
    pub filename: String,
    #[serde(alias = "page_num")]
    pub page: u32,
}

/// A point to upsert into the vector store. The id is a UUIDv5 derived from
/// (filename, page), so re-ingesting the same page overwrites it.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

/// A nearest-neighbor hit returned from the vector store.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub score: f32,
    pub payload: ChunkPayload,
}
