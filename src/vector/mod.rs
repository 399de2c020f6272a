mod memory;
mod qdrant;

pub use memory::MemoryStore;
pub use qdrant::QdrantStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChunkPoint, ScoredChunk};

/// Dimensionality of the embedding vectors stored in the collection.
pub const VECTOR_DIMS: usize = 768;

/// VectorStore defines the nearest-neighbor index interface.
///
/// Point ids are deterministic, so upserting a point that already exists
/// overwrites it; concurrent writers for the same id race with
/// last-writer-wins semantics.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the backing collection if it does not exist yet.
    async fn ensure_collection(&self) -> Result<()>;

    /// Inserts or overwrites a batch of points.
    async fn upsert(&self, points: Vec<ChunkPoint>) -> Result<()>;

    /// Returns up to `limit` nearest points by cosine distance, best first.
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;
}
