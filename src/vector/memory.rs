//! In-memory [`VectorStore`] used when no Qdrant endpoint is configured,
//! and in tests. Search is brute-force cosine similarity over all points.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::VectorStore;
use crate::error::Result;
use crate::types::{ChunkPayload, ChunkPoint, ScoredChunk};

pub struct MemoryStore {
    points: RwLock<HashMap<String, (Vec<f32>, ChunkPayload)>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.points.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ensure_collection(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, points: Vec<ChunkPoint>) -> Result<()> {
        let mut stored = self.points.write().unwrap_or_else(|e| e.into_inner());
        for point in points {
            stored.insert(point.id, (point.vector, point.payload));
        }
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let stored = self.points.read().unwrap_or_else(|e| e.into_inner());

        let mut hits: Vec<ScoredChunk> = stored
            .values()
            .map(|(v, payload)| ScoredChunk {
                score: cosine_sim(vector, v),
                payload: payload.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str, vector: Vec<f32>, text: &str, page: u32) -> ChunkPoint {
        ChunkPoint {
            id: id.to_string(),
            vector,
            payload: ChunkPayload {
                text: text.to_string(),
                filename: "notes.pdf".to_string(),
                page,
            },
        }
    }

    #[tokio::test]
    async fn test_upsert_same_id_overwrites() {
        let store = MemoryStore::new();

        store
            .upsert(vec![point("a", vec![1.0, 0.0], "old", 0)])
            .await
            .unwrap();
        store
            .upsert(vec![point("a", vec![1.0, 0.0], "new", 0)])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let hits = store.search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(hits[0].payload.text, "new");
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let store = MemoryStore::new();
        store
            .upsert(vec![
                point("a", vec![1.0, 0.0], "near", 0),
                point("b", vec![0.0, 1.0], "far", 1),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.1], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].payload.text, "near");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_search_empty_store() {
        let store = MemoryStore::new();
        let hits = store.search(&[1.0, 0.0], 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_limit_truncates() {
        let store = MemoryStore::new();
        store
            .upsert(vec![
                point("a", vec![1.0, 0.0], "a", 0),
                point("b", vec![0.9, 0.1], "b", 1),
                point("c", vec![0.8, 0.2], "c", 2),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }
}
