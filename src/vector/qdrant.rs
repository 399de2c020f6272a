//! [`VectorStore`] backed by the Qdrant REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{VECTOR_DIMS, VectorStore};
use crate::error::{Error, Result};
use crate::types::{ChunkPayload, ChunkPoint, ScoredChunk};

const COLLECTION_NAME: &str = "pdf_collection";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    result: ExistsResult,
}

#[derive(Debug, Deserialize)]
struct ExistsResult {
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    points: Vec<QueryPoint>,
}

#[derive(Debug, Deserialize)]
struct QueryPoint {
    score: f32,
    payload: ChunkPayload,
}

impl QdrantStore {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Upstream(format!("qdrant error {status}: {body}")))
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self) -> Result<()> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/collections/{COLLECTION_NAME}/exists"),
            )
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let exists: ExistsResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("invalid qdrant response: {e}")))?;

        if exists.result.exists {
            return Ok(());
        }

        let body = json!({
            "vectors": { "size": VECTOR_DIMS, "distance": "Cosine" }
        });

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{COLLECTION_NAME}"),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;
        Self::check_status(response).await?;

        tracing::info!("created qdrant collection '{COLLECTION_NAME}'");
        Ok(())
    }

    async fn upsert(&self, points: Vec<ChunkPoint>) -> Result<()> {
        let body = json!({ "points": points });

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{COLLECTION_NAME}/points?wait=true"),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let body = json!({
            "query": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{COLLECTION_NAME}/points/query"),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let parsed: QueryResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("invalid qdrant response: {e}")))?;

        Ok(parsed
            .result
            .points
            .into_iter()
            .map(|p| ScoredChunk {
                score: p.score,
                payload: p.payload,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_parses_payload() {
        let raw = r#"{
            "result": { "points": [
                { "id": "x", "score": 0.87,
                  "payload": { "text": "body", "filename": "notes.pdf", "page": 3 } }
            ]},
            "status": "ok", "time": 0.001
        }"#;

        let parsed: QueryResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.result.points.len(), 1);
        assert_eq!(parsed.result.points[0].payload.page, 3);
    }

    #[test]
    fn test_legacy_page_num_key_accepted() {
        let raw = r#"{ "text": "body", "filename": "old.pdf", "page_num": 7 }"#;
        let payload: ChunkPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.page, 7);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = QdrantStore::new("http://localhost:6333/", None).unwrap();
        assert_eq!(store.base_url, "http://localhost:6333");
    }
}
