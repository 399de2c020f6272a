//! PDF ingestion: split into per-page text, embed each page, and upsert the
//! batch into the vector store.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::genai::{EmbedTask, EmbeddingClient};
use crate::types::{ChunkPayload, ChunkPoint};
use crate::vector::VectorStore;

/// Deterministic chunk id for a (filename, page) pair. Re-ingesting the same
/// page always produces the same id, so the upsert overwrites instead of
/// appending.
#[must_use]
pub fn chunk_id(filename: &str, page: u32) -> String {
    Uuid::new_v5(
        &Uuid::NAMESPACE_DNS,
        format!("{filename}_{page}").as_bytes(),
    )
    .to_string()
}

/// Ingests a PDF and returns the number of chunks stored.
///
/// One chunk per non-empty page. A page whose embedding fails for any reason
/// other than retry exhaustion is dropped with a warning rather than failing
/// the whole upload; rate-limit exhaustion propagates because every later
/// page would hit the same limit.
pub async fn ingest_pdf(
    embedder: &dyn EmbeddingClient,
    vectors: &dyn VectorStore,
    bytes: &[u8],
    filename: &str,
) -> Result<usize> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| Error::BadRequest(format!("could not read PDF: {e}")))?;

    tracing::info!("processing {filename}: {} pages", pages.len());

    let mut points = Vec::new();

    for (page_index, text) in pages.iter().enumerate() {
        if text.trim().is_empty() {
            continue;
        }

        let page = page_index as u32;
        let vector = match embedder.embed(text, EmbedTask::Document).await {
            Ok(v) => v,
            Err(e @ Error::RateLimitExceeded(_)) => return Err(e),
            Err(e) => {
                tracing::warn!("skipping {filename} page {page}: {e}");
                continue;
            }
        };

        points.push(ChunkPoint {
            id: chunk_id(filename, page),
            vector,
            payload: ChunkPayload {
                text: text.clone(),
                filename: filename.to_string(),
                page,
            },
        });
    }

    if points.is_empty() {
        return Ok(0);
    }

    let count = points.len();
    vectors.upsert(points).await?;

    tracing::info!("stored {count} chunks for {filename}");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_is_deterministic() {
        let a = chunk_id("notes.pdf", 0);
        let b = chunk_id("notes.pdf", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_chunk_id_varies_by_page_and_file() {
        assert_ne!(chunk_id("notes.pdf", 0), chunk_id("notes.pdf", 1));
        assert_ne!(chunk_id("notes.pdf", 0), chunk_id("other.pdf", 0));
    }

    #[test]
    fn test_chunk_id_is_uuid() {
        let id = chunk_id("notes.pdf", 3);
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
