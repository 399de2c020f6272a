use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Query, State},
    response::IntoResponse,
};
use serde_json::json;

use super::AppState;
use super::dto::{AskParams, FlashcardParams, SearchParams, UploadResponse};
use super::response::ApiError;
use crate::rag;

/// POST /upload-pdf/ - multipart PDF upload; returns the stored chunk count.
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ApiError::bad_request("Missing filename"))?
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;

        file = Some((filename, bytes.to_vec()));
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::bad_request("Missing file field"))?;

    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::bad_request("File must be a PDF"));
    }

    let chunks = rag::ingest_pdf(
        state.embedder.as_ref(),
        state.vectors.as_ref(),
        &bytes,
        &filename,
    )
    .await?;

    Ok(Json(UploadResponse {
        message: "PDF Processed",
        chunks,
    }))
}

/// GET /ask/?question= - retrieval-augmented answer with citations.
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AskParams>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = rag::answer_question(
        state.embedder.as_ref(),
        state.vectors.as_ref(),
        state.generator.as_ref(),
        &params.question,
    )
    .await?;

    Ok(Json(outcome))
}

/// GET /search/?query= - single best semantic match.
pub async fn search_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let best = rag::search_documents(
        state.embedder.as_ref(),
        state.vectors.as_ref(),
        &params.query,
    )
    .await?;

    match best {
        Some(hit) => Ok(Json(hit).into_response()),
        None => Ok(Json(json!({ "message": "No matches found" })).into_response()),
    }
}

/// POST /create-flashcard/?topic= - generate a Q/A flashcard from the best match.
pub async fn create_flashcard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FlashcardParams>,
) -> Result<impl IntoResponse, ApiError> {
    let result = rag::create_flashcard(
        state.embedder.as_ref(),
        state.vectors.as_ref(),
        state.generator.as_ref(),
        &params.topic,
    )
    .await?;

    let Some((best, outcome)) = result else {
        return Ok(Json(json!({
            "error": "No relevant content found in the PDF for this topic."
        })));
    };

    Ok(Json(json!({
        "topic": params.topic,
        "flashcard": outcome,
        "source": best.filename,
        "filename": best.filename,
        "page": best.page,
    })))
}
