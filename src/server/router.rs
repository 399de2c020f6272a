use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use serde_json::json;

use super::{auth, posts, rag};
use crate::auth::{PasswordHasher, TokenSigner};
use crate::genai::{EmbeddingClient, GenerationClient};
use crate::store::Store;
use crate::vector::VectorStore;

const MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;

/// Shared application state. All collaborators are injected once at startup;
/// handlers never reach for globals.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub vectors: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn EmbeddingClient>,
    pub generator: Arc<dyn GenerationClient>,
    pub tokens: TokenSigner,
    pub passwords: PasswordHasher,
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to Quill" }))
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Auth + users
        .route("/signup/", post(auth::signup))
        .route("/login/", post(auth::login))
        .route("/users/", get(auth::list_users))
        // Posts
        .route("/posts/", post(posts::create_post))
        .route("/posts/", get(posts::list_posts))
        .route("/posts/{id}/", put(posts::update_post))
        .route("/posts/{id}/", delete(posts::delete_post))
        // RAG
        .route("/upload-pdf/", post(rag::upload_pdf))
        .route("/ask/", get(rag::ask_question))
        .route("/search/", get(rag::search_documents))
        .route("/create-flashcard/", post(rag::create_flashcard))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
