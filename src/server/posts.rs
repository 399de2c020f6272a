use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::AppState;
use super::dto::PostCreateRequest;
use super::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::auth::RequireUser;
use crate::types::PostWithAuthor;

/// POST /posts/ - create a post owned by the acting user.
pub async fn create_post(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .store
        .create_post(&req.title, &req.content, user.id)
        .api_err("Failed to create post")?;

    Ok((
        StatusCode::CREATED,
        Json(PostWithAuthor {
            id: post.id,
            title: post.title,
            content: post.content,
            author: user.username,
        }),
    ))
}

/// GET /posts/ - list all posts with author usernames.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.store.list_posts().api_err("Failed to list posts")?;
    Ok(Json(posts))
}

/// PUT /posts/{id}/ - overwrite title and content; owner only.
pub async fn update_post(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .store
        .get_post(id)
        .api_err("Failed to get post")?
        .or_not_found("Post not found")?;

    if post.user_id != user.id {
        return Err(ApiError::forbidden("Not authorized"));
    }

    let updated = state
        .store
        .update_post(id, &req.title, &req.content)
        .api_err("Failed to update post")?;

    Ok(Json(PostWithAuthor {
        id: updated.id,
        title: updated.title,
        content: updated.content,
        author: user.username,
    }))
}

/// DELETE /posts/{id}/ - remove a post; owner only.
pub async fn delete_post(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .store
        .get_post(id)
        .api_err("Failed to get post")?
        .or_not_found("Post not found")?;

    if post.user_id != user.id {
        return Err(ApiError::forbidden("Not authorized"));
    }

    state.store.delete_post(id).api_err("Failed to delete post")?;

    Ok(Json(json!({ "detail": "Post deleted" })))
}
