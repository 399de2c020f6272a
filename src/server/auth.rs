use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use super::AppState;
use super::dto::{LoginRequest, LoginResponse, LoginUser, SignupRequest, UserOut};
use super::response::{ApiError, StoreResultExt};
use crate::error::Error;

/// POST /signup/ - create a user; 400 when the email is taken.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = state
        .passwords
        .hash(&req.password)
        .api_err("Failed to hash password")?;

    let user = state
        .store
        .create_user(&req.username, &req.email, &password_hash)
        .map_err(|e| match e {
            Error::EmailTaken => ApiError::bad_request("Email already registered"),
            _ => ApiError::internal("Failed to create user"),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(UserOut {
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    ))
}

/// POST /login/ - verify credentials and issue a session token.
/// The same 400 is returned for unknown email and wrong password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .store
        .get_user_by_email(&req.email)
        .api_err("Failed to look up user")?
        .ok_or_else(|| ApiError::bad_request("Invalid email or password"))?;

    let valid = state
        .passwords
        .verify(&req.password, &user.password_hash)
        .api_err("Failed to verify password")?;

    if !valid {
        return Err(ApiError::bad_request("Invalid email or password"));
    }

    let access_token = state
        .tokens
        .issue(user.id)
        .api_err("Failed to issue token")?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer",
        user: LoginUser {
            id: user.id,
            username: user.username,
        },
    }))
}

/// GET /users/ - list all users.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.store.list_users().api_err("Failed to list users")?;

    let users: Vec<UserOut> = users
        .into_iter()
        .map(|u| UserOut {
            id: u.id,
            username: u.username,
            email: u.email,
        })
        .collect();

    Ok(Json(users))
}
