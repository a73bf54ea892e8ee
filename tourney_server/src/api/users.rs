//! User account API handlers.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:3000/api/users/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "hunter2"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:3000/api/users/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "hunter2"}'
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tourney::auth::{AuthError, LoginRequest, RegisterRequest, UserId};

use super::AppState;
use super::errors::ApiResult;
use crate::{logging, metrics};

/// Missing fields deserialize as empty so the directory reports which one
#[derive(Debug, Deserialize)]
pub struct CredentialsPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user_id: UserId,
    pub username: String,
}

/// Register a new user account.
///
/// # Response
///
/// `201 Created` with `{"id": 1, "username": "alice"}`.
///
/// # Errors
///
/// - `400 Bad Request`: Missing field or invalid username
/// - `409 Conflict`: Username already exists
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(payload) = payload?;

    let user = state
        .auth_manager
        .register(RegisterRequest {
            username: payload.username,
            password: payload.password,
        })
        .await?;

    metrics::registrations_total();
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

/// Check credentials and return the user's identity.
///
/// # Response
///
/// `200 OK` with `{"message": "...", "userId": 1, "username": "alice"}`.
///
/// # Errors
///
/// - `400 Bad Request`: Missing field
/// - `401 Unauthorized`: Unknown user or wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsPayload>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(payload) = payload?;
    let username = payload.username.clone();

    let result = state
        .auth_manager
        .login(LoginRequest {
            username: payload.username,
            password: payload.password,
        })
        .await;

    match result {
        Ok(user) => {
            metrics::login_attempts_total(true);
            Ok(Json(LoginResponse {
                message: "Login bem-sucedido!".to_string(),
                user_id: user.id,
                username: user.username,
            }))
        }
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                metrics::login_attempts_total(false);
                logging::log_security_event("failed_login", None, &username, "Invalid credentials");
            }
            Err(e.into())
        }
    }
}
