//! HTTP API for the tournament server.
//!
//! # Endpoints Overview
//!
//! ```text
//! POST /api/users/register              - Register user
//! POST /api/users/login                 - Check credentials
//! GET  /api/tournaments                 - List tournaments
//! GET  /api/tournaments/{id}            - Tournament with matches and ranking
//! POST /api/tournaments/{id}/join       - Enroll a user
//! POST /api/tournaments/{id}/matches    - Create a match
//! PUT  /api/matches/{id}/result         - Record a match result
//! GET  /api/notifications/{user_id}     - Take unread notifications
//! GET  /health                          - Server health status
//! ```
//!
//! Request and response bodies use camelCase field names. Every error has the
//! body `{"error": "<kind>", "message": "<text>"}` (see [`errors`]).
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tourney_server::api::{create_router, AppState};
//! use tourney::db::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::new(Arc::new(MemoryStore::new()), "pepper_of_16_chars".to_string());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively so the browser client can be served from
//! any origin.

pub mod errors;
pub mod matches;
pub mod notifications;
pub mod request_id;
pub mod tournaments;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use serde_json::json;
use std::sync::Arc;
use tourney::{
    AuthManager, ErrorKind, MatchManager, NotificationManager, TournamentManager, db::Store,
};
use tower_http::cors::CorsLayer;

use errors::ApiError;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub tournament_manager: Arc<TournamentManager>,
    pub match_manager: Arc<MatchManager>,
    pub notification_manager: Arc<NotificationManager>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    /// Build every manager over one store
    pub fn new(store: Arc<dyn Store>, password_pepper: String) -> Self {
        Self::with_auth(
            store.clone(),
            AuthManager::new(store, password_pepper),
        )
    }

    /// Build the state around a preconfigured user directory
    pub fn with_auth(store: Arc<dyn Store>, auth_manager: AuthManager) -> Self {
        Self {
            auth_manager: Arc::new(auth_manager),
            tournament_manager: Arc::new(TournamentManager::new(store.clone())),
            match_manager: Arc::new(MatchManager::new(store.clone())),
            notification_manager: Arc::new(NotificationManager::new(store.clone())),
            store,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{tournament_id}/join",
            post(tournaments::join_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/matches",
            post(tournaments::create_match),
        )
        .route("/matches/{match_id}/result", put(matches::record_result))
        .route(
            "/notifications/{user_id}",
            get(notifications::poll_notifications),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` if the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","version":"0.1.0","database":true,"timestamp":"2026-01-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            false
        }
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

async fn not_found() -> ApiError {
    ApiError::new(ErrorKind::NotFound, "Route not found")
}
