//! Tournament API handlers.
//!
//! # Examples
//!
//! Enroll user 1 in tournament 2:
//! ```bash
//! curl -X POST http://localhost:3000/api/tournaments/2/join \
//!   -H "Content-Type: application/json" \
//!   -d '{"userId": 1}'
//! ```

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use tourney::auth::UserId;
use tourney::tournament::{Tournament, TournamentDetail, TournamentId};
use tourney::Match;

use super::AppState;
use super::errors::{ApiError, ApiResult};
use crate::metrics;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchPayload {
    pub player1_id: Option<UserId>,
    pub player2_id: Option<UserId>,
}

/// List every tournament with its participants.
pub async fn list_tournaments(State(state): State<AppState>) -> ApiResult<Json<Vec<Tournament>>> {
    Ok(Json(state.tournament_manager.list_tournaments().await?))
}

/// Tournament with its matches and current ranking.
///
/// # Errors
///
/// - `404 Not Found`: Unknown tournament
pub async fn get_tournament(
    State(state): State<AppState>,
    tournament_id: Result<Path<TournamentId>, PathRejection>,
) -> ApiResult<Json<TournamentDetail>> {
    let Path(tournament_id) = tournament_id?;
    Ok(Json(
        state
            .tournament_manager
            .get_tournament_detail(tournament_id)
            .await?,
    ))
}

/// Enroll a user.
///
/// # Errors
///
/// - `400 Bad Request`: `userId` missing
/// - `404 Not Found`: Unknown tournament or user
/// - `409 Conflict`: Already enrolled
pub async fn join_tournament(
    State(state): State<AppState>,
    tournament_id: Result<Path<TournamentId>, PathRejection>,
    payload: Result<Json<JoinPayload>, JsonRejection>,
) -> ApiResult<Json<Tournament>> {
    let Path(tournament_id) = tournament_id?;
    let Json(payload) = payload?;
    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::validation("userId is required"))?;

    let tournament = state.tournament_manager.enroll(tournament_id, user_id).await?;
    metrics::enrollments_total();
    Ok(Json(tournament))
}

/// Create a pending match between two enrolled players.
///
/// # Errors
///
/// - `400 Bad Request`: Missing or identical players, or a player not enrolled
/// - `404 Not Found`: Unknown tournament or player
pub async fn create_match(
    State(state): State<AppState>,
    tournament_id: Result<Path<TournamentId>, PathRejection>,
    payload: Result<Json<CreateMatchPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Match>)> {
    let Path(tournament_id) = tournament_id?;
    let Json(payload) = payload?;
    let (Some(player1_id), Some(player2_id)) = (payload.player1_id, payload.player2_id) else {
        return Err(ApiError::validation("player1Id and player2Id are required"));
    };

    let created = state
        .match_manager
        .create_match(tournament_id, player1_id, player2_id)
        .await?;
    metrics::matches_created_total();
    Ok((StatusCode::CREATED, Json(created)))
}
