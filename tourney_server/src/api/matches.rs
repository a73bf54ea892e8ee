//! Match result API handler.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde::Deserialize;
use tourney::auth::UserId;
use tourney::matches::{Match, MatchId};

use super::AppState;
use super::errors::{ApiError, ApiResult};
use crate::metrics;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub winner_id: Option<UserId>,
    #[serde(default)]
    pub score: String,
}

/// Record the result of a pending match.
///
/// ```bash
/// curl -X PUT http://localhost:3000/api/matches/1/result \
///   -H "Content-Type: application/json" \
///   -d '{"winnerId": 1, "score": "2-1"}'
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing winner, blank score, or winner not in the match
/// - `404 Not Found`: Unknown match
/// - `409 Conflict`: Result already recorded
pub async fn record_result(
    State(state): State<AppState>,
    match_id: Result<Path<MatchId>, PathRejection>,
    payload: Result<Json<ResultPayload>, JsonRejection>,
) -> ApiResult<Json<Match>> {
    let Path(match_id) = match_id?;
    let Json(payload) = payload?;
    let winner_id = payload
        .winner_id
        .ok_or_else(|| ApiError::validation("winnerId is required"))?;

    let finalized = state
        .match_manager
        .record_result(match_id, winner_id, &payload.score)
        .await?;
    metrics::results_recorded_total();
    Ok(Json(finalized))
}
