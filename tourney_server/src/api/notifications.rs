//! Notification polling handler.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use tourney::auth::UserId;
use tourney::notification::Notification;

use super::AppState;
use super::errors::ApiResult;
use crate::metrics;

/// Return the user's unread notifications and mark them read.
///
/// Unknown users simply get an empty list.
pub async fn poll_notifications(
    State(state): State<AppState>,
    user_id: Result<Path<UserId>, PathRejection>,
) -> ApiResult<Json<Vec<Notification>>> {
    let Path(user_id) = user_id?;
    let delivered = state.notification_manager.poll(user_id).await?;
    metrics::notifications_delivered_total(delivered.len());
    Ok(Json(delivered))
}
