//! Mapping from domain errors to HTTP responses.
//!
//! Every handler error funnels through [`ApiError`], which carries the error
//! kind and a client-safe message and renders the shared error body:
//!
//! ```json
//! {"error": "not_found", "message": "Tournament not found: 7"}
//! ```

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tourney::{
    AuthError, ErrorKind, MatchError, NotificationError, TournamentError,
};

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

/// Handler error
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.kind)
    }

    /// Internal failures are logged in full; the client only sees the safe message
    fn from_domain(kind: ErrorKind, client_message: String, source: &dyn std::error::Error) -> Self {
        if kind == ErrorKind::Internal {
            tracing::error!(error = %source, "Request failed with internal error");
        }
        Self::new(kind, client_message)
    }
}

/// HTTP status for an error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind.as_str(),
            message: self.message,
        };
        (status_for(self.kind), Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::from_domain(e.kind(), e.client_message(), &e)
    }
}

impl From<TournamentError> for ApiError {
    fn from(e: TournamentError) -> Self {
        Self::from_domain(e.kind(), e.client_message(), &e)
    }
}

impl From<MatchError> for ApiError {
    fn from(e: MatchError) -> Self {
        Self::from_domain(e.kind(), e.client_message(), &e)
    }
}

impl From<NotificationError> for ApiError {
    fn from(e: NotificationError) -> Self {
        Self::from_domain(e.kind(), e.client_message(), &e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tourney::db::StoreError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_domain_errors_map_to_kinds() {
        let err = ApiError::from(TournamentError::NotFound(7));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Tournament not found: 7");

        let err = ApiError::from(MatchError::AlreadyFinalized(3));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_errors_are_sanitised() {
        let err = ApiError::from(MatchError::Store(StoreError::Corrupt(
            "state 'weird' in row 12".to_string(),
        )));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.message.contains("weird"));
    }
}
