//! Error classification shared by every component.
//!
//! Each component keeps its own error enum; [`ErrorKind`] is the coarse
//! taxonomy callers (the HTTP layer in particular) dispatch on.

use serde::Serialize;

/// Coarse error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input; the caller must fix the request
    Validation,
    /// A referenced entity does not exist
    NotFound,
    /// The request clashes with current state (duplicate name, double enrollment, ...)
    Conflict,
    /// Credentials were rejected
    Unauthorized,
    /// Storage unavailable or another server-side failure
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Internal => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        assert_eq!(ErrorKind::Validation.as_str(), "validation_error");
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::Conflict.as_str(), "conflict");
        assert_eq!(ErrorKind::Unauthorized.as_str(), "unauthorized");
        assert_eq!(ErrorKind::Internal.as_str(), "internal_error");
    }
}
