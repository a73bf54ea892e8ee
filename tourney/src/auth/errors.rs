//! User directory error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::errors::ErrorKind;

/// Authentication and registration errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// A required field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid username format
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Username already exists
    #[error("Username already exists")]
    UsernameTaken,

    /// Unknown user or wrong password; the two are not distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl AuthError {
    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Store(_) | AuthError::HashingFailed => ErrorKind::Internal,
            AuthError::MissingField(_) | AuthError::InvalidUsername(_) => ErrorKind::Validation,
            AuthError::UsernameTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials => ErrorKind::Unauthorized,
        }
    }

    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Store(_) | AuthError::HashingFailed => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for user directory operations
pub type AuthResult<T> = Result<T, AuthError>;
