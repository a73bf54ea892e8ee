//! User directory implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{LoginRequest, RegisterRequest, User, UserId},
};
use crate::db::Store;
use argon2::{
    Argon2, Params,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use log::{info, warn};
use std::sync::{Arc, OnceLock};

/// Longest accepted username, in characters
pub const MAX_USERNAME_CHARS: usize = 32;

/// Hashed on first use; verified against when a login names an unknown user
const DUMMY_PASSWORD: &str = "tourney-unknown-user";

/// User directory
#[derive(Clone)]
pub struct AuthManager {
    store: Arc<dyn Store>,
    pepper: String,
    argon2: Argon2<'static>,
    dummy_hash: OnceLock<String>,
}

impl AuthManager {
    /// Create a new user directory
    ///
    /// # Arguments
    ///
    /// * `store` - Backing store
    /// * `pepper` - Server-side pepper for password hashing
    pub fn new(store: Arc<dyn Store>, pepper: String) -> Self {
        Self {
            store,
            pepper,
            argon2: Argon2::default(),
            dummy_hash: OnceLock::new(),
        }
    }

    /// Create a user directory with explicit Argon2id cost parameters
    ///
    /// Hashes carry their own parameters, so hashes produced with different
    /// settings keep verifying.
    pub fn with_hash_params(store: Arc<dyn Store>, pepper: String, params: Params) -> Self {
        Self {
            store,
            pepper,
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
            dummy_hash: OnceLock::new(),
        }
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingField` - Username or password empty
    /// * `AuthError::InvalidUsername` - Username too long or contains whitespace
    /// * `AuthError::UsernameTaken` - Username already exists (exact, case-sensitive)
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        self.validate_username(&request.username)?;

        if request.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let password_hash = self.hash_password(&request.password)?;

        // The store refuses duplicate names atomically
        let user = self
            .store
            .create_user(&request.username, &password_hash)
            .await?
            .ok_or(AuthError::UsernameTaken)?;

        info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Verify credentials and return the matching identity
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingField` - Username or password empty
    /// * `AuthError::InvalidCredentials` - Unknown user or wrong password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<User> {
        if request.username.trim().is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if request.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let Some(credentials) = self.store.find_credentials(&request.username).await? else {
            // Same Argon2 work as a wrong password
            if let Some(hash) = self.dummy_hash() {
                let _ = self.verify_password(&request.password, hash);
            }
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = self.verify_password(&request.password, &credentials.password_hash) {
            warn!("Rejected login for user {}", credentials.user.id);
            return Err(e);
        }

        Ok(credentials.user)
    }

    /// Look up a user by ID
    pub async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.store.find_user_by_id(user_id).await?)
    }

    /// Look up a user by exact name
    pub async fn find_by_name(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self.store.find_user_by_username(username).await?)
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

        self.argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    fn dummy_hash(&self) -> Option<&str> {
        if let Some(hash) = self.dummy_hash.get() {
            return Some(hash);
        }
        let hash = self.hash_password(DUMMY_PASSWORD).ok()?;
        Some(self.dummy_hash.get_or_init(|| hash))
    }

    /// Validate username format
    fn validate_username(&self, username: &str) -> AuthResult<()> {
        if username.trim().is_empty() {
            return Err(AuthError::MissingField("username"));
        }

        if username.chars().count() > MAX_USERNAME_CHARS {
            return Err(AuthError::InvalidUsername(format!(
                "Username must be at most {MAX_USERNAME_CHARS} characters"
            )));
        }

        if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AuthError::InvalidUsername(
                "Username cannot contain whitespace".to_string(),
            ));
        }

        Ok(())
    }
}
