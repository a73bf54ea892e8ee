//! User directory: registration, credential verification and identity lookup.
//!
//! Passwords are hashed with Argon2id plus a server-side pepper. The rest of
//! the system only ever sees [`User`], never credential material.
//!
//! ## Example
//!
//! ```no_run
//! use tourney::auth::{AuthManager, RegisterRequest};
//! use tourney::db::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(Arc::new(MemoryStore::new()), "secret_pepper".to_string());
//!
//!     let user = auth
//!         .register(RegisterRequest {
//!             username: "alice".to_string(),
//!             password: "hunter2".to_string(),
//!         })
//!         .await?;
//!     println!("Registered user: {}", user.username);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{Credentials, LoginRequest, RegisterRequest, User, UserId};
