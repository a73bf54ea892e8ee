//! Match ledger: matches of a tournament, their lifecycle and recorded results.
//!
//! A match is created Pending between two distinct enrolled participants and
//! moves to Finalized exactly once, when its result is recorded. Both
//! transitions queue player notifications in the same store operation.
//!
//! ## Example
//!
//! ```no_run
//! use tourney::matches::MatchManager;
//! use tourney::db::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let matches = MatchManager::new(Arc::new(MemoryStore::new()));
//!
//!     let created = matches.create_match(1, 1, 2).await?;
//!     let finished = matches.record_result(created.id, 1, "2-1").await?;
//!     println!("Match {} is {}", finished.id, finished.state);
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::{MatchError, MatchManager, MatchResult};
pub use models::{Match, MatchId, MatchOutcome, MatchState, MatchStatus, NewMatch};
