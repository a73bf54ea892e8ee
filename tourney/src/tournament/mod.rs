//! Tournament registry: tournaments and their participant sets.
//!
//! This module provides:
//! - Tournament listing and lookup
//! - Tournament detail with match ledger and derived ranking
//! - Enrollment, at most once per user per tournament
//! - Default tournament seeding for fresh installations
//!
//! ## Example
//!
//! ```no_run
//! use tourney::tournament::TournamentManager;
//! use tourney::db::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tournaments = TournamentManager::new(Arc::new(MemoryStore::new()));
//!     tournaments.seed_defaults().await?;
//!
//!     let tournament = tournaments.enroll(1, 1).await?;
//!     println!("{} now has {} participant(s)", tournament.name, tournament.participants.len());
//!
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::{TournamentError, TournamentManager, TournamentResult};
pub use models::{
    DEFAULT_TOURNAMENTS, NewTournament, Participant, Tournament, TournamentDetail, TournamentId,
};
