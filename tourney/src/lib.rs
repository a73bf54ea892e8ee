//! # Tourney
//!
//! Backend core for running competitive gaming tournaments: user accounts,
//! tournament enrollment, a match ledger with one-shot result recording, a
//! ranking derived on read, and a per-user notification outbox.
//!
//! ## Architecture
//!
//! Each component is a manager over a shared [`db::Store`]:
//!
//! - **Users** ([`auth`]): registration and credential checks
//! - **Tournaments** ([`tournament`]): listing, detail and enrollment
//! - **Matches** ([`matches`]): pairing enrolled players and recording results
//! - **Ranking** ([`ranking`]): points table computed from finalized matches
//! - **Notifications** ([`notification`]): unread messages, drained on poll
//!
//! State changes and the notifications they produce are committed by the store
//! in one step, so a failed operation never leaves a stray message behind.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tourney::db::MemoryStore;
//! use tourney::TournamentManager;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tournaments = TournamentManager::new(Arc::new(MemoryStore::new()));
//! tournaments.seed_defaults().await?;
//! assert_eq!(tournaments.list_tournaments().await?.len(), 2);
//! # Ok(())
//! # }
//! ```

/// User directory and password hashing.
pub mod auth;

/// Storage traits and backends.
pub mod db;

pub mod errors;

/// Match ledger.
pub mod matches;

/// Per-user notification outbox.
pub mod notification;

pub mod ranking;

/// Tournament registry.
pub mod tournament;

pub use auth::{AuthError, AuthManager, User, UserId};
pub use errors::ErrorKind;
pub use matches::{Match, MatchError, MatchManager, MatchState};
pub use notification::{Notice, Notification, NotificationError, NotificationManager};
pub use ranking::{POINTS_PER_WIN, RankingEntry, rank};
pub use tournament::{Participant, Tournament, TournamentDetail, TournamentError, TournamentManager};
