//! Repository trait definitions for testability and dependency injection.
//!
//! Managers only ever talk to these traits. Operations that must commit
//! together (a state change plus the notifications it produces) take the
//! pending notifications as an outbox argument, so each implementation can
//! apply them in a single atomic step.

use async_trait::async_trait;

use super::errors::StoreResult;
use crate::auth::{Credentials, User, UserId};
use crate::matches::{Match, MatchId, MatchOutcome, NewMatch};
use crate::notification::{NewNotification, Notification};
use crate::tournament::{NewTournament, Participant, Tournament, TournamentId};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    ///
    /// Returns `None` when the username is already taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<Option<User>>;

    /// Find user by ID
    async fn find_user_by_id(&self, user_id: UserId) -> StoreResult<Option<User>>;

    /// Find user by exact username
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Find a user together with the stored password hash
    async fn find_credentials(&self, username: &str) -> StoreResult<Option<Credentials>>;
}

/// Trait for tournament repository operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Create a new tournament with no participants
    async fn create_tournament(&self, tournament: &NewTournament) -> StoreResult<Tournament>;

    /// List all tournaments with their participants
    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>>;

    /// Find a tournament with its participants
    async fn find_tournament(&self, tournament_id: TournamentId) -> StoreResult<Option<Tournament>>;

    /// Add a participant and queue the given notifications
    ///
    /// Returns `false` and writes nothing if the user is already enrolled.
    async fn add_participant(
        &self,
        tournament_id: TournamentId,
        participant: &Participant,
        outbox: &[NewNotification],
    ) -> StoreResult<bool>;
}

/// Trait for match repository operations
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Create a pending match and queue the given notifications
    async fn create_match(&self, new_match: &NewMatch, outbox: &[NewNotification])
    -> StoreResult<Match>;

    /// Find match by ID
    async fn find_match(&self, match_id: MatchId) -> StoreResult<Option<Match>>;

    /// List the matches of a tournament
    async fn list_matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>>;

    /// Record the outcome of a pending match and queue the given notifications
    ///
    /// Returns `None` and writes nothing if the match is no longer pending.
    async fn finalize_match(
        &self,
        match_id: MatchId,
        outcome: &MatchOutcome,
        outbox: &[NewNotification],
    ) -> StoreResult<Option<Match>>;
}

/// Trait for notification repository operations
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Queue a single unread notification
    async fn create_notification(&self, notification: &NewNotification) -> StoreResult<Notification>;

    /// Mark every unread notification of a user as read and return them
    ///
    /// Concurrent callers never receive the same notification twice.
    async fn take_unread(&self, user_id: UserId) -> StoreResult<Vec<Notification>>;
}

/// Complete storage backend
#[async_trait]
pub trait Store: UserRepository + TournamentRepository + MatchRepository + NotificationRepository {
    /// Check that the backend is reachable
    async fn health_check(&self) -> StoreResult<()>;
}
