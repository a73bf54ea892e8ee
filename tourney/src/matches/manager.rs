//! Match ledger implementation.

use super::models::{Match, MatchId, MatchOutcome, NewMatch};
use crate::auth::UserId;
use crate::db::{Store, StoreError};
use crate::errors::ErrorKind;
use crate::notification::Notice;
use crate::tournament::{Participant, TournamentId};
use log::info;
use std::sync::Arc;
use thiserror::Error;

/// Match errors
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match not found: {0}")]
    NotFound(MatchId),

    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Player not found: {0}")]
    PlayerNotFound(UserId),

    #[error("Players must be different")]
    InvalidPlayers,

    #[error("Player {user_id} is not enrolled in tournament {tournament_id}")]
    NotEnrolled {
        tournament_id: TournamentId,
        user_id: UserId,
    },

    #[error("Winner {winner_id} does not play in match {match_id}")]
    InvalidWinner { match_id: MatchId, winner_id: UserId },

    #[error("Score cannot be empty")]
    EmptyScore,

    #[error("Match {0} already has a result")]
    AlreadyFinalized(MatchId),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl MatchError {
    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatchError::NotFound(_)
            | MatchError::TournamentNotFound(_)
            | MatchError::PlayerNotFound(_) => ErrorKind::NotFound,
            MatchError::InvalidPlayers
            | MatchError::NotEnrolled { .. }
            | MatchError::InvalidWinner { .. }
            | MatchError::EmptyScore => ErrorKind::Validation,
            MatchError::AlreadyFinalized(_) => ErrorKind::Conflict,
            MatchError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            MatchError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;

/// Match ledger
#[derive(Clone)]
pub struct MatchManager {
    store: Arc<dyn Store>,
}

impl MatchManager {
    /// Create a new match ledger
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a pending match between two enrolled participants
    ///
    /// Both players are notified in the same store operation that records the
    /// match.
    ///
    /// # Errors
    ///
    /// * `MatchError::TournamentNotFound` - Tournament doesn't exist
    /// * `MatchError::PlayerNotFound` - A player doesn't exist
    /// * `MatchError::InvalidPlayers` - Both IDs are the same user
    /// * `MatchError::NotEnrolled` - A player isn't a participant of the tournament
    pub async fn create_match(
        &self,
        tournament_id: TournamentId,
        player1_id: UserId,
        player2_id: UserId,
    ) -> MatchResult<Match> {
        let tournament = self
            .store
            .find_tournament(tournament_id)
            .await?
            .ok_or(MatchError::TournamentNotFound(tournament_id))?;

        let player1 = self.find_player(player1_id).await?;
        let player2 = self.find_player(player2_id).await?;

        if player1.id == player2.id {
            return Err(MatchError::InvalidPlayers);
        }

        for player in [&player1, &player2] {
            if !tournament.is_participant(player.id) {
                return Err(MatchError::NotEnrolled {
                    tournament_id,
                    user_id: player.id,
                });
            }
        }

        let outbox = [
            Notice::MatchCreated {
                opponent: player2.username.clone(),
                tournament: tournament.name.clone(),
            }
            .to(player1.id),
            Notice::MatchCreated {
                opponent: player1.username.clone(),
                tournament: tournament.name.clone(),
            }
            .to(player2.id),
        ];

        let created = self
            .store
            .create_match(
                &NewMatch {
                    tournament_id,
                    player1,
                    player2,
                },
                &outbox,
            )
            .await?;

        info!(
            "Created match {} in {}: {} vs {}",
            created.id, tournament.name, created.player1.username, created.player2.username
        );
        Ok(created)
    }

    /// Record the result of a pending match
    ///
    /// The first result wins; any later submission for the same match is
    /// rejected and the stored result is left untouched.
    ///
    /// # Errors
    ///
    /// * `MatchError::NotFound` - Match doesn't exist
    /// * `MatchError::EmptyScore` - Score is blank
    /// * `MatchError::InvalidWinner` - Winner is neither player
    /// * `MatchError::AlreadyFinalized` - A result was already recorded
    pub async fn record_result(
        &self,
        match_id: MatchId,
        winner_id: UserId,
        score: &str,
    ) -> MatchResult<Match> {
        let current = self.get_match(match_id).await?;

        if current.is_finalized() {
            return Err(MatchError::AlreadyFinalized(match_id));
        }

        let score = score.trim();
        if score.is_empty() {
            return Err(MatchError::EmptyScore);
        }

        let (winner, loser) = match (current.player(winner_id), current.opponent_of(winner_id)) {
            (Some(winner), Some(loser)) => (winner.clone(), loser.clone()),
            _ => {
                return Err(MatchError::InvalidWinner {
                    match_id,
                    winner_id,
                });
            }
        };

        let outbox = [
            Notice::Won {
                opponent: loser.username.clone(),
                score: score.to_string(),
            }
            .to(winner.id),
            Notice::Lost {
                opponent: winner.username.clone(),
                score: score.to_string(),
            }
            .to(loser.id),
        ];

        let outcome = MatchOutcome {
            winner_id,
            score: score.to_string(),
        };

        // Conditional on the match still being pending, so concurrent submissions
        // produce exactly one result
        let finalized = self
            .store
            .finalize_match(match_id, &outcome, &outbox)
            .await?
            .ok_or(MatchError::AlreadyFinalized(match_id))?;

        info!(
            "Match {} finalized: {} beat {} ({})",
            match_id, winner.username, loser.username, score
        );
        Ok(finalized)
    }

    /// Get a match
    pub async fn get_match(&self, match_id: MatchId) -> MatchResult<Match> {
        self.store
            .find_match(match_id)
            .await?
            .ok_or(MatchError::NotFound(match_id))
    }

    /// List the matches of a tournament by ascending ID
    pub async fn list_matches(&self, tournament_id: TournamentId) -> MatchResult<Vec<Match>> {
        let mut matches = self.store.list_matches(tournament_id).await?;
        matches.sort_by_key(|m| m.id);
        Ok(matches)
    }

    async fn find_player(&self, user_id: UserId) -> MatchResult<Participant> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(MatchError::PlayerNotFound(user_id))?;
        Ok(Participant::new(user.id, user.username))
    }
}
