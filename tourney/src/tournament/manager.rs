//! Tournament registry: listing, detail and enrollment.

use super::models::{NewTournament, Participant, Tournament, TournamentDetail, TournamentId};
use crate::auth::UserId;
use crate::db::{Store, StoreError};
use crate::errors::ErrorKind;
use crate::notification::Notice;
use crate::ranking;
use log::info;
use std::sync::Arc;
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("User {user_id} is already enrolled in tournament {tournament_id}")]
    AlreadyEnrolled {
        tournament_id: TournamentId,
        user_id: UserId,
    },

    #[error("Invalid tournament: {0}")]
    InvalidTournament(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl TournamentError {
    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::NotFound(_) | TournamentError::UserNotFound(_) => ErrorKind::NotFound,
            TournamentError::AlreadyEnrolled { .. } => ErrorKind::Conflict,
            TournamentError::InvalidTournament(_) => ErrorKind::Validation,
            TournamentError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    store: Arc<dyn Store>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a new tournament (administrative)
    pub async fn create_tournament(&self, request: NewTournament) -> TournamentResult<Tournament> {
        if request.name.trim().is_empty() {
            return Err(TournamentError::InvalidTournament(
                "name cannot be empty".to_string(),
            ));
        }
        if request.game.trim().is_empty() {
            return Err(TournamentError::InvalidTournament(
                "game cannot be empty".to_string(),
            ));
        }

        let tournament = self.store.create_tournament(&request).await?;
        info!("Created tournament {} ({})", tournament.name, tournament.id);
        Ok(tournament)
    }

    /// Create the default tournaments if the registry is empty
    ///
    /// Returns the number of tournaments created.
    pub async fn seed_defaults(&self) -> TournamentResult<usize> {
        if !self.store.list_tournaments().await?.is_empty() {
            return Ok(0);
        }

        for (name, game) in super::models::DEFAULT_TOURNAMENTS {
            self.create_tournament(NewTournament {
                name: name.to_string(),
                game: game.to_string(),
            })
            .await?;
        }
        Ok(super::models::DEFAULT_TOURNAMENTS.len())
    }

    /// List all tournaments with their participants, by ascending ID
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        let mut tournaments = self.store.list_tournaments().await?;
        tournaments.sort_by_key(|t| t.id);
        Ok(tournaments)
    }

    /// Get a tournament with its participants
    pub async fn get_tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .find_tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))
    }

    /// Get a tournament with its matches and a freshly computed ranking
    pub async fn get_tournament_detail(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<TournamentDetail> {
        let tournament = self.get_tournament(tournament_id).await?;
        let mut matches = self.store.list_matches(tournament_id).await?;
        matches.sort_by_key(|m| m.id);

        let ranking = ranking::rank(&tournament, &matches);

        Ok(TournamentDetail {
            tournament,
            matches,
            ranking,
        })
    }

    /// Enroll a user in a tournament
    ///
    /// The participant and the enrollment notification are written together;
    /// a failed enrollment leaves no trace.
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotFound` - Tournament doesn't exist
    /// * `TournamentError::UserNotFound` - User doesn't exist
    /// * `TournamentError::AlreadyEnrolled` - User is already a participant
    pub async fn enroll(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> TournamentResult<Tournament> {
        let tournament = self.get_tournament(tournament_id).await?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(TournamentError::UserNotFound(user_id))?;

        if tournament.is_participant(user_id) {
            return Err(TournamentError::AlreadyEnrolled {
                tournament_id,
                user_id,
            });
        }

        let participant = Participant::new(user.id, user.username.clone());
        let notice = Notice::Enrolled {
            tournament: tournament.name.clone(),
        };

        // A concurrent enrollment may have won the race since the check above
        let inserted = self
            .store
            .add_participant(tournament_id, &participant, &[notice.to(user_id)])
            .await?;
        if !inserted {
            return Err(TournamentError::AlreadyEnrolled {
                tournament_id,
                user_id,
            });
        }

        info!("User {} joined tournament {}", user.username, tournament.name);
        self.get_tournament(tournament_id).await
    }
}
