//! Tournament registry data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::matches::Match;
use crate::ranking::RankingEntry;

/// Tournament ID type
pub type TournamentId = i64;

/// Tournaments created on first start when the registry is empty: (name, game)
pub const DEFAULT_TOURNAMENTS: &[(&str, &str)] = &[
    ("Campeonato de Valorant", "Valorant"),
    ("Copa de CS:GO", "Counter-Strike"),
];

/// A user as seen from inside a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    pub username: String,
}

impl Participant {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// Tournament with its participant set, ordered by enrollment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub game: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

impl Tournament {
    /// Whether the user is enrolled
    pub fn is_participant(&self, user_id: UserId) -> bool {
        self.participants.iter().any(|p| p.id == user_id)
    }
}

/// Administrative tournament creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    pub game: String,
}

/// Tournament together with its match ledger and the ranking derived from it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub matches: Vec<Match>,
    pub ranking: Vec<RankingEntry>,
}
