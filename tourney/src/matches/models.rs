//! Match ledger data models.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::auth::UserId;
use crate::tournament::{Participant, TournamentId};

/// Match ID type
pub type MatchId = i64;

/// Match lifecycle state. Pending moves to Finalized once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    /// Created, no result yet
    Pending,
    /// Result recorded
    Finalized,
}

impl MatchState {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchState::Pending => "pending",
            MatchState::Finalized => "finalized",
        }
    }

    /// Label shown by the browser client
    pub fn status(&self) -> MatchStatus {
        match self {
            MatchState::Pending => MatchStatus::Pending,
            MatchState::Finalized => MatchStatus::Finalized,
        }
    }
}

/// Client-facing view of [`MatchState`], serialized as `status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Finalizada")]
    Finalized,
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchState::Pending),
            "finalized" => Ok(MatchState::Finalized),
            other => Err(format!("unknown match state '{other}'")),
        }
    }
}

/// A match between two participants of one tournament
///
/// Serializes with both `state` and the client's `status` label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub player1: Participant,
    pub player2: Participant,
    pub state: MatchState,
    pub winner_id: Option<UserId>,
    pub score: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Serialize for Match {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Match", 10)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("tournamentId", &self.tournament_id)?;
        s.serialize_field("player1", &self.player1)?;
        s.serialize_field("player2", &self.player2)?;
        s.serialize_field("state", &self.state)?;
        s.serialize_field("status", &self.state.status())?;
        s.serialize_field("winnerId", &self.winner_id)?;
        s.serialize_field("score", &self.score)?;
        s.serialize_field("createdAt", &self.created_at)?;
        s.serialize_field("finalizedAt", &self.finalized_at)?;
        s.end()
    }
}

impl Match {
    pub fn is_finalized(&self) -> bool {
        self.state == MatchState::Finalized
    }

    /// Whether the user plays in this match
    pub fn involves(&self, user_id: UserId) -> bool {
        self.player1.id == user_id || self.player2.id == user_id
    }

    /// Player entry for `user_id`, if they play in this match
    pub fn player(&self, user_id: UserId) -> Option<&Participant> {
        [&self.player1, &self.player2]
            .into_iter()
            .find(|p| p.id == user_id)
    }

    /// The other player, if `user_id` plays in this match
    pub fn opponent_of(&self, user_id: UserId) -> Option<&Participant> {
        if self.player1.id == user_id {
            Some(&self.player2)
        } else if self.player2.id == user_id {
            Some(&self.player1)
        } else {
            None
        }
    }

    /// Player entry of the recorded winner
    pub fn winner(&self) -> Option<&Participant> {
        self.player(self.winner_id?)
    }
}

/// Match creation data handed to the store
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub tournament_id: TournamentId,
    pub player1: Participant,
    pub player2: Participant,
}

/// Result submitted for a pending match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub winner_id: UserId,
    pub score: String,
}
