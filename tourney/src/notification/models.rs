//! Notification outbox data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::UserId;

/// Notification ID type
pub type NotificationId = i64;

/// A message addressed to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification waiting to be written by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub message: String,
}

/// Domain events that notify a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The player joined a tournament
    Enrolled { tournament: String },
    /// A match against `opponent` was scheduled
    MatchCreated { opponent: String, tournament: String },
    /// The player beat `opponent`
    Won { opponent: String, score: String },
    /// The player lost to `opponent`
    Lost { opponent: String, score: String },
}

impl Notice {
    /// Address this notice to a user
    pub fn to(&self, user_id: UserId) -> NewNotification {
        NewNotification {
            user_id,
            message: self.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Enrolled { tournament } => write!(f, "Você se inscreveu no: {tournament}"),
            Notice::MatchCreated {
                opponent,
                tournament,
            } => write!(f, "Nova partida criada contra {opponent} em {tournament}"),
            Notice::Won { opponent, score } => {
                write!(f, "Você venceu a partida contra {opponent} ({score})!")
            }
            Notice::Lost { opponent, score } => {
                write!(f, "Você perdeu a partida contra {opponent} ({score}).")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages() {
        let enrolled = Notice::Enrolled {
            tournament: "Copa de CS:GO".to_string(),
        };
        assert_eq!(enrolled.to_string(), "Você se inscreveu no: Copa de CS:GO");

        let created = Notice::MatchCreated {
            opponent: "bob".to_string(),
            tournament: "Copa".to_string(),
        };
        assert_eq!(created.to_string(), "Nova partida criada contra bob em Copa");

        let won = Notice::Won {
            opponent: "bob".to_string(),
            score: "2-1".to_string(),
        };
        assert_eq!(won.to_string(), "Você venceu a partida contra bob (2-1)!");

        let lost = Notice::Lost {
            opponent: "alice".to_string(),
            score: "2-1".to_string(),
        };
        assert_eq!(lost.to_string(), "Você perdeu a partida contra alice (2-1).");
    }

    #[test]
    fn test_notice_addressing() {
        let new = Notice::Enrolled {
            tournament: "Cup".to_string(),
        }
        .to(42);
        assert_eq!(new.user_id, 42);
        assert_eq!(new.message, "Você se inscreveu no: Cup");
    }
}
