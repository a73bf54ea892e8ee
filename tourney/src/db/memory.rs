//! In-memory implementation of the repository traits.
//!
//! Used by tests and by the server's `--memory` mode. All state lives behind
//! one async mutex, so every trait method is applied atomically, outbox
//! included.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::errors::{StoreError, StoreResult};
use super::repository::{
    MatchRepository, NotificationRepository, Store, TournamentRepository, UserRepository,
};
use crate::auth::{Credentials, User, UserId};
use crate::matches::{Match, MatchId, MatchOutcome, MatchState, NewMatch};
use crate::notification::{NewNotification, Notification, NotificationId};
use crate::tournament::{NewTournament, Participant, Tournament, TournamentId};

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, Credentials>,
    tournaments: BTreeMap<TournamentId, Tournament>,
    matches: BTreeMap<MatchId, Match>,
    notifications: BTreeMap<NotificationId, Notification>,
    next_user_id: i64,
    next_tournament_id: i64,
    next_match_id: i64,
    next_notification_id: i64,
}

impl State {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn queue(&mut self, outbox: &[NewNotification], now: DateTime<Utc>) {
        for pending in outbox {
            let id = Self::next_id(&mut self.next_notification_id);
            self.notifications.insert(
                id,
                Notification {
                    id,
                    user_id: pending.user_id,
                    message: pending.message.clone(),
                    read: false,
                    created_at: now,
                },
            );
        }
    }
}

/// Store that keeps everything in process memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<Option<User>> {
        let mut state = self.state.lock().await;

        if state.users.values().any(|c| c.user.username == username) {
            return Ok(None);
        }

        let id = State::next_id(&mut state.next_user_id);
        let user = User {
            id,
            username: username.to_string(),
            created_at: Utc::now(),
        };
        state.users.insert(
            id,
            Credentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(Some(user))
    }

    async fn find_user_by_id(&self, user_id: UserId) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&user_id).map(|c| c.user.clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.find_credentials(username).await?.map(|c| c.user))
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<Credentials>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|c| c.user.username == username)
            .cloned())
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn create_tournament(&self, tournament: &NewTournament) -> StoreResult<Tournament> {
        let mut state = self.state.lock().await;
        let id = State::next_id(&mut state.next_tournament_id);
        let created = Tournament {
            id,
            name: tournament.name.clone(),
            game: tournament.game.clone(),
            created_at: Utc::now(),
            participants: Vec::new(),
        };
        state.tournaments.insert(id, created.clone());
        Ok(created)
    }

    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        let state = self.state.lock().await;
        Ok(state.tournaments.values().cloned().collect())
    }

    async fn find_tournament(&self, tournament_id: TournamentId) -> StoreResult<Option<Tournament>> {
        let state = self.state.lock().await;
        Ok(state.tournaments.get(&tournament_id).cloned())
    }

    async fn add_participant(
        &self,
        tournament_id: TournamentId,
        participant: &Participant,
        outbox: &[NewNotification],
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().await;

        let tournament = state
            .tournaments
            .get_mut(&tournament_id)
            .ok_or(StoreError::MissingRecord {
                entity: "tournament",
                id: tournament_id,
            })?;

        if tournament.is_participant(participant.id) {
            return Ok(false);
        }
        tournament.participants.push(participant.clone());

        state.queue(outbox, Utc::now());
        Ok(true)
    }
}

#[async_trait]
impl MatchRepository for MemoryStore {
    async fn create_match(
        &self,
        new_match: &NewMatch,
        outbox: &[NewNotification],
    ) -> StoreResult<Match> {
        let mut state = self.state.lock().await;

        if !state.tournaments.contains_key(&new_match.tournament_id) {
            return Err(StoreError::MissingRecord {
                entity: "tournament",
                id: new_match.tournament_id,
            });
        }

        let now = Utc::now();
        let id = State::next_id(&mut state.next_match_id);
        let created = Match {
            id,
            tournament_id: new_match.tournament_id,
            player1: new_match.player1.clone(),
            player2: new_match.player2.clone(),
            state: MatchState::Pending,
            winner_id: None,
            score: None,
            created_at: now,
            finalized_at: None,
        };
        state.matches.insert(id, created.clone());
        state.queue(outbox, now);
        Ok(created)
    }

    async fn find_match(&self, match_id: MatchId) -> StoreResult<Option<Match>> {
        let state = self.state.lock().await;
        Ok(state.matches.get(&match_id).cloned())
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        let state = self.state.lock().await;
        Ok(state
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn finalize_match(
        &self,
        match_id: MatchId,
        outcome: &MatchOutcome,
        outbox: &[NewNotification],
    ) -> StoreResult<Option<Match>> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let stored = state
            .matches
            .get_mut(&match_id)
            .ok_or(StoreError::MissingRecord {
                entity: "match",
                id: match_id,
            })?;

        if stored.is_finalized() {
            return Ok(None);
        }

        stored.state = MatchState::Finalized;
        stored.winner_id = Some(outcome.winner_id);
        stored.score = Some(outcome.score.clone());
        stored.finalized_at = Some(now);
        let finalized = stored.clone();

        state.queue(outbox, now);
        Ok(Some(finalized))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn create_notification(&self, notification: &NewNotification) -> StoreResult<Notification> {
        let mut state = self.state.lock().await;
        let id = State::next_id(&mut state.next_notification_id);
        let created = Notification {
            id,
            user_id: notification.user_id,
            message: notification.message.clone(),
            read: false,
            created_at: Utc::now(),
        };
        state.notifications.insert(id, created.clone());
        Ok(created)
    }

    async fn take_unread(&self, user_id: UserId) -> StoreResult<Vec<Notification>> {
        let mut state = self.state.lock().await;
        Ok(state
            .notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.read)
            .map(|n| {
                n.read = true;
                n.clone()
            })
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(user_id: UserId, message: &str) -> NewNotification {
        NewNotification {
            user_id,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let store = MemoryStore::new();
        let first = store.create_user("alice", "h1").await.unwrap();
        assert!(first.is_some());
        assert!(store.create_user("alice", "h2").await.unwrap().is_none());

        let creds = store.find_credentials("alice").await.unwrap().unwrap();
        assert_eq!(creds.password_hash, "h1");
    }

    #[tokio::test]
    async fn test_add_participant_is_idempotent() {
        let store = MemoryStore::new();
        let t = store
            .create_tournament(&NewTournament {
                name: "Cup".to_string(),
                game: "Chess".to_string(),
            })
            .await
            .unwrap();
        let alice = Participant::new(1, "alice");

        assert!(store.add_participant(t.id, &alice, &[notice(1, "hi")]).await.unwrap());
        assert!(!store.add_participant(t.id, &alice, &[notice(1, "again")]).await.unwrap());

        let unread = store.take_unread(1).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].message, "hi");
    }

    #[tokio::test]
    async fn test_add_participant_to_missing_tournament() {
        let store = MemoryStore::new();
        let err = store
            .add_participant(5, &Participant::new(1, "alice"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingRecord { entity: "tournament", id: 5 }));
    }

    #[tokio::test]
    async fn test_finalize_only_once() {
        let store = MemoryStore::new();
        let t = store
            .create_tournament(&NewTournament {
                name: "Cup".to_string(),
                game: "Chess".to_string(),
            })
            .await
            .unwrap();
        let m = store
            .create_match(
                &NewMatch {
                    tournament_id: t.id,
                    player1: Participant::new(1, "alice"),
                    player2: Participant::new(2, "bob"),
                },
                &[],
            )
            .await
            .unwrap();

        let outcome = MatchOutcome {
            winner_id: 1,
            score: "1-0".to_string(),
        };
        let first = store.finalize_match(m.id, &outcome, &[notice(1, "won")]).await.unwrap();
        assert!(first.is_some());

        let second = store.finalize_match(m.id, &outcome, &[notice(1, "won again")]).await.unwrap();
        assert!(second.is_none());
        assert_eq!(store.take_unread(1).await.unwrap().len(), 1);

        let err = store.finalize_match(m.id + 1, &outcome, &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingRecord { entity: "match", .. }));
    }

    #[tokio::test]
    async fn test_take_unread_marks_read() {
        let store = MemoryStore::new();
        store.create_notification(&notice(1, "a")).await.unwrap();
        store.create_notification(&notice(2, "b")).await.unwrap();

        assert_eq!(store.take_unread(1).await.unwrap().len(), 1);
        assert!(store.take_unread(1).await.unwrap().is_empty());
        assert_eq!(store.take_unread(2).await.unwrap().len(), 1);
    }
}
