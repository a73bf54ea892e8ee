//! PostgreSQL implementation of the repository traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::collections::HashMap;
use std::time::Duration;

use super::errors::{StoreError, StoreResult};
use super::repository::{
    MatchRepository, NotificationRepository, Store, TournamentRepository, UserRepository,
};
use super::timeouts::{DEFAULT_QUERY_TIMEOUT, transaction_timeout, with_timeout, within};
use crate::auth::{Credentials, User, UserId};
use crate::matches::{Match, MatchId, MatchOutcome, MatchState, NewMatch};
use crate::notification::{NewNotification, Notification};
use crate::tournament::{NewTournament, Participant, Tournament, TournamentId};

const MATCH_SELECT: &str = "SELECT m.id, m.tournament_id,
        m.player1_id, p1.username AS player1_name,
        m.player2_id, p2.username AS player2_name,
        m.state, m.winner_id, m.score, m.created_at, m.finalized_at
     FROM matches m
     JOIN users p1 ON p1.id = m.player1_id
     JOIN users p2 ON p2.id = m.player2_id";

const PARTICIPANT_SELECT: &str = "SELECT tp.tournament_id, u.id, u.username
     FROM tournament_participants tp
     JOIN users u ON u.id = tp.user_id";

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    query_timeout: Duration,
    transaction_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self::with_query_timeout(pool, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_query_timeout(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
            transaction_timeout: transaction_timeout(query_timeout),
        }
    }

    async fn participants_of(&self, tournament_id: TournamentId) -> StoreResult<Vec<Participant>> {
        let sql = format!("{PARTICIPANT_SELECT} WHERE tp.tournament_id = $1 ORDER BY tp.enrolled_at, u.id");
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query(&sql).bind(tournament_id).fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(participant_from_row).collect())
    }

    async fn enroll_tx(
        &self,
        tournament_id: TournamentId,
        participant: &Participant,
        outbox: &[NewNotification],
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("SELECT id FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::MissingRecord {
                entity: "tournament",
                id: tournament_id,
            });
        }

        // Composite primary key makes a second enrollment a no-op
        let inserted = sqlx::query(
            "INSERT INTO tournament_participants (tournament_id, user_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(tournament_id)
        .bind(participant.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Ok(false);
        }

        queue_notifications(&mut tx, outbox).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn insert_match_tx(
        &self,
        new_match: &NewMatch,
        outbox: &[NewNotification],
    ) -> StoreResult<Match> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO matches (tournament_id, player1_id, player2_id, state)
             VALUES ($1, $2, $3, 'pending')
             RETURNING id, created_at",
        )
        .bind(new_match.tournament_id)
        .bind(new_match.player1.id)
        .bind(new_match.player2.id)
        .fetch_one(&mut *tx)
        .await?;

        queue_notifications(&mut tx, outbox).await?;
        tx.commit().await?;

        Ok(Match {
            id: row.get("id"),
            tournament_id: new_match.tournament_id,
            player1: new_match.player1.clone(),
            player2: new_match.player2.clone(),
            state: MatchState::Pending,
            winner_id: None,
            score: None,
            created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
            finalized_at: None,
        })
    }

    async fn finalize_tx(
        &self,
        match_id: MatchId,
        outcome: &MatchOutcome,
        outbox: &[NewNotification],
    ) -> StoreResult<Option<Match>> {
        let mut tx = self.pool.begin().await?;

        // Only a pending row matches, so racing submissions cannot both win
        let updated = sqlx::query(
            "UPDATE matches
             SET state = 'finalized', winner_id = $2, score = $3,
                 finalized_at = (NOW() AT TIME ZONE 'utc')
             WHERE id = $1 AND state = 'pending'
             RETURNING id",
        )
        .bind(match_id)
        .bind(outcome.winner_id)
        .bind(&outcome.score)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            let exists = sqlx::query("SELECT id FROM matches WHERE id = $1")
                .bind(match_id)
                .fetch_optional(&mut *tx)
                .await?;
            return match exists {
                Some(_) => Ok(None),
                None => Err(StoreError::MissingRecord {
                    entity: "match",
                    id: match_id,
                }),
            };
        }

        queue_notifications(&mut tx, outbox).await?;

        let sql = format!("{MATCH_SELECT} WHERE m.id = $1");
        let row = sqlx::query(&sql).bind(match_id).fetch_one(&mut *tx).await?;
        let finalized = match_from_row(&row)?;

        tx.commit().await?;
        Ok(Some(finalized))
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn participant_from_row(row: &PgRow) -> Participant {
    Participant::new(row.get("id"), row.get::<String, _>("username"))
}

fn tournament_from_row(row: &PgRow, participants: Vec<Participant>) -> Tournament {
    Tournament {
        id: row.get("id"),
        name: row.get("name"),
        game: row.get("game"),
        created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
        participants,
    }
}

fn match_from_row(row: &PgRow) -> StoreResult<Match> {
    let state = row
        .get::<String, _>("state")
        .parse::<MatchState>()
        .map_err(StoreError::Corrupt)?;

    Ok(Match {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        player1: Participant::new(row.get("player1_id"), row.get::<String, _>("player1_name")),
        player2: Participant::new(row.get("player2_id"), row.get::<String, _>("player2_name")),
        state,
        winner_id: row.get("winner_id"),
        score: row.get("score"),
        created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
        finalized_at: row
            .get::<Option<NaiveDateTime>, _>("finalized_at")
            .map(|t| t.and_utc()),
    })
}

fn notification_from_row(row: &PgRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        message: row.get("message"),
        read: row.get("is_read"),
        created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
    }
}

/// Insert the outbox inside an open transaction
async fn queue_notifications(
    tx: &mut Transaction<'_, Postgres>,
    outbox: &[NewNotification],
) -> StoreResult<()> {
    for notification in outbox {
        sqlx::query("INSERT INTO notifications (user_id, message) VALUES ($1, $2)")
            .bind(notification.user_id)
            .bind(&notification.message)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<Option<User>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                "INSERT INTO users (username, password_hash) VALUES ($1, $2)
                 ON CONFLICT (username) DO NOTHING
                 RETURNING id, username, created_at",
            )
            .bind(username)
            .bind(password_hash)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_id(&self, user_id: UserId) -> StoreResult<Option<User>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT id, username, created_at FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT id, username, created_at FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<Credentials>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                "SELECT id, username, created_at, password_hash FROM users WHERE username = $1",
            )
            .bind(username)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|r| Credentials {
            user: user_from_row(&r),
            password_hash: r.get("password_hash"),
        }))
    }
}

#[async_trait]
impl TournamentRepository for PgStore {
    async fn create_tournament(&self, tournament: &NewTournament) -> StoreResult<Tournament> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                "INSERT INTO tournaments (name, game) VALUES ($1, $2)
                 RETURNING id, name, game, created_at",
            )
            .bind(&tournament.name)
            .bind(&tournament.game)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(tournament_from_row(&row, Vec::new()))
    }

    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT id, name, game, created_at FROM tournaments ORDER BY id")
                .fetch_all(&self.pool),
        )
        .await?;

        let sql = format!("{PARTICIPANT_SELECT} ORDER BY tp.enrolled_at, u.id");
        let participant_rows = with_timeout(
            self.query_timeout,
            sqlx::query(&sql).fetch_all(&self.pool),
        )
        .await?;

        let mut participants: HashMap<TournamentId, Vec<Participant>> = HashMap::new();
        for row in &participant_rows {
            participants
                .entry(row.get("tournament_id"))
                .or_default()
                .push(participant_from_row(row));
        }

        Ok(rows
            .iter()
            .map(|row| {
                let id: TournamentId = row.get("id");
                tournament_from_row(row, participants.remove(&id).unwrap_or_default())
            })
            .collect())
    }

    async fn find_tournament(&self, tournament_id: TournamentId) -> StoreResult<Option<Tournament>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT id, name, game, created_at FROM tournaments WHERE id = $1")
                .bind(tournament_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        match row {
            Some(row) => {
                let participants = self.participants_of(tournament_id).await?;
                Ok(Some(tournament_from_row(&row, participants)))
            }
            None => Ok(None),
        }
    }

    async fn add_participant(
        &self,
        tournament_id: TournamentId,
        participant: &Participant,
        outbox: &[NewNotification],
    ) -> StoreResult<bool> {
        within(
            self.transaction_timeout,
            self.enroll_tx(tournament_id, participant, outbox),
        )
        .await
    }
}

#[async_trait]
impl MatchRepository for PgStore {
    async fn create_match(
        &self,
        new_match: &NewMatch,
        outbox: &[NewNotification],
    ) -> StoreResult<Match> {
        within(self.transaction_timeout, self.insert_match_tx(new_match, outbox)).await
    }

    async fn find_match(&self, match_id: MatchId) -> StoreResult<Option<Match>> {
        let sql = format!("{MATCH_SELECT} WHERE m.id = $1");
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(&sql).bind(match_id).fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        let sql = format!("{MATCH_SELECT} WHERE m.tournament_id = $1 ORDER BY m.id");
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query(&sql).bind(tournament_id).fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn finalize_match(
        &self,
        match_id: MatchId,
        outcome: &MatchOutcome,
        outbox: &[NewNotification],
    ) -> StoreResult<Option<Match>> {
        within(
            self.transaction_timeout,
            self.finalize_tx(match_id, outcome, outbox),
        )
        .await
    }
}

#[async_trait]
impl NotificationRepository for PgStore {
    async fn create_notification(&self, notification: &NewNotification) -> StoreResult<Notification> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                "INSERT INTO notifications (user_id, message) VALUES ($1, $2)
                 RETURNING id, user_id, message, is_read, created_at",
            )
            .bind(notification.user_id)
            .bind(&notification.message)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(notification_from_row(&row))
    }

    async fn take_unread(&self, user_id: UserId) -> StoreResult<Vec<Notification>> {
        // Row locks serialize concurrent polls; the loser re-checks is_read
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query(
                "UPDATE notifications SET is_read = TRUE
                 WHERE user_id = $1 AND is_read = FALSE
                 RETURNING id, user_id, message, is_read, created_at",
            )
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(notification_from_row).collect())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        with_timeout(
            self.query_timeout,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}
