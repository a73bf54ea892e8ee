//! Database module providing PostgreSQL connection pooling and the storage
//! backends behind the managers.
//!
//! Managers depend on the [`Store`] trait only. [`PgStore`] is the production
//! backend; [`MemoryStore`] backs tests and local runs without a database.

use log::{info, warn};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod errors;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{
    MatchRepository, NotificationRepository, Store, TournamentRepository, UserRepository,
};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    query_timeout: Duration,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tourney::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), tourney::db::StoreError> {
    ///     let config = DatabaseConfig::development();
    ///     let db = Database::new(&config).await?;
    ///     db.migrate().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self {
            pool,
            query_timeout: config.query_timeout(),
        })
    }

    /// Connect, retrying with a fixed delay while the database comes up
    ///
    /// Makes at most `config.connect_attempts` attempts (at least one) and
    /// returns the last error if all of them fail.
    pub async fn connect_with_retry(config: &DatabaseConfig) -> StoreResult<Self> {
        let attempts = config.connect_attempts.max(1);
        let mut attempt = 1;

        loop {
            match Self::new(config).await {
                Ok(db) => {
                    info!("Connected to database on attempt {attempt}");
                    return Ok(db);
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        "Database connection attempt {attempt}/{attempts} failed: {e}; retrying in {:?}",
                        config.connect_backoff()
                    );
                    tokio::time::sleep(config.connect_backoff()).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Build a store over this pool
    pub fn store(&self) -> PgStore {
        PgStore::with_query_timeout(self.pool.clone(), self.query_timeout)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> StoreResult<()> {
        timeouts::with_timeout(
            self.query_timeout,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
