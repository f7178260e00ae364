//! SQLite-backed visit store.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::store::{StoreError, VisitRecorder};

const INSERT_VISIT: &str = "INSERT INTO visits VALUES(?, ?)";
const CREATE_VISITS: &str = "CREATE TABLE IF NOT EXISTS visits (id INTEGER, place_id INTEGER)";

/// Visit store over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteVisitStore {
    pool: SqlitePool,
}

impl SqliteVisitStore {
    /// Open a pool for `config.conn`, creating the database file if missing.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.conn)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(conn = %config.conn, max_connections = config.max_connections, "Visit store connected");
        Ok(Self { pool })
    }

    /// Create the `visits` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_VISITS).execute(&self.pool).await?;
        Ok(())
    }

    /// Number of recorded visits.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visits")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl VisitRecorder for SqliteVisitStore {
    async fn insert(&self, id: i64, place_id: i64) -> Result<(), StoreError> {
        sqlx::query(INSERT_VISIT)
            .bind(id)
            .bind(place_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
