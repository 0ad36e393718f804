//! SQLite persistence for generated candidates.
//!
//! A single `passwords` table keyed by the candidate text. Every component
//! opens its own [`Store`]; there is no application-level lock. Concurrent
//! writers are serialized by SQLite (WAL mode plus a busy timeout) and
//! `INSERT OR IGNORE` turns duplicate keys into no-ops.

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::model::PersistedRecord;

/// How long a statement waits on another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle on the candidate database. Owns one connection.
pub struct Store {
    pool: SqlitePool,
    path: PathBuf,
}

impl Store {
    /// Open or create the database at `path` and make sure the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool, path };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create the table and index if missing. Safe to run any number of times.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS passwords (
                password    TEXT PRIMARY KEY,
                created     TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_created ON passwords(created)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a batch with insert-or-ignore semantics in one transaction.
    ///
    /// Returns the number of rows actually added; already-known passwords
    /// count as zero. The transaction is committed before this returns.
    pub async fn insert_batch(&self, passwords: &[String]) -> Result<u64> {
        if passwords.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for password in passwords {
            inserted += sqlx::query(
                "INSERT OR IGNORE INTO passwords (password, created) VALUES (?1, ?2)",
            )
            .bind(password)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn exists(&self, password: &str) -> Result<bool> {
        let hit: Option<i64> = sqlx::query_scalar("SELECT 1 FROM passwords WHERE password = ?1")
            .bind(password)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hit.is_some())
    }

    pub async fn get(&self, password: &str) -> Result<Option<PersistedRecord>> {
        let record = sqlx::query_as::<_, PersistedRecord>(
            "SELECT password, created FROM passwords WHERE password = ?1",
        )
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM passwords")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Most recently created records, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<PersistedRecord>> {
        let records = sqlx::query_as::<_, PersistedRecord>(
            "SELECT password, created FROM passwords ORDER BY created DESC, password ASC LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Every stored password, in key order.
    pub async fn passwords(&self) -> Result<Vec<String>> {
        let rows = sqlx::query_scalar("SELECT password FROM passwords ORDER BY password")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Close the connection, waiting for in-flight statements.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
