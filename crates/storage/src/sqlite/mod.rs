use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{InMemoryStore, KeyValueStore, StorageError};
use crate::session_store::{CredentialStore, SessionStore};

mod migrate;

/// Table holding the ephemeral per-attempt keys.
const SESSION_TABLE: &str = "session_store";
/// Table holding the longer-lived registered identity.
const PROFILE_TABLE: &str = "profile_store";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A `SQLite`-backed key/value store scoped to one table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    table: &'static str,
}

impl SqliteStore {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or
    /// if the setup PRAGMAs fail.
    pub async fn connect(database_url: &str) -> Result<SqlitePool, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(pool)
    }

    /// Store view over the session table.
    #[must_use]
    pub fn session(pool: SqlitePool) -> Self {
        Self {
            pool,
            table: SESSION_TABLE,
        }
    }

    /// Store view over the profile table.
    #[must_use]
    pub fn profile(pool: SqlitePool) -> Self {
        Self {
            pool,
            table: PROFILE_TABLE,
        }
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(pool: &SqlitePool) -> Result<(), SqliteInitError> {
        migrate::run_migrations(pool).await
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let sql = format!("SELECT value FROM {} WHERE key = ?1", self.table);
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok(Some(value))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let sql = format!(
            "INSERT INTO {} (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            self.table
        );
        sqlx::query(&sql)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let sql = format!("DELETE FROM {} WHERE key = ?1", self.table);
        sqlx::query(&sql)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let sql = format!("DELETE FROM {}", self.table);
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}

/// Aggregates the two typed stores behind one handle for easy backend
/// swapping.
#[derive(Clone)]
pub struct Stores {
    pub session: SessionStore,
    pub credentials: CredentialStore,
}

impl Stores {
    /// Purely in-memory stores (tests, default setup with no `--db`).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            session: SessionStore::new(Arc::new(InMemoryStore::new())),
            credentials: CredentialStore::new(Arc::new(InMemoryStore::new())),
        }
    }

    /// Build stores backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqliteStore::connect(database_url).await?;
        SqliteStore::migrate(&pool).await?;
        let session: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::session(pool.clone()));
        let profile: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::profile(pool));
        Ok(Self {
            session: SessionStore::new(session),
            credentials: CredentialStore::new(profile),
        })
    }
}
