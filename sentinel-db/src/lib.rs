//! SQLite store for Sentinel
//!
//! Holds the repository tree cache and review job records so both survive
//! across CLI invocations.

pub mod error;
pub mod models;
pub mod repos;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub use error::{Error, Result};
pub use models::JobRow;
pub use repos::{CacheRepo, JobsRepo};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create the database file at `db_path` and apply migrations
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io(format!("Failed to create database directory: {}", e)))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        debug!(path = %db_path.display(), "Opened database");
        Self::from_pool(pool).await
    }

    /// Private in-memory database, for tests and `--no-cache` style runs
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // Every connection to :memory: is a separate database, so pin one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Default database path (`~/.cache/sentinel/sentinel.db`)
    pub fn default_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| Error::Io("Could not determine cache directory".to_string()))?;
        Ok(cache_dir.join("sentinel").join("sentinel.db"))
    }

    /// Open the database at the default path
    pub async fn open_default() -> Result<Self> {
        Self::new(Self::default_path()?).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Key/value cache entries
    pub fn cache(&self) -> CacheRepo {
        CacheRepo::new(self.pool.clone())
    }

    /// Review job records
    pub fn jobs(&self) -> JobsRepo {
        JobsRepo::new(self.pool.clone())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("connections", &self.pool.size())
            .finish_non_exhaustive()
    }
}
