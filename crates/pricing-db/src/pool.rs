//! # Database Pool Management
//!
//! Opens the SQLite pool that backs the catalog and scenario repositories.
//!
//! ## Opening a Database
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  simulator.toml [database] ──► DatabaseSettings                         │
//! │                                     │                                   │
//! │                                     ▼  DbConfig::from(&settings)        │
//! │  tests ─────────────────────► DbConfig::in_memory()                     │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                          Database::new(config)                          │
//! │                    ┌────────────────┴────────────────┐                  │
//! │                    ▼                                 ▼                  │
//! │        DbLocation::File(path)              DbLocation::Memory           │
//! │        WAL, NORMAL sync, FKs on            one pinned connection, FKs   │
//! │                    └────────────────┬────────────────┘                  │
//! │                                     ▼                                   │
//! │                      embedded migrations (optional)                     │
//! │                                     │                                   │
//! │                    db.catalog()  ◄──┴──►  db.scenarios()                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An in-memory SQLite database lives only as long as its connection, so the
//! memory pool holds exactly one connection and never recycles it.

use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::DatabaseSettings;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::SqliteCatalogRepository;
use crate::repository::scenario::SqliteScenarioRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the catalog lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// SQLite file, created on first open.
    File(PathBuf),
    /// Private in-memory database, gone when the pool closes.
    Memory,
}

/// Pool settings resolved from [`DatabaseSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub location: DbLocation,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    /// `None` keeps idle connections open.
    pub idle_timeout: Option<Duration>,
    pub run_migrations: bool,
}

impl DbConfig {
    /// File database with the default `[database]` pool settings.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let mut config = DbConfig::from(&DatabaseSettings::default());
        config.location = DbLocation::File(path.into());
        config
    }

    /// Fresh, migrated in-memory database.
    ///
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        match &self.location {
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                // SQLite has them disabled by default
                .foreign_keys(true),
            DbLocation::Memory => SqliteConnectOptions::new()
                .in_memory(true)
                .foreign_keys(true),
        }
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout);

        match self.location {
            DbLocation::File(_) => options
                .max_connections(self.max_connections)
                .min_connections(self.min_connections.min(self.max_connections)),
            DbLocation::Memory => options
                .max_connections(1)
                .min_connections(1)
                .max_lifetime(None::<Duration>)
                .idle_timeout(None::<Duration>),
        }
    }
}

impl From<&DatabaseSettings> for DbConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        DbConfig {
            location: DbLocation::File(settings.path.clone()),
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            idle_timeout: match settings.idle_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            run_migrations: settings.run_migrations,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the pricing database.
///
/// Cloning is cheap; repositories handed out by [`Database::catalog`] and
/// [`Database::scenarios`] share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, when configured, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        match &config.location {
            DbLocation::File(path) => info!(path = %path.display(), "Opening pricing database"),
            DbLocation::Memory => debug!("Opening in-memory pricing database"),
        }

        let pool = config
            .pool_options()
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database pool created"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Pricing schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Services, categories, tags and config fields.
    pub fn catalog(&self) -> SqliteCatalogRepository {
        SqliteCatalogRepository::new(self.pool.clone())
    }

    /// Submitted scenarios.
    pub fn scenarios(&self) -> SqliteScenarioRepository {
        SqliteScenarioRepository::new(self.pool.clone())
    }

    /// Closes the pool; repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing pricing database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
