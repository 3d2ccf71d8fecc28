//! # pricing-db: Persistence Layer for the Pricing Simulator
//!
//! SQLite storage for the service catalog and submitted scenarios, the
//! simulator configuration, and the quote service that ties them to the
//! pure engine in `pricing-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Pricing Simulator Data Flow                         │
//! │                                                                         │
//! │  Admin forms / quote editor                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pricing-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌────────────────┐   ┌──────────────┐     │   │
//! │  │   │ QuoteService │──►│  Repositories  │──►│   Database   │     │   │
//! │  │   │ (service.rs) │   │ Catalog        │   │  (pool.rs)   │     │   │
//! │  │   │              │   │ Scenario       │   │  migrations  │     │   │
//! │  │   └──────┬───────┘   └────────────────┘   └──────────────┘     │   │
//! │  │          │  SimulatorConfig (config.rs)                         │   │
//! │  └──────────┼──────────────────────────────────────────────────────┘   │
//! │             ▼                                                           │
//! │        pricing-core (tiers, discounts, rules, aggregation)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Repository traits and SQLite implementations
//! - [`service`] - Quote workflows over the repositories
//! - [`config`] - `simulator.toml` + environment configuration
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pricing_db::{Database, QuoteService, SimulatorConfig};
//!
//! let config = SimulatorConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let quotes = QuoteService::new(db.catalog(), db.scenarios(), config.classifier());
//!
//! let scenario = quotes.start_scenario(Some("Acme".into()), client_config).await?;
//! let summary = quotes.summarize(&scenario).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, SimulatorConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbLocation};
pub use repository::{
    CatalogRepository, ScenarioRepository, SqliteCatalogRepository, SqliteScenarioRepository,
    StoredScenario,
};
pub use service::{Catalog, QuoteService};
