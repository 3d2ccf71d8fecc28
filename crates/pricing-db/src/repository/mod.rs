//! # Repository Module
//!
//! Storage interfaces for the catalog and submitted scenarios, plus their
//! SQLite implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QuoteService<C, S> / admin handlers                                    │
//! │       │                                                                 │
//! │       │  catalog.list_services(false)                                   │
//! │       ▼                                                                 │
//! │  trait CatalogRepository          trait ScenarioRepository              │
//! │  ├── list_categories / save       ├── save_submission                   │
//! │  ├── list_tags / save_tag         ├── get                               │
//! │  ├── list_config_fields / save    ├── list_recent                       │
//! │  └── list/get/save/soft_delete    └── delete                            │
//! │       services                                                          │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  SqliteCatalogRepository           SqliteScenarioRepository             │
//! │       │                                    │                            │
//! │       └──────────────► SqlitePool ◄────────┘                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pricing engine only ever sees the plain types these return; tests
//! and alternative stores implement the traits directly.

use async_trait::async_trait;
use pricing_core::{Category, ConfigField, PricingItem, ScenarioSubmission, Tag};

use crate::error::DbResult;

pub mod catalog;
pub mod scenario;

pub use catalog::SqliteCatalogRepository;
pub use scenario::{SqliteScenarioRepository, StoredScenario};

/// Read/write access to the service catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All categories ordered by `sort_order`, then name.
    async fn list_categories(&self) -> DbResult<Vec<Category>>;

    /// Inserts or updates a category.
    async fn save_category(&self, category: &Category) -> DbResult<()>;

    async fn list_tags(&self) -> DbResult<Vec<Tag>>;

    async fn save_tag(&self, tag: &Tag) -> DbResult<()>;

    /// Config form fields ordered by `sort_order`.
    async fn list_config_fields(&self) -> DbResult<Vec<ConfigField>>;

    async fn save_config_field(&self, field: &ConfigField) -> DbResult<()>;

    /// Services with their tiers; inactive ones only when asked for.
    async fn list_services(&self, include_inactive: bool) -> DbResult<Vec<PricingItem>>;

    async fn get_service(&self, id: &str) -> DbResult<Option<PricingItem>>;

    /// Validates and upserts a service, replacing its tiers.
    ///
    /// Returns the stored service with `updated_at` set.
    async fn save_service(&self, item: &PricingItem) -> DbResult<PricingItem>;

    /// Marks a service inactive. Stored scenarios keep their snapshot.
    async fn soft_delete_service(&self, id: &str) -> DbResult<()>;
}

/// Persistence for submitted scenarios.
#[async_trait]
pub trait ScenarioRepository: Send + Sync {
    async fn save_submission(&self, submission: &ScenarioSubmission) -> DbResult<StoredScenario>;

    async fn get(&self, id: &str) -> DbResult<Option<StoredScenario>>;

    /// Newest first.
    async fn list_recent(&self, limit: u32) -> DbResult<Vec<StoredScenario>>;

    async fn delete(&self, id: &str) -> DbResult<()>;
}
