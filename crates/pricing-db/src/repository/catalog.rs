//! # Catalog Repository
//!
//! SQLite storage for services, their tiers, categories, tags and the
//! client configuration form.
//!
//! ## Service Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PricingItem                                                           │
//! │  ├── scalar fields ───────────────► services row                       │
//! │  ├── quantity_source_fields ──┐                                        │
//! │  ├── auto_add_rules ──────────┼──► JSON TEXT columns on services       │
//! │  ├── tags ────────────────────┘                                        │
//! │  └── tiers ───────────────────────► pricing_tiers rows (service_id FK) │
//! │                                                                         │
//! │  save_service = one transaction:                                       │
//! │    UPSERT services → DELETE tiers of service → INSERT each tier        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Services are never hard-deleted: stored scenarios snapshot the whole
//! item, and the admin list can still show retired entries.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use pricing_core::validation::{validate_id, validate_name, validate_service};
use pricing_core::{
    Category, ConfigField, FieldType, Money, PricingItem, PricingTier, PricingType, Tag,
    ValidationError,
};

use super::CatalogRepository;
use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    description: Option<String>,
    sort_order: i64,
    is_active: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            sort_order: row.sort_order,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    id: String,
    name: String,
    color: Option<String>,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag {
            id: row.id,
            name: row.name,
            color: row.color,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConfigFieldRow {
    id: String,
    name: String,
    description: Option<String>,
    field_type: FieldType,
    options: String,
    default_value: Option<String>,
    unit: Option<String>,
    sort_order: i64,
    is_active: bool,
}

impl ConfigFieldRow {
    fn into_field(self) -> DbResult<ConfigField> {
        Ok(ConfigField {
            id: self.id,
            name: self.name,
            description: self.description,
            field_type: self.field_type,
            options: serde_json::from_str(&self.options)?,
            default_value: self
                .default_value
                .map(|raw| serde_json::from_str(&raw))
                .transpose()?,
            unit: self.unit,
            sort_order: self.sort_order,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: String,
    name: String,
    description: String,
    category_id: String,
    unit: String,
    default_price_cents: i64,
    pricing_type: PricingType,
    quantity_source_fields: String,
    quantity_multiplier: f64,
    auto_add_rules: String,
    tags: String,
    is_active: bool,
    sort_order: i64,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_item(self, tiers: Vec<PricingTier>) -> DbResult<PricingItem> {
        Ok(PricingItem {
            id: self.id,
            name: self.name,
            description: self.description,
            category_id: self.category_id,
            unit: self.unit,
            default_price: Money::from_cents(self.default_price_cents),
            pricing_type: self.pricing_type,
            tiers,
            quantity_source_fields: serde_json::from_str(&self.quantity_source_fields)?,
            quantity_multiplier: self.quantity_multiplier,
            auto_add_rules: serde_json::from_str(&self.auto_add_rules)?,
            tags: serde_json::from_str(&self.tags)?,
            is_active: self.is_active,
            sort_order: self.sort_order,
            updated_at: Some(self.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TierRow {
    service_id: String,
    id: String,
    name: String,
    min_quantity: i64,
    max_quantity: Option<i64>,
    unit_price_cents: i64,
    description: Option<String>,
    config_reference: Option<String>,
}

impl From<TierRow> for PricingTier {
    fn from(row: TierRow) -> Self {
        PricingTier {
            id: row.id,
            name: row.name,
            min_quantity: row.min_quantity,
            max_quantity: row.max_quantity,
            unit_price: Money::from_cents(row.unit_price_cents),
            description: row.description,
            config_reference: row.config_reference,
        }
    }
}

const SERVICE_COLUMNS: &str = r#"
    id, name, description, category_id, unit, default_price_cents,
    pricing_type, quantity_source_fields, quantity_multiplier,
    auto_add_rules, tags, is_active, sort_order, updated_at
"#;

const TIER_COLUMNS: &str = r#"
    service_id, id, name, min_quantity, max_quantity, unit_price_cents,
    description, config_reference
"#;

// =============================================================================
// Repository
// =============================================================================

/// SQLite-backed [`CatalogRepository`].
#[derive(Debug, Clone)]
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCatalogRepository { pool }
    }

    /// Counts active services (for diagnostics and the seed binary).
    pub async fn count_services(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn tiers_for(&self, service_id: &str) -> DbResult<Vec<PricingTier>> {
        let sql = format!(
            "SELECT {TIER_COLUMNS} FROM pricing_tiers WHERE service_id = ?1 ORDER BY min_quantity"
        );
        let rows: Vec<TierRow> = sqlx::query_as(&sql)
            .bind(service_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(PricingTier::from).collect())
    }

    async fn all_tiers(&self) -> DbResult<HashMap<String, Vec<PricingTier>>> {
        let sql = format!("SELECT {TIER_COLUMNS} FROM pricing_tiers ORDER BY service_id, min_quantity");
        let rows: Vec<TierRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        let mut by_service: HashMap<String, Vec<PricingTier>> = HashMap::new();
        for row in rows {
            by_service
                .entry(row.service_id.clone())
                .or_default()
                .push(row.into());
        }
        Ok(by_service)
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    // =========================================================================
    // Categories
    // =========================================================================

    async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, sort_order, is_active
            FROM categories
            ORDER BY sort_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn save_category(&self, category: &Category) -> DbResult<()> {
        validate_id("category id", &category.id)?;
        validate_name("category name", &category.name)?;

        debug!(id = %category.id, "Saving category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, sort_order, is_active, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                sort_order = excluded.sort_order,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Tags
    // =========================================================================

    async fn list_tags(&self) -> DbResult<Vec<Tag>> {
        let rows: Vec<TagRow> = sqlx::query_as("SELECT id, name, color FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn save_tag(&self, tag: &Tag) -> DbResult<()> {
        validate_id("tag id", &tag.id)?;
        validate_name("tag name", &tag.name)?;

        debug!(id = %tag.id, "Saving tag");

        sqlx::query(
            r#"
            INSERT INTO tags (id, name, color, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                color = excluded.color,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Config Fields
    // =========================================================================

    async fn list_config_fields(&self) -> DbResult<Vec<ConfigField>> {
        let rows: Vec<ConfigFieldRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, field_type, options, default_value,
                   unit, sort_order, is_active
            FROM config_fields
            ORDER BY sort_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ConfigFieldRow::into_field).collect()
    }

    async fn save_config_field(&self, field: &ConfigField) -> DbResult<()> {
        validate_id("config field id", &field.id)?;
        validate_name("config field name", &field.name)?;
        if field.field_type == FieldType::Select && field.options.is_empty() {
            return Err(ValidationError::Required {
                field: "options".to_string(),
            }
            .into());
        }

        debug!(id = %field.id, field_type = ?field.field_type, "Saving config field");

        let options = serde_json::to_string(&field.options)?;
        let default_value = field
            .default_value
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO config_fields (
                id, name, description, field_type, options, default_value,
                unit, sort_order, is_active, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                field_type = excluded.field_type,
                options = excluded.options,
                default_value = excluded.default_value,
                unit = excluded.unit,
                sort_order = excluded.sort_order,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&field.id)
        .bind(&field.name)
        .bind(&field.description)
        .bind(field.field_type)
        .bind(options)
        .bind(default_value)
        .bind(&field.unit)
        .bind(field.sort_order)
        .bind(field.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Services
    // =========================================================================

    async fn list_services(&self, include_inactive: bool) -> DbResult<Vec<PricingItem>> {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE (?1 OR is_active = 1) ORDER BY sort_order, name"
        );
        let rows: Vec<ServiceRow> = sqlx::query_as(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        let mut tiers = self.all_tiers().await?;
        let services = rows
            .into_iter()
            .map(|row| {
                let service_tiers = tiers.remove(&row.id).unwrap_or_default();
                row.into_item(service_tiers)
            })
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = services.len(), include_inactive, "Listed services");
        Ok(services)
    }

    async fn get_service(&self, id: &str) -> DbResult<Option<PricingItem>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1");
        let row: Option<ServiceRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let tiers = self.tiers_for(id).await?;
                Ok(Some(row.into_item(tiers)?))
            }
            None => Ok(None),
        }
    }

    async fn save_service(&self, item: &PricingItem) -> DbResult<PricingItem> {
        validate_service(item)?;

        let now = Utc::now();
        let quantity_source_fields = serde_json::to_string(&item.quantity_source_fields)?;
        let auto_add_rules = serde_json::to_string(&item.auto_add_rules)?;
        let tags = serde_json::to_string(&item.tags)?;

        debug!(id = %item.id, tiers = item.tiers.len(), "Saving service");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO services (
                id, name, description, category_id, unit, default_price_cents,
                pricing_type, quantity_source_fields, quantity_multiplier,
                auto_add_rules, tags, is_active, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                category_id = excluded.category_id,
                unit = excluded.unit,
                default_price_cents = excluded.default_price_cents,
                pricing_type = excluded.pricing_type,
                quantity_source_fields = excluded.quantity_source_fields,
                quantity_multiplier = excluded.quantity_multiplier,
                auto_add_rules = excluded.auto_add_rules,
                tags = excluded.tags,
                is_active = excluded.is_active,
                sort_order = excluded.sort_order,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.category_id)
        .bind(&item.unit)
        .bind(item.default_price.cents())
        .bind(item.pricing_type)
        .bind(quantity_source_fields)
        .bind(item.quantity_multiplier)
        .bind(auto_add_rules)
        .bind(tags)
        .bind(item.is_active)
        .bind(item.sort_order)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM pricing_tiers WHERE service_id = ?1")
            .bind(&item.id)
            .execute(&mut *tx)
            .await?;

        for tier in &item.tiers {
            sqlx::query(
                r#"
                INSERT INTO pricing_tiers (
                    service_id, id, name, min_quantity, max_quantity,
                    unit_price_cents, description, config_reference
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&tier.id)
            .bind(&tier.name)
            .bind(tier.min_quantity)
            .bind(tier.max_quantity)
            .bind(tier.unit_price.cents())
            .bind(&tier.description)
            .bind(&tier.config_reference)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %item.id, pricing_type = %item.pricing_type, "Service saved");

        let mut saved = item.clone();
        saved.updated_at = Some(now);
        Ok(saved)
    }

    async fn soft_delete_service(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting service");

        let result = sqlx::query("UPDATE services SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use pricing_core::{AutoAddRule, ConfigValue};

    async fn repo() -> SqliteCatalogRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();
        repo.save_category(&Category::new("licenses", "Licenses"))
            .await
            .unwrap();
        repo
    }

    fn cards() -> PricingItem {
        let mut item = PricingItem::new(
            "cards",
            "Card licenses",
            "licenses",
            "per_card",
            Money::from_cents(500),
        )
        .with_tiers(vec![
            PricingTier::new("small", 1, Some(99), Money::from_cents(400)),
            PricingTier::new("large", 100, None, Money::from_cents(300)),
        ])
        .with_quantity_sources(["cards", "spare_cards"])
        .with_auto_add(AutoAddRule::when_flag("needs_cards", true));
        item.tags = vec!["hardware".to_string()];
        item.quantity_multiplier = 1.5;
        item
    }

    #[tokio::test]
    async fn test_categories_are_ordered() {
        let repo = repo().await;
        let mut setup = Category::new("setup", "Setup");
        setup.sort_order = -1;
        repo.save_category(&setup).await.unwrap();

        let categories = repo.list_categories().await.unwrap();
        let ids: Vec<_> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["setup", "licenses"]);
    }

    #[tokio::test]
    async fn test_save_category_upserts() {
        let repo = repo().await;
        let mut renamed = Category::new("licenses", "Software licenses");
        renamed.description = Some("Per-seat".to_string());
        repo.save_category(&renamed).await.unwrap();

        let categories = repo.list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0], renamed);
    }

    #[tokio::test]
    async fn test_service_round_trip() {
        let repo = repo().await;
        let saved = repo.save_service(&cards()).await.unwrap();
        assert!(saved.updated_at.is_some());

        let mut loaded = repo.get_service("cards").await.unwrap().unwrap();
        assert!(loaded.updated_at.is_some());
        loaded.updated_at = None;
        assert_eq!(loaded, cards());
    }

    #[tokio::test]
    async fn test_save_service_replaces_tiers() {
        let repo = repo().await;
        repo.save_service(&cards()).await.unwrap();

        let flat = cards().with_tiers(vec![PricingTier::new("all", 0, None, Money::from_cents(350))]);
        repo.save_service(&flat).await.unwrap();

        let loaded = repo.get_service("cards").await.unwrap().unwrap();
        assert_eq!(loaded.tiers.len(), 1);
        assert_eq!(loaded.tiers[0].id, "all");
    }

    #[tokio::test]
    async fn test_invalid_service_is_rejected() {
        let repo = repo().await;
        let overlapping = cards().with_tiers(vec![
            PricingTier::new("a", 1, Some(100), Money::from_cents(400)),
            PricingTier::new("b", 50, None, Money::from_cents(300)),
        ]);

        let err = repo.save_service(&overlapping).await.unwrap_err();
        assert!(err.is_validation());
        assert!(repo.get_service("cards").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let repo = repo().await;
        let mut orphan = cards();
        orphan.category_id = "nope".to_string();

        let err = repo.save_service(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(repo.get_service("cards").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_service() {
        let repo = repo().await;
        repo.save_service(&cards()).await.unwrap();
        repo.save_service(&PricingItem::new(
            "support",
            "Support",
            "licenses",
            "per_month",
            Money::from_cents(5000),
        ))
        .await
        .unwrap();
        assert_eq!(repo.count_services().await.unwrap(), 2);

        repo.soft_delete_service("cards").await.unwrap();

        let active = repo.list_services(false).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "support");

        let all = repo.list_services(true).await.unwrap();
        assert_eq!(all.len(), 2);
        let retired = all.iter().find(|s| s.id == "cards").unwrap();
        assert!(!retired.is_active);
        assert_eq!(retired.tiers.len(), 2);

        assert!(matches!(
            repo.soft_delete_service("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_config_field_round_trip() {
        let repo = repo().await;
        let field = ConfigField {
            id: "needs_sso".to_string(),
            name: "Needs single sign-on".to_string(),
            description: None,
            field_type: FieldType::Boolean,
            options: Vec::new(),
            default_value: Some(ConfigValue::Bool(false)),
            unit: None,
            sort_order: 2,
            is_active: true,
        };
        let region = ConfigField {
            id: "region".to_string(),
            name: "Region".to_string(),
            description: Some("Hosting region".to_string()),
            field_type: FieldType::Select,
            options: vec!["eu".to_string(), "us".to_string()],
            default_value: Some(ConfigValue::Text("eu".to_string())),
            unit: None,
            sort_order: 1,
            is_active: true,
        };
        repo.save_config_field(&field).await.unwrap();
        repo.save_config_field(&region).await.unwrap();

        let fields = repo.list_config_fields().await.unwrap();
        assert_eq!(fields, vec![region.clone(), field]);

        let mut no_options = region;
        no_options.options.clear();
        assert!(repo.save_config_field(&no_options).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_duplicate_tag_name_is_rejected() {
        let repo = repo().await;
        let hardware = Tag {
            id: "hw".to_string(),
            name: "Hardware".to_string(),
            color: Some("#336699".to_string()),
        };
        repo.save_tag(&hardware).await.unwrap();

        let clash = Tag {
            id: "hw2".to_string(),
            name: "Hardware".to_string(),
            color: None,
        };
        assert!(matches!(
            repo.save_tag(&clash).await,
            Err(DbError::UniqueViolation { .. })
        ));
        assert_eq!(repo.list_tags().await.unwrap(), vec![hardware]);
    }
}
