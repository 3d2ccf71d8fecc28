//! # Quote Service
//!
//! Glues the pure engine to the repositories.
//!
//! ```text
//!   start_scenario ─► catalog.list_services(false) ─► Scenario::apply_config
//!   summarize      ─► catalog.list_categories()    ─► aggregate_with(classifier)
//!   submit         ─► summarize + submission       ─► scenarios.save_submission
//! ```
//!
//! The service is generic over the repository traits so tests can run it
//! against in-memory SQLite or hand-written fakes.

use tracing::{debug, info};

use pricing_core::{
    BillingClassifier, Category, ClientConfig, ConfigChange, ConfigField, CoreError, CoreResult,
    PricingItem, Scenario, ScenarioSummary,
};

use crate::error::DbResult;
use crate::repository::{CatalogRepository, ScenarioRepository, StoredScenario};

/// Everything the quote editor needs to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub config_fields: Vec<ConfigField>,
    /// Active services only.
    pub services: Vec<PricingItem>,
}

impl Catalog {
    pub fn service(&self, id: &str) -> Option<&PricingItem> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Like [`Catalog::service`], but a missing or retired id is an error.
    pub fn require_service(&self, id: &str) -> CoreResult<&PricingItem> {
        self.service(id)
            .ok_or_else(|| CoreError::ServiceNotFound(id.to_string()))
    }
}

/// Quote workflows over a catalog store and a scenario store.
#[derive(Debug, Clone)]
pub struct QuoteService<C, S> {
    catalog: C,
    scenarios: S,
    classifier: BillingClassifier,
}

impl<C, S> QuoteService<C, S>
where
    C: CatalogRepository,
    S: ScenarioRepository,
{
    pub fn new(catalog: C, scenarios: S, classifier: BillingClassifier) -> Self {
        QuoteService {
            catalog,
            scenarios,
            classifier,
        }
    }

    pub fn catalog_repository(&self) -> &C {
        &self.catalog
    }

    pub fn scenario_repository(&self) -> &S {
        &self.scenarios
    }

    pub fn classifier(&self) -> &BillingClassifier {
        &self.classifier
    }

    /// Loads categories, form fields and active services.
    pub async fn load_catalog(&self) -> DbResult<Catalog> {
        Ok(Catalog {
            categories: self.catalog.list_categories().await?,
            config_fields: self.catalog.list_config_fields().await?,
            services: self.catalog.list_services(false).await?,
        })
    }

    /// Opens a new scenario and applies `config`, pulling in auto-added
    /// services.
    ///
    /// Form defaults fill any field `config` leaves out.
    pub async fn start_scenario(
        &self,
        client_name: Option<String>,
        config: ClientConfig,
    ) -> DbResult<Scenario> {
        let catalog = self.load_catalog().await?;

        let mut scenario = Scenario::new(client_name);
        let change = scenario.apply_config(
            with_form_defaults(&catalog.config_fields, config),
            &catalog.services,
        )?;

        info!(
            added = change.added.len(),
            client = scenario.client_name.as_deref().unwrap_or("-"),
            "Scenario started"
        );
        Ok(scenario)
    }

    /// Re-applies a changed config against the current catalog.
    ///
    /// Form defaults fill any field `config` leaves out, as in
    /// [`QuoteService::start_scenario`].
    pub async fn update_config(
        &self,
        scenario: &mut Scenario,
        config: ClientConfig,
    ) -> DbResult<ConfigChange> {
        let fields = self.catalog.list_config_fields().await?;
        let services = self.catalog.list_services(false).await?;
        let change = scenario.apply_config(with_form_defaults(&fields, config), &services)?;

        debug!(
            added = change.added.len(),
            removed = change.removed.len(),
            requantified = change.requantified.len(),
            "Scenario config updated"
        );
        Ok(change)
    }

    pub async fn summarize(&self, scenario: &Scenario) -> DbResult<ScenarioSummary> {
        let categories = self.catalog.list_categories().await?;
        Ok(scenario.summary_with(&categories, &self.classifier))
    }

    /// Persists the scenario with a freshly computed summary.
    pub async fn submit(&self, scenario: &Scenario) -> DbResult<StoredScenario> {
        let categories = self.catalog.list_categories().await?;
        let submission = scenario.submission(&categories, &self.classifier);
        self.scenarios.save_submission(&submission).await
    }
}

/// Overlays `config` on the form's default values.
fn with_form_defaults(fields: &[ConfigField], config: ClientConfig) -> ClientConfig {
    let mut effective = ConfigField::default_values(fields);
    for (field, value) in config.iter() {
        effective.set(field.clone(), value.clone());
    }
    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{SqliteCatalogRepository, SqliteScenarioRepository};
    use crate::{Database, DbConfig, DbError};
    use pricing_core::{AutoAddRule, ConfigValue, FieldType, Money, PricingTier};

    async fn service() -> QuoteService<SqliteCatalogRepository, SqliteScenarioRepository> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        for (id, name) in [("setup", "Setup"), ("licenses", "Licenses"), ("support", "Support")] {
            catalog.save_category(&Category::new(id, name)).await.unwrap();
        }

        catalog
            .save_config_field(&ConfigField {
                id: "needs_sso".to_string(),
                name: "Needs SSO".to_string(),
                description: None,
                field_type: FieldType::Boolean,
                options: Vec::new(),
                default_value: Some(ConfigValue::Bool(true)),
                unit: None,
                sort_order: 0,
                is_active: true,
            })
            .await
            .unwrap();

        catalog
            .save_service(
                &PricingItem::new("sso", "SSO setup", "setup", "onetime", Money::from_cents(80000))
                    .with_auto_add(AutoAddRule::when_flag("needs_sso", true)),
            )
            .await
            .unwrap();
        catalog
            .save_service(
                &PricingItem::new("cards", "Card licenses", "licenses", "per_card", Money::from_cents(500))
                    .with_tiers(vec![
                        PricingTier::new("small", 1, Some(99), Money::from_cents(400)),
                        PricingTier::new("large", 100, None, Money::from_cents(300)),
                    ])
                    .with_quantity_sources(["cards"]),
            )
            .await
            .unwrap();
        catalog
            .save_service(&PricingItem::new(
                "support",
                "Support",
                "support",
                "per_month",
                Money::from_cents(5000),
            ))
            .await
            .unwrap();

        QuoteService::new(catalog, db.scenarios(), BillingClassifier::default())
    }

    #[tokio::test]
    async fn test_load_catalog() {
        let service = service().await;
        let catalog = service.load_catalog().await.unwrap();
        assert_eq!(catalog.categories.len(), 3);
        assert_eq!(catalog.config_fields.len(), 1);
        assert_eq!(catalog.services.len(), 3);
        assert!(catalog.service("cards").is_some());
    }

    #[tokio::test]
    async fn test_require_service_reports_unknown_and_retired_ids() {
        let service = service().await;
        service
            .catalog_repository()
            .soft_delete_service("support")
            .await
            .unwrap();
        let catalog = service.load_catalog().await.unwrap();

        assert_eq!(catalog.require_service("cards").unwrap().id, "cards");
        for id in ["support", "nope"] {
            let err = catalog.require_service(id).unwrap_err();
            assert!(matches!(&err, CoreError::ServiceNotFound(missing) if missing == id));
            assert!(matches!(DbError::from(err), DbError::Core(_)));
        }
    }

    #[tokio::test]
    async fn test_start_scenario_applies_defaults_and_auto_add() {
        let service = service().await;

        // needs_sso defaults to true on the form
        let scenario = service
            .start_scenario(Some("Acme".into()), ClientConfig::new().with("cards", 150i64))
            .await
            .unwrap();
        assert!(scenario.find_service("sso").unwrap().auto_added);
        assert_eq!(scenario.config().get("needs_sso"), Some(&ConfigValue::Bool(true)));

        // Explicit values win over defaults
        let scenario = service
            .start_scenario(None, ClientConfig::new().with("needs_sso", false))
            .await
            .unwrap();
        assert!(scenario.is_empty());
    }

    #[tokio::test]
    async fn test_summarize_and_submit() {
        let service = service().await;
        let catalog = service.load_catalog().await.unwrap();

        let mut scenario = service
            .start_scenario(Some("Acme".into()), ClientConfig::new().with("cards", 150i64))
            .await
            .unwrap();
        scenario
            .add_service(catalog.service("cards").unwrap(), 0)
            .unwrap();
        scenario
            .add_service(catalog.service("support").unwrap(), 1)
            .unwrap();

        let summary = service.summarize(&scenario).await.unwrap();
        assert_eq!(summary.one_time_total.cents(), 80000);
        // 150 cards at 3.00 plus 50.00 support, per month
        assert_eq!(summary.monthly_total.cents(), 50000);
        assert_eq!(summary.yearly_total.cents(), 600000);
        assert_eq!(summary.total_project_cost.cents(), 680000);

        let stored = service.submit(&scenario).await.unwrap();
        let loaded = service
            .scenario_repository()
            .get(&stored.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.submission.summary, summary);
        assert_eq!(Scenario::from_submission(loaded.submission), scenario);
    }

    #[tokio::test]
    async fn test_update_config_removes_auto_added_service() {
        let service = service().await;
        let mut scenario = service
            .start_scenario(None, ClientConfig::new())
            .await
            .unwrap();
        assert!(scenario.find_service("sso").is_some());

        service
            .update_config(&mut scenario, ClientConfig::new().with("needs_sso", false))
            .await
            .unwrap();
        assert!(scenario.find_service("sso").is_none());
    }

    #[tokio::test]
    async fn test_update_config_keeps_default_driven_service() {
        let service = service().await;
        let mut scenario = service
            .start_scenario(None, ClientConfig::new().with("cards", 10i64))
            .await
            .unwrap();
        assert!(scenario.find_service("sso").unwrap().auto_added);

        let change = service
            .update_config(&mut scenario, ClientConfig::new().with("cards", 20i64))
            .await
            .unwrap();

        assert!(change.removed.is_empty());
        assert!(scenario.find_service("sso").is_some());
        assert_eq!(scenario.config().get("needs_sso"), Some(&ConfigValue::Bool(true)));
    }

    #[tokio::test]
    async fn test_retired_service_cannot_be_quoted() {
        let service = service().await;
        service
            .catalog_repository()
            .soft_delete_service("support")
            .await
            .unwrap();
        let retired = service
            .catalog_repository()
            .get_service("support")
            .await
            .unwrap()
            .unwrap();

        let mut scenario = Scenario::new(None);
        let err = scenario.add_service(&retired, 1).unwrap_err();
        assert!(matches!(err, CoreError::InactiveService(_)));
        let err: DbError = err.into();
        assert!(!err.is_validation());
    }
}
