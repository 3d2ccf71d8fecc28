//! # Scenario Editor
//!
//! Typed state behind the quote editor: the client's configuration plus the
//! services selected for them.
//!
//! ## Edit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form / editor action          Scenario method        Engine call       │
//! │  ────────────────────          ───────────────        ───────────       │
//! │  Pick a service ─────────────► add_service() ───────► effective_unit_   │
//! │                                                       price, auto qty   │
//! │  Change quantity ────────────► set_quantity() ──────► tier refresh      │
//! │  Change discount / free ─────► set_discount() / set_free()              │
//! │  Edit config form ───────────► apply_config() ──────► auto quantity,    │
//! │                                                       auto add/remove   │
//! │  Show totals ────────────────► summary() ───────────► aggregate         │
//! │  Submit ─────────────────────► submission() ────────► stored blob       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A service appears at most once per scenario. Items flagged `auto_added`
//! were pulled in by a rule and leave again when no rule fires any more;
//! hand-picked items are never removed by a config change.

use serde::{Deserialize, Serialize};

use crate::aggregator::{aggregate_with, BillingClassifier};
use crate::calculator::{line_breakdown, LineBreakdown};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::rules::{auto_add_candidates, compute_auto_quantity, evaluate_auto_add};
use crate::tier::effective_unit_price;
use crate::types::{
    Category, ClientConfig, Discount, DiscountApplication, DiscountEntry, PricingItem,
    PricingType, ScenarioSubmission, ScenarioSummary, SelectedItem,
};
use crate::validation::{validate_discount, validate_price, validate_quantity};
use crate::{MAX_ITEM_QUANTITY, MAX_SCENARIO_ITEMS};

/// What a config change did to the scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigChange {
    /// Service ids pulled in by auto-add rules.
    pub added: Vec<String>,
    /// Service ids dropped because their rules stopped firing.
    pub removed: Vec<String>,
    /// Selected item ids whose auto quantity changed.
    pub requantified: Vec<String>,
}

impl ConfigChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.requantified.is_empty()
    }
}

/// A client-specific selection of services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub client_name: Option<String>,
    config: ClientConfig,
    items: Vec<SelectedItem>,
}

impl Scenario {
    pub fn new(client_name: Option<String>) -> Self {
        Scenario {
            client_name,
            config: ClientConfig::new(),
            items: Vec::new(),
        }
    }

    /// Reopens a submitted scenario for editing.
    pub fn from_submission(submission: ScenarioSubmission) -> Self {
        Scenario {
            client_name: submission.client_name,
            config: submission.config,
            items: submission.selected_items,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, selected_id: &str) -> Option<&SelectedItem> {
        self.items.iter().find(|s| s.id == selected_id)
    }

    /// The selected item for a catalog service, if present.
    pub fn find_service(&self, service_id: &str) -> Option<&SelectedItem> {
        self.items.iter().find(|s| s.service_id() == service_id)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Adds a service.
    ///
    /// Services with quantity source fields take their quantity from the
    /// config and ignore `quantity`.
    pub fn add_service(&mut self, item: &PricingItem, quantity: i64) -> CoreResult<&SelectedItem> {
        self.insert(item, quantity, false)
    }

    /// Removes a selected item and returns it.
    pub fn remove_service(&mut self, selected_id: &str) -> CoreResult<SelectedItem> {
        let index = self.index_of(selected_id)?;
        Ok(self.items.remove(index))
    }

    /// Sets a hand-entered quantity and re-prices tiered services.
    pub fn set_quantity(&mut self, selected_id: &str, quantity: i64) -> CoreResult<()> {
        check_quantity(quantity)?;
        let selected = self.get_mut(selected_id)?;
        set_quantity_and_reprice(selected, quantity);
        Ok(())
    }

    /// Overrides the unit price snapshot.
    ///
    /// Tiered services are re-priced on the next quantity change.
    pub fn set_unit_price(&mut self, selected_id: &str, unit_price: Money) -> CoreResult<()> {
        validate_price("unit price", unit_price)?;
        self.get_mut(selected_id)?.unit_price = unit_price;
        Ok(())
    }

    pub fn set_discount(
        &mut self,
        selected_id: &str,
        discount: Discount,
        application: DiscountApplication,
    ) -> CoreResult<()> {
        validate_discount(&discount)?;
        let selected = self.get_mut(selected_id)?;
        selected.discount = discount;
        selected.discount_application = application;
        Ok(())
    }

    pub fn set_free(&mut self, selected_id: &str, is_free: bool) -> CoreResult<()> {
        self.get_mut(selected_id)?.is_free = is_free;
        Ok(())
    }

    /// Replaces the client config and re-runs the auto rules.
    ///
    /// ## Steps
    /// 1. Recompute auto quantities of selected items (re-pricing tiers)
    /// 2. Drop auto-added items whose rules no longer fire
    /// 3. Add active catalog services whose rules now fire
    ///
    /// On error the scenario is left as it was.
    pub fn apply_config(
        &mut self,
        config: ClientConfig,
        catalog: &[PricingItem],
    ) -> CoreResult<ConfigChange> {
        let mut staged = self.clone();
        let change = staged.reconcile(config, catalog)?;
        *self = staged;
        Ok(change)
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Per-line subtotal, discount and total.
    pub fn line_totals(&self) -> Vec<(&SelectedItem, LineBreakdown)> {
        self.items.iter().map(|s| (s, line_breakdown(s))).collect()
    }

    pub fn summary(&self, categories: &[Category]) -> ScenarioSummary {
        self.summary_with(categories, &BillingClassifier::default())
    }

    pub fn summary_with(
        &self,
        categories: &[Category],
        classifier: &BillingClassifier,
    ) -> ScenarioSummary {
        aggregate_with(&self.items, categories, classifier)
    }

    /// Discount settings of every line that has one or is free.
    pub fn discounts(&self) -> Vec<DiscountEntry> {
        self.items
            .iter()
            .filter(|s| s.is_free || !s.discount.is_none())
            .map(|s| DiscountEntry {
                selected_item_id: s.id.clone(),
                service_id: s.item.id.clone(),
                discount: s.discount,
                application: s.discount_application,
                is_free: s.is_free,
            })
            .collect()
    }

    /// Builds the blob stored on submit.
    pub fn submission(
        &self,
        categories: &[Category],
        classifier: &BillingClassifier,
    ) -> ScenarioSubmission {
        ScenarioSubmission {
            client_name: self.client_name.clone(),
            config: self.config.clone(),
            selected_items: self.items.clone(),
            summary: self.summary_with(categories, classifier),
            discounts: self.discounts(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn insert(&mut self, item: &PricingItem, quantity: i64, auto_added: bool) -> CoreResult<&SelectedItem> {
        if !item.is_active {
            return Err(CoreError::InactiveService(item.id.clone()));
        }
        if self.find_service(&item.id).is_some() {
            return Err(CoreError::DuplicateService(item.id.clone()));
        }
        if self.items.len() >= MAX_SCENARIO_ITEMS {
            return Err(CoreError::ScenarioTooLarge {
                max: MAX_SCENARIO_ITEMS,
            });
        }

        let quantity = match compute_auto_quantity(item, &self.config) {
            Some(auto) => auto.min(MAX_ITEM_QUANTITY),
            None => {
                check_quantity(quantity)?;
                quantity
            }
        };

        let mut selected = SelectedItem::new(item.clone(), quantity);
        selected.auto_added = auto_added;
        self.items.push(selected);

        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    fn reconcile(&mut self, config: ClientConfig, catalog: &[PricingItem]) -> CoreResult<ConfigChange> {
        self.config = config;
        let mut change = ConfigChange::default();

        for selected in &mut self.items {
            if let Some(quantity) = compute_auto_quantity(&selected.item, &self.config) {
                let quantity = quantity.min(MAX_ITEM_QUANTITY);
                if quantity != selected.quantity {
                    set_quantity_and_reprice(selected, quantity);
                    change.requantified.push(selected.id.clone());
                }
            }
        }

        let config = &self.config;
        let removed = &mut change.removed;
        self.items.retain(|selected| {
            let keep = !selected.auto_added || evaluate_auto_add(&selected.item, config);
            if !keep {
                removed.push(selected.item.id.clone());
            }
            keep
        });

        for candidate in auto_add_candidates(catalog, &self.config) {
            if self.find_service(&candidate.id).is_none() {
                self.insert(candidate, 1, true)?;
                change.added.push(candidate.id.clone());
            }
        }

        Ok(change)
    }

    fn index_of(&self, selected_id: &str) -> CoreResult<usize> {
        self.items
            .iter()
            .position(|s| s.id == selected_id)
            .ok_or_else(|| CoreError::SelectedItemNotFound(selected_id.to_string()))
    }

    fn get_mut(&mut self, selected_id: &str) -> CoreResult<&mut SelectedItem> {
        let index = self.index_of(selected_id)?;
        Ok(&mut self.items[index])
    }
}

fn check_quantity(quantity: i64) -> CoreResult<()> {
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    validate_quantity(quantity)?;
    Ok(())
}

fn set_quantity_and_reprice(selected: &mut SelectedItem, quantity: i64) {
    selected.quantity = quantity;
    if selected.item.pricing_type == PricingType::Tiered {
        selected.unit_price = effective_unit_price(&selected.item, quantity);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
