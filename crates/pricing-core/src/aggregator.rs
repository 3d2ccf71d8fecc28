//! # Scenario Aggregator
//!
//! Rolls line totals up into the numbers shown on a quote.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SelectedItem[] ──► classify ──┬── one-time ──► Σ line totals ─┐        │
//! │                                │                                │        │
//! │                                └── recurring ─► Σ line totals   │        │
//! │                                          (monthly)   │ × 12     │        │
//! │                                                      ▼          ▼        │
//! │                                            yearly_total + one_time_total │
//! │                                                      = total_project_cost│
//! │                                                                         │
//! │  original_price = Σ quantity × unit_price (no discounts, no free flag)  │
//! │  total_savings  = original_price − total_project_cost                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `original_price` counts every line once while `total_project_cost` counts
//! recurring lines twelve times, so `total_savings` goes negative for any
//! scenario with recurring services. That is the observed behavior of the
//! quote screens and is kept as is.

use std::collections::HashSet;

use crate::calculator::{calculate_line_total, undiscounted_total};
use crate::money::Money;
use crate::types::{Category, Savings, ScenarioSummary, SelectedItem};
use crate::{MONTHS_PER_YEAR, SETUP_CATEGORY_ID};

/// Units billed once rather than monthly.
const ONE_TIME_UNITS: &[&str] = &["onetime", "one_time", "per_setup", "per_installation", "setup"];

/// True when `unit` is billed once.
pub fn is_one_time_unit(unit: &str) -> bool {
    let unit = unit.trim().to_lowercase();
    ONE_TIME_UNITS.contains(&unit.as_str())
}

// =============================================================================
// Billing Classifier
// =============================================================================

/// Decides whether a selected item is one-time or recurring.
///
/// An item is one-time when:
/// - its category id is one of `setup_categories`, or
/// - its category (looked up by id) is named like one of them, or
/// - its unit is a built-in one-time unit or one of `extra_one_time_units`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingClassifier {
    setup_categories: HashSet<String>,
    extra_one_time_units: HashSet<String>,
}

impl BillingClassifier {
    pub fn new<C, U>(setup_categories: C, extra_one_time_units: U) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        U: IntoIterator,
        U::Item: AsRef<str>,
    {
        BillingClassifier {
            setup_categories: setup_categories
                .into_iter()
                .map(|c| c.as_ref().trim().to_lowercase())
                .collect(),
            extra_one_time_units: extra_one_time_units
                .into_iter()
                .map(|u| u.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn is_one_time_unit(&self, unit: &str) -> bool {
        is_one_time_unit(unit) || self.extra_one_time_units.contains(&unit.trim().to_lowercase())
    }

    fn is_setup_category(&self, category_id: &str, categories: &[Category]) -> bool {
        if self.setup_categories.contains(&category_id.to_lowercase()) {
            return true;
        }
        categories
            .iter()
            .find(|c| c.id == category_id)
            .is_some_and(|c| self.setup_categories.contains(&c.name.trim().to_lowercase()))
    }

    /// Classifies one item against the known categories.
    pub fn is_one_time(&self, selected: &SelectedItem, categories: &[Category]) -> bool {
        self.is_setup_category(&selected.item.category_id, categories)
            || self.is_one_time_unit(&selected.item.unit)
    }
}

impl Default for BillingClassifier {
    fn default() -> Self {
        BillingClassifier::new([SETUP_CATEGORY_ID], std::iter::empty::<&str>())
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Summarizes a scenario with the default classifier.
pub fn aggregate(items: &[SelectedItem], categories: &[Category]) -> ScenarioSummary {
    aggregate_with(items, categories, &BillingClassifier::default())
}

/// Summarizes a scenario.
pub fn aggregate_with(
    items: &[SelectedItem],
    categories: &[Category],
    classifier: &BillingClassifier,
) -> ScenarioSummary {
    let mut one_time_total = Money::zero();
    let mut monthly_total = Money::zero();
    let mut original_price = Money::zero();
    let mut discount_savings = Money::zero();
    let mut free_savings = Money::zero();

    for selected in items {
        let line_total = calculate_line_total(selected);
        let undiscounted = undiscounted_total(selected);

        if classifier.is_one_time(selected, categories) {
            one_time_total += line_total;
        } else {
            monthly_total += line_total;
        }

        original_price += undiscounted;
        if selected.is_free {
            free_savings += undiscounted;
        } else {
            discount_savings += undiscounted - line_total;
        }
    }

    let yearly_total = monthly_total * MONTHS_PER_YEAR;
    let total_project_cost = one_time_total + yearly_total;
    let total_savings = original_price - total_project_cost;

    ScenarioSummary {
        one_time_total,
        monthly_total,
        yearly_total,
        total_project_cost,
        savings: Savings {
            total_savings,
            discount_savings,
            free_savings,
            original_price,
            savings_rate: total_savings.ratio_percent(original_price),
        },
    }
}
