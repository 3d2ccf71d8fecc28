//! # Domain Types
//!
//! Catalog, configuration and scenario types shared by the engine, the
//! repository layer and (through ts-rs) the web front end.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (admin-managed)            Quote (guest-managed)               │
//! │  ───────────────────────            ─────────────────────               │
//! │  Category                           ClientConfig  field id → value      │
//! │  Tag                                SelectedItem  snapshot of a service │
//! │  ConfigField                          ├── quantity / unit_price         │
//! │  PricingItem (service)                ├── Discount (pct | fixed)        │
//! │    ├── PricingTier[]                  └── DiscountApplication           │
//! │    ├── quantity_source_fields       ScenarioSummary (derived)           │
//! │    └── AutoAddRule[]                ScenarioSubmission (stored blob)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! JSON uses camelCase field names, matching what the web client sends.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::tier::effective_unit_price;

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage in basis points (1 bps = 0.01%).
///
/// 1000 bps = 10%, 10000 bps = 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a percentage (form input convenience).
    pub fn from_percentage(pct: f64) -> Self {
        DiscountRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// 0%.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// 100%.
    #[inline]
    pub const fn full() -> Self {
        DiscountRate(10_000)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// A discount on a selected item.
///
/// Serialized as `{ "discountType": "percentage", "discount": 1000 }` or
/// `{ "discountType": "fixed", "discount": 500 }`.
///
/// A `Fixed` discount is an amount **per unit**, under both application
/// modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "discountType", content = "discount", rename_all = "camelCase")]
pub enum Discount {
    /// Percentage off, in basis points.
    Percentage(DiscountRate),
    /// Amount off each unit.
    Fixed(Money),
}

impl Discount {
    /// No discount.
    pub const fn none() -> Self {
        Discount::Percentage(DiscountRate::zero())
    }

    /// Returns true when the discount cannot change a price.
    pub fn is_none(&self) -> bool {
        match self {
            Discount::Percentage(rate) => rate.is_zero(),
            Discount::Fixed(amount) => amount.is_zero(),
        }
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::none()
    }
}

/// Where a discount is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountApplication {
    /// Discount the unit price, then multiply by quantity.
    Unit,
    /// Discount the subtotal (`quantity × unit_price`).
    #[default]
    Total,
}

// =============================================================================
// Catalog
// =============================================================================

/// How a service is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PricingType {
    /// Single price regardless of quantity.
    #[default]
    Fixed,
    /// Unit price depends on the quantity tier.
    Tiered,
}

impl std::fmt::Display for PricingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingType::Fixed => write!(f, "fixed"),
            PricingType::Tiered => write!(f, "tiered"),
        }
    }
}

/// A quantity range with its unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub id: String,
    pub name: String,
    /// Inclusive lower bound.
    pub min_quantity: i64,
    /// Inclusive upper bound; `None` means unbounded.
    pub max_quantity: Option<i64>,
    pub unit_price: Money,
    #[serde(default)]
    pub description: Option<String>,
    /// Optional link to the config field the tier is described against.
    #[serde(default)]
    pub config_reference: Option<String>,
}

impl PricingTier {
    pub fn new(
        id: impl Into<String>,
        min_quantity: i64,
        max_quantity: Option<i64>,
        unit_price: Money,
    ) -> Self {
        let id = id.into();
        PricingTier {
            name: id.clone(),
            id,
            min_quantity,
            max_quantity,
            unit_price,
            description: None,
            config_reference: None,
        }
    }

    /// Returns true when `quantity` falls inside this tier.
    pub fn contains(&self, quantity: i64) -> bool {
        quantity >= self.min_quantity && self.max_quantity.map_or(true, |max| quantity <= max)
    }
}

/// Condition kind of an auto-add rule.
///
/// Only boolean equality is implemented; any other condition name
/// deserializes to `Unsupported` and never fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerCondition {
    #[default]
    Boolean,
    #[serde(other)]
    Unsupported,
}

/// Adds the owning service to a scenario when a config field matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AutoAddRule {
    pub config_field_id: String,
    #[serde(default)]
    #[ts(type = "string")]
    pub trigger_condition: TriggerCondition,
    pub trigger_value: ConfigValue,
}

impl AutoAddRule {
    /// A boolean trigger: fires when `field` is set to `value`.
    pub fn when_flag(field: impl Into<String>, value: bool) -> Self {
        AutoAddRule {
            config_field_id: field.into(),
            trigger_condition: TriggerCondition::Boolean,
            trigger_value: ConfigValue::Bool(value),
        }
    }
}

/// A service in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: String,
    /// Billing unit, e.g. `per_month`, `per_card`, `onetime`.
    pub unit: String,
    pub default_price: Money,
    #[serde(default)]
    pub pricing_type: PricingType,
    #[serde(default)]
    pub tiers: Vec<PricingTier>,
    /// Config fields whose numeric values sum to the quantity.
    #[serde(default)]
    pub quantity_source_fields: Vec<String>,
    #[serde(default = "default_multiplier")]
    pub quantity_multiplier: f64,
    #[serde(default, alias = "autoAddServices")]
    pub auto_add_rules: Vec<AutoAddRule>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true", alias = "is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl PricingItem {
    /// Creates an active fixed-price service.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category_id: impl Into<String>,
        unit: impl Into<String>,
        default_price: Money,
    ) -> Self {
        PricingItem {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category_id: category_id.into(),
            unit: unit.into(),
            default_price,
            pricing_type: PricingType::Fixed,
            tiers: Vec::new(),
            quantity_source_fields: Vec::new(),
            quantity_multiplier: default_multiplier(),
            auto_add_rules: Vec::new(),
            tags: Vec::new(),
            is_active: true,
            sort_order: 0,
            updated_at: None,
        }
    }

    /// Switches the service to tiered pricing with the given tiers.
    pub fn with_tiers(mut self, tiers: Vec<PricingTier>) -> Self {
        self.pricing_type = PricingType::Tiered;
        self.tiers = tiers;
        self
    }

    /// Derives the quantity from the given config fields.
    pub fn with_quantity_sources<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quantity_source_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_auto_add(mut self, rule: AutoAddRule) -> Self {
        self.auto_add_rules.push(rule);
        self
    }

    pub fn has_auto_quantity(&self) -> bool {
        !self.quantity_source_fields.is_empty()
    }
}

/// A service category (e.g. "setup", "licenses", "support").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Category {
            id: id.into(),
            name: name.into(),
            description: None,
            sort_order: 0,
            is_active: true,
        }
    }
}

/// A free-form label attached to services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Input type of a configuration field on the quote form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Number,
    Boolean,
    Text,
    Select,
}

/// A question on the client configuration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfigField {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub field_type: FieldType,
    /// Choices for `Select` fields.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub default_value: Option<ConfigValue>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ConfigField {
    /// Builds a config pre-filled with every field's default value.
    pub fn default_values(fields: &[ConfigField]) -> ClientConfig {
        fields
            .iter()
            .filter(|f| f.is_active)
            .filter_map(|f| f.default_value.clone().map(|v| (f.id.clone(), v)))
            .collect()
    }
}

/// A value entered on the configuration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ConfigValue {
    /// Numeric reading of the value.
    ///
    /// Numbers are themselves, numeric text parses, anything else is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) if n.is_finite() => Some(*n),
            ConfigValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Number(value as f64)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

/// Client configuration: config field id → entered value.
///
/// Ordered so serialized blobs are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientConfig(BTreeMap<String, ConfigValue>);

impl ClientConfig {
    pub fn new() -> Self {
        ClientConfig(BTreeMap::new())
    }

    pub fn get(&self, field_id: &str) -> Option<&ConfigValue> {
        self.0.get(field_id)
    }

    pub fn set(&mut self, field_id: impl Into<String>, value: impl Into<ConfigValue>) {
        self.0.insert(field_id.into(), value.into());
    }

    /// Builder form of [`ClientConfig::set`].
    pub fn with(mut self, field_id: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.set(field_id, value);
        self
    }

    pub fn remove(&mut self, field_id: &str) -> Option<ConfigValue> {
        self.0.remove(field_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, ConfigValue)> for ClientConfig {
    fn from_iter<T: IntoIterator<Item = (String, ConfigValue)>>(iter: T) -> Self {
        ClientConfig(iter.into_iter().collect())
    }
}

// =============================================================================
// Selected Item
// =============================================================================

/// A service placed in a scenario.
///
/// `unit_price` is a snapshot: it starts at the tier/default price and may
/// be overridden manually. For tiered services the scenario refreshes it on
/// every quantity change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    pub id: String,
    pub item: PricingItem,
    pub quantity: i64,
    pub unit_price: Money,
    #[serde(default)]
    pub discount: Discount,
    #[serde(default)]
    pub discount_application: DiscountApplication,
    #[serde(default)]
    pub is_free: bool,
    /// Added by an auto-add rule rather than by hand.
    #[serde(default)]
    pub auto_added: bool,
}

impl SelectedItem {
    /// Selects `item` at `quantity`, pricing it at the current tier.
    pub fn new(item: PricingItem, quantity: i64) -> Self {
        let unit_price = effective_unit_price(&item, quantity);
        SelectedItem {
            id: Uuid::new_v4().to_string(),
            item,
            quantity,
            unit_price,
            discount: Discount::none(),
            discount_application: DiscountApplication::Total,
            is_free: false,
            auto_added: false,
        }
    }

    pub fn with_discount(mut self, discount: Discount, application: DiscountApplication) -> Self {
        self.discount = discount;
        self.discount_application = application;
        self
    }

    pub fn free(mut self) -> Self {
        self.is_free = true;
        self
    }

    /// Id of the underlying catalog service.
    pub fn service_id(&self) -> &str {
        &self.item.id
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Savings against the undiscounted baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Savings {
    /// `original_price - total_project_cost`; may be negative.
    pub total_savings: Money,
    /// Amount removed by discounts on non-free items.
    pub discount_savings: Money,
    /// Undiscounted value of items marked free.
    pub free_savings: Money,
    /// `Σ quantity × unit_price` over all items.
    pub original_price: Money,
    /// `total_savings / original_price × 100`, or 0 without a baseline.
    pub savings_rate: f64,
}

/// Cost projection of a scenario. Derived on demand, never stored alone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub one_time_total: Money,
    pub monthly_total: Money,
    pub yearly_total: Money,
    pub total_project_cost: Money,
    pub savings: Savings,
}

// =============================================================================
// Submission
// =============================================================================

/// Discount settings of one line, as listed in a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountEntry {
    pub selected_item_id: String,
    pub service_id: String,
    pub discount: Discount,
    pub application: DiscountApplication,
    pub is_free: bool,
}

/// The blob persisted when a guest submits a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSubmission {
    #[serde(default)]
    pub client_name: Option<String>,
    pub config: ClientConfig,
    pub selected_items: Vec<SelectedItem>,
    pub summary: ScenarioSummary,
    pub discounts: Vec<DiscountEntry>,
}

// =============================================================================
// Unit Tests
// =============================================================================
