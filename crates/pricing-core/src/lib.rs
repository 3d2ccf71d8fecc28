//! # pricing-core: Pure Pricing Logic for the Pricing Simulator
//!
//! This crate holds the calculation engine behind client quotes. Every
//! function is pure: no database, no network, no clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Pricing Simulator Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client (quote editor)                    │   │
//! │  │   Config form ──► Service picker ──► Discounts ──► Summary     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pricing-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌────────────┐ ┌──────────┐ ┌──────────────┐   │   │
//! │  │   │   tier   │ │ calculator │ │  rules   │ │  aggregator  │   │   │
//! │  │   │ resolver │ │ line total │ │ auto qty │ │  one-time /  │   │   │
//! │  │   │          │ │ discounts  │ │ auto add │ │  recurring   │   │   │
//! │  │   └──────────┘ └────────────┘ └──────────┘ └──────────────┘   │   │
//! │  │                 scenario (editor state)                         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pricing-db (Persistence Layer)                  │   │
//! │  │       SQLite catalog, stored scenarios, config, quote service   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog and scenario types (PricingItem, SelectedItem, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`tier`] - Quantity tier resolution
//! - [`calculator`] - Line totals with discounts and the free flag
//! - [`rules`] - Auto-quantity and auto-add evaluation
//! - [`aggregator`] - Scenario summary and savings
//! - [`scenario`] - Editor state tying the above together
//! - [`validation`] - Catalog and edit validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pricing_core::money::Money;
//! use pricing_core::types::{PricingItem, PricingTier, SelectedItem};
//! use pricing_core::calculator::calculate_line_total;
//!
//! let cards = PricingItem::new("cards", "Card licenses", "licenses", "per_card", Money::from_cents(500))
//!     .with_tiers(vec![
//!         PricingTier::new("small", 1, Some(99), Money::from_cents(400)),
//!         PricingTier::new("large", 100, None, Money::from_cents(300)),
//!     ]);
//!
//! // 150 cards land in the "large" tier
//! let selected = SelectedItem::new(cards, 150);
//! assert_eq!(selected.unit_price.cents(), 300);
//! assert_eq!(calculate_line_total(&selected), Money::from_cents(45000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregator;
pub mod calculator;
pub mod error;
pub mod money;
pub mod rules;
pub mod scenario;
pub mod tier;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregator::{aggregate, aggregate_with, BillingClassifier};
pub use calculator::calculate_line_total;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use scenario::{ConfigChange, Scenario};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum services in a single scenario.
pub const MAX_SCENARIO_ITEMS: usize = 200;

/// Maximum quantity of a single selected service.
///
/// Card and user counts run into the hundreds of thousands for large
/// clients, so this is far above anything a form should produce.
pub const MAX_ITEM_QUANTITY: i64 = 1_000_000;

/// Highest unit price, fixed discount or tier price an admin can enter
/// ($10,000,000.00).
///
/// A full scenario at this price and [`MAX_ITEM_QUANTITY`] still fits in
/// i64 cents after the yearly multiplication.
pub const MAX_UNIT_PRICE_CENTS: i64 = 1_000_000_000;

/// Recurring totals are monthly; the project cost covers one year.
pub const MONTHS_PER_YEAR: i64 = 12;

/// Category id whose services are billed once.
pub const SETUP_CATEGORY_ID: &str = "setup";
