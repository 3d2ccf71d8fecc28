//! # Line-Item Calculator
//!
//! Computes what one selected service costs.
//!
//! ## Discount Matrix
//! ```text
//! ┌──────────────┬───────────────────────────────┬───────────────────────────────┐
//! │              │ application = unit            │ application = total (default) │
//! ├──────────────┼───────────────────────────────┼───────────────────────────────┤
//! │ percentage   │ unit' = unit − unit×pct       │ off = subtotal × pct          │
//! │              │ total = max(0,unit') × qty    │ total = max(0, subtotal − off)│
//! ├──────────────┼───────────────────────────────┼───────────────────────────────┤
//! │ fixed        │ unit' = max(0, unit − amount) │ off = amount × qty            │
//! │              │ total = unit' × qty           │ total = max(0, subtotal − off)│
//! └──────────────┴───────────────────────────────┴───────────────────────────────┘
//!   free items cost 0, whatever the discount.
//! ```
//!
//! A fixed discount is always per unit: $5 off with quantity 3 removes $15
//! under `total` as well as under `unit`.
//!
//! Inputs are trusted. Quantities and prices are validated by the scenario
//! editor and the admin forms, not here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Discount, DiscountApplication, SelectedItem};

/// Subtotal, discount and total of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineBreakdown {
    /// `quantity × unit_price`.
    pub subtotal: Money,
    /// `subtotal − total`.
    pub discount: Money,
    pub total: Money,
}

/// Total of one selected item. Never negative.
pub fn calculate_line_total(selected: &SelectedItem) -> Money {
    if selected.is_free {
        return Money::zero();
    }

    let quantity = selected.quantity;
    let unit_price = selected.unit_price;

    match selected.discount_application {
        DiscountApplication::Unit => {
            let effective_unit = match selected.discount {
                Discount::Percentage(rate) => unit_price.apply_percentage_discount(rate),
                Discount::Fixed(amount) => unit_price - amount,
            }
            .non_negative();
            effective_unit.multiply_quantity(quantity)
        }
        DiscountApplication::Total => {
            let subtotal = unit_price.multiply_quantity(quantity);
            let discount_amount = match selected.discount {
                Discount::Percentage(rate) => subtotal.percentage_of(rate),
                Discount::Fixed(amount) => amount.multiply_quantity(quantity),
            };
            (subtotal - discount_amount).non_negative()
        }
    }
}

/// `quantity × unit_price`, ignoring discount and free flag.
pub fn undiscounted_total(selected: &SelectedItem) -> Money {
    selected.unit_price.multiply_quantity(selected.quantity)
}

/// Splits a line into subtotal, discount and total.
pub fn line_breakdown(selected: &SelectedItem) -> LineBreakdown {
    let subtotal = undiscounted_total(selected);
    let total = calculate_line_total(selected);
    LineBreakdown {
        subtotal,
        discount: subtotal - total,
        total,
    }
}
