//! # Tier Resolver
//!
//! Finds the volume tier that applies to a quantity.
//!
//! ```text
//!   quantity: 150
//!
//!   ┌────────────┬────────────┬──────────────┐
//!   │  1 ..= 99  │ 100 ..= 499│  500 ..      │
//!   │   $4.00    │   $3.00 ◄──│   $2.50      │
//!   └────────────┴────────────┴──────────────┘
//! ```
//!
//! Tiers are searched in ascending `min_quantity` order whatever order they
//! are stored in. A quantity that falls below the first tier or into a gap
//! resolves to nothing, and callers fall back to the service's default price.
//! Overlapping tiers are tolerated: the first match after sorting wins.

use crate::money::Money;
use crate::types::{PricingItem, PricingTier};

/// Returns the tier containing `quantity`, if any.
///
/// The sort is stable, so tiers sharing a `min_quantity` keep their stored
/// order.
pub fn resolve_tier(tiers: &[PricingTier], quantity: i64) -> Option<&PricingTier> {
    sorted_tiers(tiers)
        .into_iter()
        .find(|tier| tier.contains(quantity))
}

/// Unit price of `item` at `quantity`: the matching tier's price, else the
/// default price.
pub fn effective_unit_price(item: &PricingItem, quantity: i64) -> Money {
    resolve_tier(&item.tiers, quantity)
        .map(|tier| tier.unit_price)
        .unwrap_or(item.default_price)
}

/// Tiers ordered by `min_quantity` (stable).
pub fn sorted_tiers(tiers: &[PricingTier]) -> Vec<&PricingTier> {
    let mut sorted: Vec<&PricingTier> = tiers.iter().collect();
    sorted.sort_by_key(|tier| tier.min_quantity);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(id: &str, min: i64, max: Option<i64>, cents: i64) -> PricingTier {
        PricingTier::new(id, min, max, Money::from_cents(cents))
    }

    fn volume_tiers() -> Vec<PricingTier> {
        // Stored out of order on purpose.
        vec![
            tier("large", 500, None, 250),
            tier("small", 1, Some(99), 400),
            tier("medium", 100, Some(499), 300),
        ]
    }

    #[test]
    fn test_empty_tiers_resolve_to_none() {
        for quantity in [0, 1, 50, 1_000_000] {
            assert!(resolve_tier(&[], quantity).is_none());
        }
    }

    #[test]
    fn test_contiguous_tiers_resolve_unique_tier() {
        let tiers = volume_tiers();
        for quantity in 1..=1200 {
            let resolved = resolve_tier(&tiers, quantity).expect("covered quantity");
            let containing: Vec<_> = tiers.iter().filter(|t| t.contains(quantity)).collect();
            assert_eq!(containing.len(), 1);
            assert_eq!(resolved.id, containing[0].id);
        }
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let tiers = volume_tiers();
        assert_eq!(resolve_tier(&tiers, 99).unwrap().id, "small");
        assert_eq!(resolve_tier(&tiers, 100).unwrap().id, "medium");
        assert_eq!(resolve_tier(&tiers, 499).unwrap().id, "medium");
        assert_eq!(resolve_tier(&tiers, 500).unwrap().id, "large");
    }

    #[test]
    fn test_below_first_tier_is_none() {
        let tiers = volume_tiers();
        assert!(resolve_tier(&tiers, 0).is_none());
    }

    #[test]
    fn test_gap_is_none() {
        let tiers = vec![tier("a", 1, Some(10), 100), tier("b", 20, None, 90)];
        assert!(resolve_tier(&tiers, 15).is_none());
    }

    #[test]
    fn test_overlap_picks_first_after_sort() {
        let tiers = vec![
            tier("wide", 10, None, 50),
            tier("narrow", 1, Some(100), 80),
        ];
        // Both contain 50; "narrow" sorts first by min_quantity.
        assert_eq!(resolve_tier(&tiers, 50).unwrap().id, "narrow");
    }

    #[test]
    fn test_equal_minimums_keep_stored_order() {
        let tiers = vec![
            tier("first", 1, Some(100), 80),
            tier("second", 1, Some(50), 70),
        ];
        assert_eq!(resolve_tier(&tiers, 20).unwrap().id, "first");
    }

    #[test]
    fn test_effective_unit_price_falls_back_to_default() {
        let item = PricingItem::new("cards", "Card licenses", "licenses", "per_card", Money::from_cents(500))
            .with_tiers(volume_tiers());

        assert_eq!(effective_unit_price(&item, 0).cents(), 500);
        assert_eq!(effective_unit_price(&item, 42).cents(), 400);
        assert_eq!(effective_unit_price(&item, 150).cents(), 300);
        assert_eq!(effective_unit_price(&item, 5000).cents(), 250);
    }

    #[test]
    fn test_effective_unit_price_without_tiers() {
        let item = PricingItem::new("support", "Support", "support", "per_month", Money::from_cents(5000));
        assert_eq!(effective_unit_price(&item, 7).cents(), 5000);
    }
}
