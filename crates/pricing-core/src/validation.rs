//! # Validation Module
//!
//! Business-rule checks for admin catalog writes and scenario edits.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Web forms          basic format checks, instant feedback     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE        tier layout, discount bounds, quantities   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database           NOT NULL, UNIQUE, FOREIGN KEY              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculation engine does not call these; it trusts its input. The
//! scenario editor and the repositories do.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::money::Money;
use crate::tier::sorted_tiers;
use crate::types::{Discount, PricingItem, PricingTier, PricingType};
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog identifier (service, category, tag, config field).
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use pricing_core::validation::validate_id;
///
/// assert!(validate_id("id", "card_licenses").is_ok());
/// assert!(validate_id("id", "").is_err());
/// assert!(validate_id("id", "has space").is_err());
/// ```
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    if !id.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (1-200 characters after trimming).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity (0 ..= MAX_ITEM_QUANTITY).
///
/// Zero is allowed: an auto-quantity service on an empty form sits in the
/// scenario at quantity 0.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price (0 ..= MAX_UNIT_PRICE_CENTS; zero is a free service).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if price.cents() > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a discount.
///
/// ## Rules
/// - Percentage: 0% to 100% (0..=10000 bps)
/// - Fixed: not negative
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    match discount {
        Discount::Percentage(rate) if rate.bps() > 10_000 => Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 10_000,
        }),
        Discount::Fixed(amount) => validate_price("discount", *amount),
        Discount::Percentage(_) => Ok(()),
    }
}

// =============================================================================
// Tier Validators
// =============================================================================

/// Validates a tier list.
///
/// ## Rules (after sorting by `min_quantity`)
/// - `min_quantity >= 0`, `unit_price >= 0`
/// - `min_quantity <= max_quantity` when bounded
/// - No two tiers cover the same quantity
/// - Only the last tier may be unbounded
/// - Tier ids are unique
///
/// Gaps between tiers are allowed; quantities in a gap price at the
/// service default.
pub fn validate_tiers(tiers: &[PricingTier]) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for tier in tiers {
        validate_name("tier name", &tier.name)?;
        if !seen.insert(tier.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "tier id".to_string(),
                value: tier.id.clone(),
            });
        }
        if tier.min_quantity < 0 {
            return Err(ValidationError::Negative {
                field: format!("tier {} min quantity", tier.id),
            });
        }
        validate_price("tier unit price", tier.unit_price)?;
        if let Some(max) = tier.max_quantity {
            if max < tier.min_quantity {
                return Err(ValidationError::InvertedTier {
                    tier: tier.id.clone(),
                    min: tier.min_quantity,
                    max,
                });
            }
        }
    }

    let sorted = sorted_tiers(tiers);
    for pair in sorted.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        match current.max_quantity {
            None => {
                return Err(ValidationError::UnboundedTierNotLast {
                    tier: current.id.clone(),
                })
            }
            Some(max) if next.min_quantity <= max => {
                return Err(ValidationError::OverlappingTiers {
                    first: current.id.clone(),
                    second: next.id.clone(),
                })
            }
            Some(_) => {}
        }
    }

    Ok(())
}

// =============================================================================
// Service Validator
// =============================================================================

/// Validates a service before it is written to the catalog.
pub fn validate_service(item: &PricingItem) -> ValidationResult<()> {
    validate_id("id", &item.id)?;
    validate_name("name", &item.name)?;
    validate_id("category", &item.category_id)?;
    validate_name("unit", &item.unit)?;
    validate_price("default price", item.default_price)?;

    if item.pricing_type == PricingType::Tiered && item.tiers.is_empty() {
        return Err(ValidationError::MissingTiers {
            service: item.id.clone(),
        });
    }
    validate_tiers(&item.tiers)?;

    if !item.quantity_multiplier.is_finite() || item.quantity_multiplier < 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: "quantity multiplier".to_string(),
            reason: "must be a non-negative number".to_string(),
        });
    }

    for rule in &item.auto_add_rules {
        validate_id("auto-add field", &rule.config_field_id)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AutoAddRule, DiscountRate};

    fn tier(id: &str, min: i64, max: Option<i64>) -> PricingTier {
        PricingTier::new(id, min, max, Money::from_cents(100))
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("id", "card-licenses").is_ok());
        assert!(validate_id("id", "setup_1").is_ok());

        assert!(validate_id("id", "").is_err());
        assert!(validate_id("id", "   ").is_err());
        assert!(validate_id("id", "a/b").is_err());
        assert!(validate_id("id", &"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Card licenses").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_cents(MAX_UNIT_PRICE_CENTS)).is_ok());
        assert!(matches!(
            validate_price("price", Money::from_cents(MAX_UNIT_PRICE_CENTS + 1)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_price("price", Money::from_cents(-1)),
            Err(ValidationError::Negative { .. })
        ));

        let mut item = PricingItem::new("big", "Big", "support", "per_month", Money::zero());
        item.default_price = Money::from_cents(i64::MAX / 4);
        assert!(validate_service(&item).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(&Discount::Percentage(DiscountRate::full())).is_ok());
        assert!(validate_discount(&Discount::Percentage(DiscountRate::from_bps(10_001))).is_err());
        assert!(validate_discount(&Discount::Fixed(Money::from_cents(0))).is_ok());
        assert!(validate_discount(&Discount::Fixed(Money::from_cents(-1))).is_err());
    }

    #[test]
    fn test_valid_tiers_in_any_order() {
        let tiers = vec![tier("c", 500, None), tier("a", 1, Some(99)), tier("b", 100, Some(499))];
        assert!(validate_tiers(&tiers).is_ok());
        assert!(validate_tiers(&[]).is_ok());
    }

    #[test]
    fn test_tiers_with_gap_are_valid() {
        let tiers = vec![tier("a", 1, Some(10)), tier("b", 20, None)];
        assert!(validate_tiers(&tiers).is_ok());
    }

    #[test]
    fn test_overlapping_tiers_rejected() {
        let tiers = vec![tier("a", 1, Some(100)), tier("b", 100, None)];
        assert!(matches!(
            validate_tiers(&tiers),
            Err(ValidationError::OverlappingTiers { .. })
        ));
    }

    #[test]
    fn test_unbounded_tier_must_be_last() {
        let tiers = vec![tier("open", 1, None), tier("later", 50, Some(60))];
        assert!(matches!(
            validate_tiers(&tiers),
            Err(ValidationError::UnboundedTierNotLast { .. })
        ));
    }

    #[test]
    fn test_inverted_and_negative_tiers_rejected() {
        assert!(matches!(
            validate_tiers(&[tier("x", 10, Some(5))]),
            Err(ValidationError::InvertedTier { .. })
        ));
        assert!(matches!(
            validate_tiers(&[tier("x", -1, None)]),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            validate_tiers(&[tier("x", 1, Some(5)), tier("x", 6, None)]),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_validate_service() {
        let ok = PricingItem::new("cards", "Card licenses", "licenses", "per_card", Money::from_cents(300))
            .with_tiers(vec![tier("a", 1, Some(99)), tier("b", 100, None)])
            .with_auto_add(AutoAddRule::when_flag("needs_cards", true));
        assert!(validate_service(&ok).is_ok());

        let no_tiers = PricingItem::new("cards", "Card licenses", "licenses", "per_card", Money::from_cents(300))
            .with_tiers(vec![]);
        assert!(matches!(
            validate_service(&no_tiers),
            Err(ValidationError::MissingTiers { .. })
        ));

        let mut bad_multiplier = ok.clone();
        bad_multiplier.quantity_multiplier = -2.0;
        assert!(validate_service(&bad_multiplier).is_err());

        let negative = PricingItem::new("x", "X", "support", "per_month", Money::from_cents(-5));
        assert!(validate_service(&negative).is_err());
    }
}
