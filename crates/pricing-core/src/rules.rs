//! # Auto-Quantity / Auto-Add Rules
//!
//! Derives quantities and selections from the client configuration form.
//!
//! ## Auto-Quantity
//! ```text
//!   item.quantity_source_fields = ["cards", "spare_cards"]
//!   config = { cards: 40, spare_cards: "2", region: "eu" }
//!
//!   (40 + 2) × quantity_multiplier(1) = 42
//! ```
//! Missing and non-numeric values count as 0 so a half-filled form still
//! produces a quantity. A service with no source fields has no auto
//! quantity, and its hand-entered quantity stands.
//!
//! ## Auto-Add
//! Each service may carry rules `{ config_field_id, trigger_condition,
//! trigger_value }`. The service belongs in the scenario when ANY rule fires.
//! Only boolean equality is implemented.
//!
//! Everything here is a pure function; the scenario editor applies the
//! answers.

use crate::types::{AutoAddRule, ClientConfig, PricingItem, TriggerCondition};

/// Quantity derived from the config, or `None` for manually-entered items.
///
/// The sum is multiplied by `quantity_multiplier`, rounded to the nearest
/// whole unit and clamped at zero.
pub fn compute_auto_quantity(item: &PricingItem, config: &ClientConfig) -> Option<i64> {
    if item.quantity_source_fields.is_empty() {
        return None;
    }

    let sum: f64 = item
        .quantity_source_fields
        .iter()
        .map(|field| config.get(field).and_then(|v| v.as_number()).unwrap_or(0.0))
        .sum();

    let quantity = (sum * item.quantity_multiplier).round();
    if quantity.is_finite() && quantity > 0.0 {
        Some(quantity as i64)
    } else {
        Some(0)
    }
}

/// Evaluates a single auto-add rule.
pub fn evaluate_rule(rule: &AutoAddRule, config: &ClientConfig) -> bool {
    match rule.trigger_condition {
        TriggerCondition::Boolean => config
            .get(&rule.config_field_id)
            .is_some_and(|value| *value == rule.trigger_value),
        TriggerCondition::Unsupported => false,
    }
}

/// True when any of the item's auto-add rules fires.
pub fn evaluate_auto_add(item: &PricingItem, config: &ClientConfig) -> bool {
    item.auto_add_rules
        .iter()
        .any(|rule| evaluate_rule(rule, config))
}

/// Active catalog services that the config pulls into a scenario.
pub fn auto_add_candidates<'a>(
    catalog: &'a [PricingItem],
    config: &ClientConfig,
) -> Vec<&'a PricingItem> {
    catalog
        .iter()
        .filter(|item| item.is_active && evaluate_auto_add(item, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::ConfigValue;

    fn cards_item() -> PricingItem {
        PricingItem::new("cards", "Card licenses", "licenses", "per_card", Money::from_cents(300))
            .with_quantity_sources(["cards"])
    }

    #[test]
    fn test_auto_quantity_reads_source_field() {
        let config = ClientConfig::new().with("cards", 42i64);
        assert_eq!(compute_auto_quantity(&cards_item(), &config), Some(42));
    }

    #[test]
    fn test_auto_quantity_missing_field_is_zero() {
        assert_eq!(compute_auto_quantity(&cards_item(), &ClientConfig::new()), Some(0));
    }

    #[test]
    fn test_auto_quantity_without_sources_is_none() {
        let item = PricingItem::new("support", "Support", "support", "per_month", Money::from_cents(100));
        let config = ClientConfig::new().with("cards", 42i64);
        assert_eq!(compute_auto_quantity(&item, &config), None);
    }

    #[test]
    fn test_auto_quantity_sums_fields_and_ignores_non_numeric() {
        let item = cards_item().with_quantity_sources(["cards", "spare_cards", "sso", "region"]);
        let config = ClientConfig::new()
            .with("cards", 40i64)
            .with("spare_cards", "2")
            .with("sso", true)
            .with("region", "eu");
        assert_eq!(compute_auto_quantity(&item, &config), Some(42));
    }

    #[test]
    fn test_auto_quantity_applies_multiplier() {
        let mut item = cards_item();
        item.quantity_multiplier = 2.5;
        let config = ClientConfig::new().with("cards", 3i64);
        // 7.5 rounds to 8
        assert_eq!(compute_auto_quantity(&item, &config), Some(8));
    }

    #[test]
    fn test_auto_quantity_clamps_negative() {
        let config = ClientConfig::new().with("cards", -5i64);
        assert_eq!(compute_auto_quantity(&cards_item(), &config), Some(0));
    }

    #[test]
    fn test_boolean_rule_matches_strictly() {
        let rule = AutoAddRule::when_flag("needs_sso", true);

        assert!(evaluate_rule(&rule, &ClientConfig::new().with("needs_sso", true)));
        assert!(!evaluate_rule(&rule, &ClientConfig::new().with("needs_sso", false)));
        assert!(!evaluate_rule(&rule, &ClientConfig::new().with("needs_sso", "true")));
        assert!(!evaluate_rule(&rule, &ClientConfig::new()));
    }

    #[test]
    fn test_rule_can_trigger_on_false() {
        let rule = AutoAddRule::when_flag("has_own_hardware", false);
        assert!(evaluate_rule(&rule, &ClientConfig::new().with("has_own_hardware", false)));
    }

    #[test]
    fn test_unsupported_condition_never_fires() {
        let rule = AutoAddRule {
            config_field_id: "cards".into(),
            trigger_condition: TriggerCondition::Unsupported,
            trigger_value: ConfigValue::Number(10.0),
        };
        assert!(!evaluate_rule(&rule, &ClientConfig::new().with("cards", 10i64)));
    }

    #[test]
    fn test_auto_add_is_or_across_rules() {
        let item = PricingItem::new("sso", "SSO setup", "setup", "onetime", Money::from_cents(50000))
            .with_auto_add(AutoAddRule::when_flag("needs_sso", true))
            .with_auto_add(AutoAddRule::when_flag("needs_ldap", true));

        let none = ClientConfig::new().with("needs_sso", false).with("needs_ldap", false);
        let one = ClientConfig::new().with("needs_sso", false).with("needs_ldap", true);
        assert!(!evaluate_auto_add(&item, &none));
        assert!(evaluate_auto_add(&item, &one));
    }

    #[test]
    fn test_item_without_rules_is_never_auto_added() {
        let item = PricingItem::new("plain", "Plain", "support", "per_month", Money::from_cents(100));
        assert!(!evaluate_auto_add(&item, &ClientConfig::new().with("anything", true)));
    }

    #[test]
    fn test_auto_add_candidates_skip_inactive() {
        let mut retired = PricingItem::new("old", "Old", "setup", "onetime", Money::from_cents(1))
            .with_auto_add(AutoAddRule::when_flag("needs_sso", true));
        retired.is_active = false;
        let live = PricingItem::new("sso", "SSO", "setup", "onetime", Money::from_cents(1))
            .with_auto_add(AutoAddRule::when_flag("needs_sso", true));
        let catalog = vec![retired, live];

        let candidates = auto_add_candidates(&catalog, &ClientConfig::new().with("needs_sso", true));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "sso");
    }
}
