//! # Error Types
//!
//! Domain-specific error types for pricing-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pricing-core errors (this file)                                       │
//! │  ├── CoreError        - Scenario editing failures                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pricing-db errors (separate crate)                                    │
//! │  └── DbError          - Repository failures                            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → web client              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculation functions themselves never fail: a missing tier is
//! `None`, a missing config value is 0, and the savings rate is guarded
//! against a zero baseline. Errors only come from editing and validation.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Scenario editing errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No service with this id in the catalog or scenario.
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// No selected item with this id in the scenario.
    #[error("Selected item not found: {0}")]
    SelectedItemNotFound(String),

    /// The service is already part of the scenario.
    #[error("Service {0} is already in the scenario")]
    DuplicateService(String),

    /// The service was soft-deleted and cannot be quoted.
    #[error("Service {0} is inactive")]
    InactiveService(String),

    /// Scenario has exceeded maximum allowed items.
    #[error("Scenario cannot have more than {max} items")]
    ScenarioTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Tier lower bound above its upper bound.
    #[error("Tier {tier} has min quantity {min} above max quantity {max}")]
    InvertedTier { tier: String, min: i64, max: i64 },

    /// Two tiers cover the same quantity.
    #[error("Tiers {first} and {second} overlap")]
    OverlappingTiers { first: String, second: String },

    /// An unbounded tier is followed by another tier.
    #[error("Only the last tier may be unbounded, but {tier} is not last")]
    UnboundedTierNotLast { tier: String },

    /// A tiered service without tiers.
    #[error("Tiered service {service} has no tiers")]
    MissingTiers { service: String },

    /// Duplicate value.
    #[error("{field} '{value}' is listed more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
