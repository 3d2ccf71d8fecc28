//! # Simulator Configuration
//!
//! Settings for the persistence layer and the billing classification.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PRICING_DB_PATH=/var/lib/pricing/pricing.db                        │
//! │     PRICING_DB_MAX_CONNECTIONS=8                                       │
//! │     PRICING_SETUP_CATEGORIES=setup,onboarding                          │
//! │     PRICING_ONE_TIME_UNITS=per_migration                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pricing-simulator/simulator.toml (Linux)                 │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "pricing.db"
//! max_connections = 5
//! min_connections = 1
//! connect_timeout_secs = 30
//! idle_timeout_secs = 600
//!
//! [pricing]
//! setup_categories = ["setup"]
//! one_time_units = []
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use pricing_core::{BillingClassifier, SETUP_CATEGORY_ID};

use crate::pool::DbConfig;

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read or write config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoConfigPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Database Settings
// =============================================================================

fn default_db_path() -> PathBuf {
    PathBuf::from("pricing.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file; relative paths resolve against the working directory.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Seconds before an idle connection is closed; 0 keeps it open.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

fn default_setup_categories() -> Vec<String> {
    vec![SETUP_CATEGORY_ID.to_string()]
}

/// `[pricing]` section: what counts as a one-time charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Category ids (or names) billed once.
    #[serde(default = "default_setup_categories")]
    pub setup_categories: Vec<String>,

    /// Units billed once, on top of the built-in ones (`onetime`, `per_setup`, ...).
    #[serde(default)]
    pub one_time_units: Vec<String>,
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            setup_categories: default_setup_categories(),
            one_time_units: Vec::new(),
        }
    }
}

impl PricingSettings {
    pub fn classifier(&self) -> BillingClassifier {
        BillingClassifier::new(&self.setup_categories, &self.one_time_units)
    }
}

impl From<&PricingSettings> for BillingClassifier {
    fn from(settings: &PricingSettings) -> Self {
        settings.classifier()
    }
}

// =============================================================================
// Simulator Config
// =============================================================================

/// Complete simulator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub pricing: PricingSettings,
}

impl SimulatorConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (simulator.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading simulator config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load simulator config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML file without env overrides or validation.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Simulator config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(
                "database.min_connections must not exceed max_connections".into(),
            ));
        }

        if self.database.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "database.connect_timeout_secs must be greater than 0".into(),
            ));
        }

        if self
            .pricing
            .setup_categories
            .iter()
            .chain(&self.pricing.one_time_units)
            .any(|entry| entry.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "pricing entries must not be blank".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("PRICING_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("PRICING_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %max, "Ignoring invalid PRICING_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(categories) = lookup("PRICING_SETUP_CATEGORIES") {
            debug!(categories = %categories, "Overriding setup categories from environment");
            self.pricing.setup_categories = split_list(&categories);
        }

        if let Some(units) = lookup("PRICING_ONE_TIME_UNITS") {
            self.pricing.one_time_units = split_list(&units);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pricing", "pricing-simulator")
            .map(|dirs| dirs.config_dir().join("simulator.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Pool configuration for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::from(&self.database)
    }

    pub fn classifier(&self) -> BillingClassifier {
        self.pricing.classifier()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = SimulatorConfig::default();
        assert_eq!(config.database.path, PathBuf::from("pricing.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.pricing.setup_categories, vec!["setup".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SimulatorConfig = toml::from_str(
            r#"
            [pricing]
            one_time_units = ["per_migration"]
            "#,
        )
        .unwrap();

        assert_eq!(config.database, DatabaseSettings::default());
        assert_eq!(config.pricing.setup_categories, vec!["setup".to_string()]);
        assert!(config.classifier().is_one_time_unit("per_migration"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimulatorConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::default();
        config.database.min_connections = 6;
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::default();
        config.pricing.setup_categories.push("  ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PRICING_DB_PATH", "/tmp/quotes.db"),
            ("PRICING_DB_MAX_CONNECTIONS", "not-a-number"),
            ("PRICING_SETUP_CATEGORIES", "setup, onboarding,"),
            ("PRICING_ONE_TIME_UNITS", "per_migration"),
        ]
        .into_iter()
        .collect();

        let mut config = SimulatorConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/quotes.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(
            config.pricing.setup_categories,
            vec!["setup".to_string(), "onboarding".to_string()]
        );
        assert_eq!(config.pricing.one_time_units, vec!["per_migration".to_string()]);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("pricing-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("simulator.toml");

        let mut config = SimulatorConfig::default();
        config.database.max_connections = 9;
        config.pricing.one_time_units = vec!["per_migration".to_string()];
        config.save(Some(path.clone())).unwrap();

        let loaded = SimulatorConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_db_config_from_settings() {
        let mut config = SimulatorConfig::default();
        config.database.max_connections = 3;
        config.database.min_connections = 2;
        config.database.run_migrations = false;

        let db = config.db_config();
        assert_eq!(db.max_connections, 3);
        assert_eq!(db.min_connections, 2);
        assert!(!db.run_migrations);
        assert_eq!(db.connect_timeout, Duration::from_secs(30));
        assert_eq!(db.idle_timeout, Some(Duration::from_secs(600)));
    }
}
