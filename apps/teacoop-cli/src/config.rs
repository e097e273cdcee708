//! # Application Configuration
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--database`)
//! 2. Environment variables (`TEACOOP_*`)
//! 3. Config file (`config.toml`)
//! 4. Defaults (this file)
//!
//! ## File Location
//! - **Linux**: `~/.config/ledger/config.toml`
//! - **macOS**: `~/Library/Application Support/org.teacoop.ledger/config.toml`
//! - **Windows**: `%APPDATA%\teacoop\ledger\config\config.toml`
//!
//! ## Example
//! ```toml
//! database_path = "/srv/teacoop/teacoop.db"
//! currency_code = "KES"
//! inventory_unit_price = "400.00"
//! lot_sale_policy = "track-remaining"
//! log_filter = "info,teacoop=debug,sqlx=warn"
//! ```
//!
//! Configuration is read-only after startup.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use teacoop_core::{EngineConfig, LotSalePolicy, Money, ValuationConfig};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DATABASE_FILE_NAME: &str = "teacoop.db";
pub const DEFAULT_LOG_FILTER: &str = "info,teacoop=debug,sqlx=warn";

pub const ENV_DB_PATH: &str = "TEACOOP_DB_PATH";
pub const ENV_INVENTORY_UNIT_PRICE: &str = "TEACOOP_INVENTORY_UNIT_PRICE";
pub const ENV_LOT_SALE_POLICY: &str = "TEACOOP_LOT_SALE_POLICY";
pub const ENV_LOG: &str = "TEACOOP_LOG";

/// Errors while locating, reading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the platform config directory")]
    NoProjectDirs,

    #[error("Could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl ToString) -> Self {
        ConfigError::Invalid {
            field,
            message: message.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// SQLite file. `None` means `teacoop.db` in the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// ISO 4217 code, reported alongside money figures.
    pub currency_code: String,

    /// Price per kg used to value unsold lots.
    #[serde(with = "money_text")]
    pub inventory_unit_price: Money,

    pub lot_sale_policy: LotSalePolicy,

    /// `tracing` filter directives. `RUST_LOG` wins when set.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: None,
            currency_code: "KES".to_string(),
            inventory_unit_price: ValuationConfig::DEFAULT_UNIT_PRICE,
            lot_sale_policy: LotSalePolicy::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `path`, or from the platform config file.
    ///
    /// An explicit path must exist. A missing platform file means defaults.
    /// Environment overrides are applied, then the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(explicit) => Self::read(explicit)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::read(&default)?,
                _ => AppConfig::default(),
            },
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a config file without applying overrides.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `TEACOOP_*` overrides looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(price) = lookup(ENV_INVENTORY_UNIT_PRICE) {
            self.inventory_unit_price = price
                .parse()
                .map_err(|e| ConfigError::invalid("inventory unit price", e))?;
        }
        if let Some(policy) = lookup(ENV_LOT_SALE_POLICY) {
            self.lot_sale_policy = policy
                .parse()
                .map_err(|e| ConfigError::invalid("lot sale policy", e))?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let code = &self.currency_code;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::invalid(
                "currency code",
                format!("'{}' is not a three-letter ISO 4217 code", code),
            ));
        }
        if self.inventory_unit_price.is_negative() {
            return Err(ConfigError::invalid("inventory unit price", "cannot be negative"));
        }
        EnvFilter::try_new(&self.log_filter).map_err(|e| ConfigError::invalid("log filter", e))?;
        Ok(())
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The configured database file, or the platform default.
    pub fn resolved_database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => default_database_path(),
        }
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            lot_sale_policy: self.lot_sale_policy,
        }
    }

    pub fn valuation(&self) -> ValuationConfig {
        ValuationConfig {
            inventory_unit_price: self.inventory_unit_price,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "teacoop", "ledger")
}

/// `config.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// `teacoop.db` in the platform data directory, which is created if missing.
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = project_dirs().ok_or(ConfigError::NoProjectDirs)?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Io {
        path: data_dir.to_path_buf(),
        source,
    })?;
    Ok(data_dir.join(DATABASE_FILE_NAME))
}

/// Money as a decimal string (`"400.00"`) instead of raw cents.
mod money_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use teacoop_core::Money;

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.valuation(), ValuationConfig::default());
        assert_eq!(config.engine(), EngineConfig::default());
    }

    #[test]
    fn test_parse_partial_file() {
        let config = AppConfig::parse(
            "inventory_unit_price = \"375.50\"\nlot_sale_policy = \"track-remaining\"\n",
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(config.inventory_unit_price, Money::from_cents(37_550));
        assert_eq!(config.lot_sale_policy, LotSalePolicy::TrackRemaining);
        assert_eq!(config.currency_code, "KES");
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = AppConfig::parse("tax_rate = 16\n", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                (ENV_DB_PATH, "/tmp/coop.db"),
                (ENV_INVENTORY_UNIT_PRICE, "420"),
                (ENV_LOT_SALE_POLICY, "track-remaining"),
                (ENV_LOG, "warn"),
            ]))
            .unwrap();

        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/coop.db")));
        assert_eq!(config.inventory_unit_price, Money::from_major(420));
        assert_eq!(config.lot_sale_policy, LotSalePolicy::TrackRemaining);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_bad_env_override_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(env(&[(ENV_LOT_SALE_POLICY, "sell-everything")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "lot sale policy", .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let lowercase = AppConfig {
            currency_code: "kes".to_string(),
            ..AppConfig::default()
        };
        assert!(lowercase.validate().is_err());

        let negative = AppConfig {
            inventory_unit_price: Money::from_cents(-1),
            ..AppConfig::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_save_then_read() {
        let path = std::env::temp_dir()
            .join(format!("teacoop-config-{}", std::process::id()))
            .join(CONFIG_FILE_NAME);
        let config = AppConfig {
            database_path: Some(PathBuf::from("/var/lib/teacoop.db")),
            lot_sale_policy: LotSalePolicy::TrackRemaining,
            ..AppConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(AppConfig::read(&path).unwrap(), config);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
