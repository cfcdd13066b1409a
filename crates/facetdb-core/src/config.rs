//! `FacetDB` Configuration Module
//!
//! Provides configuration file support via `facetdb.toml`, environment variables,
//! and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (CLI flags)
//! 2. Environment variables (`FACETDB_*`, sections separated by `__`,
//!    e.g. `FACETDB_CATALOG__PRICE_ATTRIBUTE`)
//! 3. Configuration file (`facetdb.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Catalog configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Attribute whose min/max over the matched products is reported in
    /// the first two words of a lookup result.
    pub price_attribute: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            price_attribute: "price".to_string(),
        }
    }
}

/// Lookup configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Sort direction used when a request does not specify one.
    pub default_ascending: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            default_ascending: true,
        }
    }
}

/// Similarity configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Number of recommendations returned when the caller does not ask for a count.
    pub default_max_products: u32,
    /// Upper bound accepted for a requested recommendation count.
    pub max_products_limit: u32,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            default_max_products: 20,
            max_products_limit: 1000,
        }
    }
}

impl SimilarityConfig {
    /// Clamps a requested count into `[1, max_products_limit]`, falling back
    /// to the default when none is given.
    #[must_use]
    pub fn effective_max_products(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_max_products)
            .clamp(1, self.max_products_limit)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: text or json.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Main `FacetDB` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FacetConfig {
    /// Catalog configuration.
    pub catalog: CatalogConfig,
    /// Lookup configuration.
    pub lookup: LookupConfig,
    /// Similarity configuration.
    pub similarity: SimilarityConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl FacetConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("facetdb.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("FACETDB_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.price_attribute.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "catalog.price_attribute".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.similarity.max_products_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "similarity.max_products_limit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.similarity.default_max_products == 0
            || self.similarity.default_max_products > self.similarity.max_products_limit
        {
            return Err(ConfigError::InvalidValue {
                key: "similarity.default_max_products".to_string(),
                message: format!(
                    "value {} is out of range [1, {}]",
                    self.similarity.default_max_products, self.similarity.max_products_limit
                ),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
