//! Configuration module for loading and parsing TOML configuration files.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::gex::model::{GammaModel, PutGammaFormula};
use crate::gex::profile::{DEFAULT_LEVELS, MAX_LEVELS, ProfileBuilder};

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Gamma profile configuration.
    pub profile: ProfileConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
    /// Maximum accepted payload size for dataset uploads, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Gamma profile configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Default number of spot levels.
    pub levels: usize,
    /// Largest level count a request may ask for.
    pub max_levels: usize,
    /// Annualized risk-free rate.
    pub risk_free_rate: f64,
    /// Annualized continuous dividend yield.
    pub dividend_yield: f64,
    /// Default lower window bound as a fraction of the underlying price.
    pub window_lower: f64,
    /// Default upper window bound as a fraction of the underlying price.
    pub window_upper: f64,
    /// Put gamma closed form.
    pub put_gamma_formula: PutGammaFormula,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
            max_levels: 1_000,
            risk_free_rate: 0.0,
            dividend_yield: 0.0,
            window_lower: 0.8,
            window_upper: 1.2,
            put_gamma_formula: PutGammaFormula::default(),
        }
    }
}

impl ProfileConfig {
    /// Gamma model described by this configuration.
    #[must_use]
    pub fn model(&self) -> GammaModel {
        GammaModel::new(
            self.risk_free_rate,
            self.dividend_yield,
            self.put_gamma_formula,
        )
    }

    /// Profile builder with the configured model and level cap, using
    /// `levels` when given.
    #[must_use]
    pub fn builder(&self, levels: Option<usize>) -> ProfileBuilder {
        ProfileBuilder::new(self.model())
            .with_max_levels(self.max_levels)
            .with_levels(levels.unwrap_or(self.levels))
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue(
                "server max_upload_bytes must be positive".to_string(),
            ));
        }

        let profile = &self.profile;
        if profile.levels < 2 {
            return Err(ConfigError::InvalidValue(format!(
                "profile levels must be at least 2, got {}",
                profile.levels
            )));
        }
        if profile.max_levels < profile.levels || profile.max_levels > MAX_LEVELS {
            return Err(ConfigError::InvalidValue(format!(
                "profile max_levels must be between levels ({}) and {}, got {}",
                profile.levels, MAX_LEVELS, profile.max_levels
            )));
        }
        if !profile.risk_free_rate.is_finite() || !profile.dividend_yield.is_finite() {
            return Err(ConfigError::InvalidValue(
                "profile rate and dividend yield must be finite".to_string(),
            ));
        }
        if !(profile.window_lower > 0.0 && profile.window_lower <= profile.window_upper)
            || !profile.window_upper.is_finite()
        {
            return Err(ConfigError::InvalidValue(format!(
                "profile window fractions must satisfy 0 < lower <= upper, got {} and {}",
                profile.window_lower, profile.window_upper
            )));
        }

        Ok(())
    }
}
