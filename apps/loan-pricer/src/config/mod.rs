//! Configuration module for the loan pricer.
//!
//! Loads the YAML configuration, interpolates environment variables and
//! validates every section before anything is solved.
//!
//! # Usage
//!
//! ```rust,ignore
//! use loan_pricer::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("spot: {}", config.market.spot);
//! ```

mod grid;
mod market;
mod observability;
mod quote;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grid::GridConfig;
pub use market::MarketConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use quote::QuoteConfig;

use crate::quote::MAX_TOKEN_DECIMALS;
use crate::solver::SolverConfig;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Market assumptions.
    #[serde(default)]
    pub market: MarketConfig,
    /// Grid axes and solve target.
    #[serde(default)]
    pub grid: GridConfig,
    /// Calibration policy.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Quote encoding.
    #[serde(default)]
    pub quote: QuoteConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let market = &config.market;

    if !(market.spot > 0.0 && market.spot <= 100_000.0) {
        return Err(invalid("market.spot must be in (0, 100000]"));
    }
    if !(market.volatility > 0.0 && market.volatility <= 5.0) {
        return Err(invalid("market.volatility must be in (0, 5]"));
    }
    if !(-1.0..=1.0).contains(&market.risk_free_rate) {
        return Err(invalid("market.risk_free_rate must be between -1.0 and 1.0"));
    }
    if !(-1.0..=1.0).contains(&market.dividend_yield) {
        return Err(invalid("market.dividend_yield must be between -1.0 and 1.0"));
    }

    config
        .grid
        .spec()
        .map_err(|e| invalid(format!("grid: {e}")))?;
    if !(config.grid.reference_spot.is_finite() && config.grid.reference_spot > 0.0) {
        return Err(invalid("grid.reference_spot must be positive"));
    }

    config.solver.validate().map_err(invalid)?;

    let quote = &config.quote;
    if quote.loan_token_decimals > MAX_TOKEN_DECIMALS {
        return Err(invalid(format!(
            "quote.loan_token_decimals must be at most {MAX_TOKEN_DECIMALS}"
        )));
    }
    if quote.collateral_token_decimals > MAX_TOKEN_DECIMALS {
        return Err(invalid(format!(
            "quote.collateral_token_decimals must be at most {MAX_TOKEN_DECIMALS}"
        )));
    }

    let valid_formats = ["json", "pretty"];
    let format = config.observability.logging.format.as_str();
    if !valid_formats.contains(&format) {
        return Err(invalid(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}
