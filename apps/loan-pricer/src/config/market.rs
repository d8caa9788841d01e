//! Market assumptions for grid solves.

use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::pricing::MarketAssumptions;

/// Market configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Collateral spot price in loan currency.
    #[serde(default = "default_spot")]
    pub spot: f64,
    /// Annualized collateral volatility.
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    /// Annualized risk-free rate.
    #[serde(default)]
    pub risk_free_rate: f64,
    /// Annualized carry/dividend yield of the collateral.
    #[serde(default)]
    pub dividend_yield: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            spot: default_spot(),
            volatility: default_volatility(),
            risk_free_rate: 0.0,
            dividend_yield: 0.0,
        }
    }
}

impl MarketConfig {
    /// Validated market assumptions.
    pub fn assumptions(&self) -> Result<MarketAssumptions, PricingError> {
        MarketAssumptions::new(
            self.spot,
            self.volatility,
            self.risk_free_rate,
            self.dividend_yield,
        )
    }
}

const fn default_spot() -> f64 {
    2000.0
}

const fn default_volatility() -> f64 {
    0.5
}
