//! Token decimals for quote encoding.

use serde::{Deserialize, Serialize};

use crate::quote::{QuoteEncoder, QuoteError};

/// Quote configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Decimals of the loan token.
    #[serde(default = "default_loan_token_decimals")]
    pub loan_token_decimals: u32,
    /// Decimals of the collateral token.
    #[serde(default = "default_collateral_token_decimals")]
    pub collateral_token_decimals: u32,
    /// Quote the loan amount as an 18-decimal LTV instead of per collateral unit.
    #[serde(default)]
    pub oracle_format: bool,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            loan_token_decimals: default_loan_token_decimals(),
            collateral_token_decimals: default_collateral_token_decimals(),
            oracle_format: false,
        }
    }
}

impl QuoteConfig {
    /// Encoder for the configured tokens.
    pub const fn encoder(&self) -> Result<QuoteEncoder, QuoteError> {
        QuoteEncoder::new(
            self.loan_token_decimals,
            self.collateral_token_decimals,
            self.oracle_format,
        )
    }
}

const fn default_loan_token_decimals() -> u32 {
    6
}

const fn default_collateral_token_decimals() -> u32 {
    18
}
