//! Market assumptions and loan terms.
//!
//! Validated value types consumed by the rate and fee solvers.

use serde::{Deserialize, Serialize};

use super::black_scholes::{call_delta, call_price};
use crate::error::{PricingError, require_finite, require_positive};

/// Market inputs shared by every option in a calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketAssumptions {
    /// Collateral price in quote currency.
    pub spot: f64,
    /// Annualized volatility of the collateral.
    pub volatility: f64,
    /// Annualized risk-free rate.
    pub risk_free_rate: f64,
    /// Annualized carry/dividend yield of the collateral.
    #[serde(default)]
    pub dividend_yield: f64,
}

impl MarketAssumptions {
    /// Create validated market assumptions.
    ///
    /// Rejects non-finite values, `spot <= 0` and `volatility <= 0`.
    pub fn new(
        spot: f64,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
    ) -> Result<Self, PricingError> {
        Ok(Self {
            spot: require_positive("spot", spot)?,
            volatility: require_positive("volatility", volatility)?,
            risk_free_rate: require_finite("risk_free_rate", risk_free_rate)?,
            dividend_yield: require_finite("dividend_yield", dividend_yield)?,
        })
    }

    /// Re-run validation on a value built by struct literal or deserialization.
    pub fn validated(self) -> Result<Self, PricingError> {
        Self::new(
            self.spot,
            self.volatility,
            self.risk_free_rate,
            self.dividend_yield,
        )
    }

    /// Same assumptions with a different spot.
    pub fn with_spot(self, spot: f64) -> Result<Self, PricingError> {
        Ok(Self {
            spot: require_positive("spot", spot)?,
            ..self
        })
    }

    /// Value of the call described by `option` under these assumptions.
    #[must_use]
    pub fn call_price(&self, option: OptionSpec) -> f64 {
        call_price(
            self.spot,
            option.strike,
            self.volatility,
            option.time_to_expiry,
            self.risk_free_rate,
            self.dividend_yield,
        )
    }

    /// Spot delta of the call described by `option`.
    #[must_use]
    pub fn call_delta(&self, option: OptionSpec) -> f64 {
        call_delta(
            self.spot,
            option.strike,
            self.volatility,
            option.time_to_expiry,
            self.risk_free_rate,
            self.dividend_yield,
        )
    }
}

/// Commercial terms of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    /// Disbursed loan amount over collateral value at origination.
    ///
    /// Values at or above 1 are accepted; the solvers report no solution
    /// when the balance cannot be met.
    pub loan_to_value: f64,
    /// Loan duration in years.
    pub tenor_years: f64,
}

impl ContractTerms {
    /// Create validated contract terms.
    pub fn new(loan_to_value: f64, tenor_years: f64) -> Result<Self, PricingError> {
        Ok(Self {
            loan_to_value: require_positive("loan_to_value", loan_to_value)?,
            tenor_years: require_positive("tenor_years", tenor_years)?,
        })
    }

    /// Loan amount disbursed against `spot` worth of collateral.
    #[must_use]
    pub fn loan_amount(&self, spot: f64) -> f64 {
        self.loan_to_value * spot
    }

    /// Strike implied by an annualized interest rate: principal plus simple interest.
    #[must_use]
    pub fn strike_for_rate(&self, spot: f64, rate: f64) -> f64 {
        self.loan_amount(spot) * (1.0 + rate * self.tenor_years)
    }

    /// Annualized interest rate implied by a repayment strike.
    #[must_use]
    pub fn rate_for_strike(&self, spot: f64, strike: f64) -> f64 {
        (strike / self.loan_amount(spot) - 1.0) / self.tenor_years
    }

    /// Strike implied by an upfront fee deducted from the collateral.
    #[must_use]
    pub fn strike_for_fee(&self, spot: f64, fee: f64) -> f64 {
        self.loan_amount(spot) / (1.0 - fee)
    }

    /// Call option with the given strike expiring at loan maturity.
    #[must_use]
    pub const fn option(&self, strike: f64) -> OptionSpec {
        OptionSpec {
            strike,
            time_to_expiry: self.tenor_years,
        }
    }
}

/// Contract parameters of the embedded European call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Exercise price; `<= 0` means exercise is certain.
    pub strike: f64,
    /// Time to expiry in years.
    pub time_to_expiry: f64,
}
