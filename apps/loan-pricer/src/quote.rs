//! Fixed-point Quote Encoding
//!
//! Converts a solved rate or fee into the integer-as-string record consumed
//! on-chain. Rates are expressed per loan period on an 18-decimal basis,
//! amounts on the token's own decimal basis and the tenor in seconds of a
//! 365-day year.
//!
//! All scaling happens in [`Decimal`] and every field is rounded exactly once,
//! half to even.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal basis of rates, fees in oracle format and oracle LTVs.
pub const RATE_DECIMALS: u32 = 18;

/// Seconds in a 365-day year.
pub const SECONDS_PER_YEAR: u32 = 31_536_000;

/// Largest supported token decimal count.
pub const MAX_TOKEN_DECIMALS: u32 = 18;

/// Errors raised while encoding a quote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// Input is NaN or infinite.
    #[error("{field} is not finite")]
    NonFinite {
        /// Name of the offending input.
        field: &'static str,
    },

    /// Input is negative where only non-negative values make sense.
    #[error("{field} must not be negative")]
    Negative {
        /// Name of the offending input.
        field: &'static str,
    },

    /// Scaled value does not fit the decimal range.
    #[error("{field} overflows the fixed-point range")]
    Overflow {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Token decimal count above the supported maximum.
    #[error("Token decimals must be at most {MAX_TOKEN_DECIMALS}, got {0}")]
    InvalidDecimals(u32),
}

/// Protocol-ready quote with every field as an integer string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTuple {
    /// Loan amount per unit of collateral, or the LTV in oracle format.
    pub loan_per_coll_unit_or_ltv: String,
    /// Interest over the whole tenor on an 18-decimal basis.
    pub interest_rate_pct_in_base: String,
    /// Upfront fee on the collateral token's decimal basis.
    pub upfront_fee_pct_in_base: String,
    /// Tenor in seconds.
    pub tenor: String,
}

/// Quote encoder bound to a loan/collateral token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteEncoder {
    loan_token_decimals: u32,
    collateral_token_decimals: u32,
    oracle_format: bool,
}

impl QuoteEncoder {
    /// Create an encoder for the given token decimals.
    pub const fn new(
        loan_token_decimals: u32,
        collateral_token_decimals: u32,
        oracle_format: bool,
    ) -> Result<Self, QuoteError> {
        if loan_token_decimals > MAX_TOKEN_DECIMALS {
            return Err(QuoteError::InvalidDecimals(loan_token_decimals));
        }
        if collateral_token_decimals > MAX_TOKEN_DECIMALS {
            return Err(QuoteError::InvalidDecimals(collateral_token_decimals));
        }
        Ok(Self {
            loan_token_decimals,
            collateral_token_decimals,
            oracle_format,
        })
    }

    /// Whether the loan amount is quoted as an 18-decimal LTV.
    #[must_use]
    pub const fn oracle_format(&self) -> bool {
        self.oracle_format
    }

    /// Encode a quote.
    ///
    /// `rate` is annualized; the encoded interest covers `tenor_years`.
    pub fn encode(
        &self,
        loan_to_value: f64,
        spot: f64,
        tenor_years: f64,
        rate: f64,
        fee: f64,
    ) -> Result<QuoteTuple, QuoteError> {
        let ltv = non_negative("loan_to_value", loan_to_value)?;
        let tenor = non_negative("tenor_years", tenor_years)?;
        let rate = to_decimal("rate", rate)?;
        let fee = to_decimal("fee", fee)?;

        let loan = if self.oracle_format {
            scale("loanPerCollUnitOrLtv", ltv, pow10(RATE_DECIMALS))?
        } else {
            let spot = non_negative("spot", spot)?;
            let per_unit = checked("loanPerCollUnitOrLtv", ltv.checked_mul(spot))?;
            scale("loanPerCollUnitOrLtv", per_unit, pow10(self.loan_token_decimals))?
        };

        let period_rate = checked("interestRatePctInBase", rate.checked_mul(tenor))?;

        Ok(QuoteTuple {
            loan_per_coll_unit_or_ltv: loan,
            interest_rate_pct_in_base: scale(
                "interestRatePctInBase",
                period_rate,
                pow10(RATE_DECIMALS),
            )?,
            upfront_fee_pct_in_base: scale(
                "upfrontFeePctInBase",
                fee,
                pow10(self.collateral_token_decimals),
            )?,
            tenor: scale("tenor", tenor, Decimal::from(SECONDS_PER_YEAR))?,
        })
    }
}

/// Convert an `f64` to its shortest decimal representation.
///
/// Parsing the formatted value keeps `0.7` as exactly `0.7` instead of the
/// binary expansion `0.6999999999999999555910790149937`.
fn to_decimal(field: &'static str, value: f64) -> Result<Decimal, QuoteError> {
    if !value.is_finite() {
        return Err(QuoteError::NonFinite { field });
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .ok_or(QuoteError::Overflow { field })
}

fn non_negative(field: &'static str, value: f64) -> Result<Decimal, QuoteError> {
    let decimal = to_decimal(field, value)?;
    if decimal.is_sign_negative() && !decimal.is_zero() {
        return Err(QuoteError::Negative { field });
    }
    Ok(decimal)
}

fn checked(field: &'static str, value: Option<Decimal>) -> Result<Decimal, QuoteError> {
    value.ok_or(QuoteError::Overflow { field })
}

fn pow10(exponent: u32) -> Decimal {
    Decimal::from(10_u64.pow(exponent))
}

/// Multiply, round half to even and render as an integer string.
fn scale(field: &'static str, value: Decimal, factor: Decimal) -> Result<String, QuoteError> {
    let scaled = checked(field, value.checked_mul(factor))?;
    Ok(scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .normalize()
        .to_string())
}
