//! Black-Scholes European Call
//!
//! Closed-form call value and spot delta used to price the protection
//! embedded in a zero-liquidation loan:
//! - `call_price`: fair value with degenerate-case handling
//! - `call_delta`: first-order sensitivity to spot, guarded the same way
//!
//! Both functions take plain market/contract parameters and never fail.
//! Validation of the inputs happens at the boundary (`MarketAssumptions`,
//! `ContractTerms`), not here.

use std::f64::consts::SQRT_2;

// ============================================================================
// Normal Distribution
// ============================================================================

/// Standard normal CDF (cumulative distribution function).
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}

// ============================================================================
// Pricing
// ============================================================================

/// Black-Scholes d1 parameter.
///
/// Only meaningful for `strike > 0`, `volatility > 0` and
/// `time_to_expiry > 0`; the caller guards those cases.
#[must_use]
pub fn d1(
    spot: f64,
    strike: f64,
    volatility: f64,
    time_to_expiry: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
) -> f64 {
    ((spot / strike).ln()
        + (risk_free_rate - dividend_yield + 0.5 * volatility * volatility) * time_to_expiry)
        / (volatility * time_to_expiry.sqrt())
}

/// Fair value of a European call.
///
/// Degenerate cases are resolved before the closed form:
/// 1. `time_to_expiry <= 0` returns the intrinsic value `max(0, spot - strike)`.
/// 2. `strike <= 0` returns `spot` (exercise is certain).
///
/// # Arguments
///
/// * `spot` - Current price of the underlying (must be positive)
/// * `strike` - Exercise price
/// * `volatility` - Annualized volatility
/// * `time_to_expiry` - Time to expiry in years
/// * `risk_free_rate` - Continuously compounded risk-free rate
/// * `dividend_yield` - Continuous carry/dividend yield
#[must_use]
pub fn call_price(
    spot: f64,
    strike: f64,
    volatility: f64,
    time_to_expiry: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
) -> f64 {
    if time_to_expiry <= 0.0 {
        return (spot - strike).max(0.0);
    }
    if strike <= 0.0 {
        return spot;
    }

    let d1_val = d1(
        spot,
        strike,
        volatility,
        time_to_expiry,
        risk_free_rate,
        dividend_yield,
    );
    let d2_val = d1_val - volatility * time_to_expiry.sqrt();

    (-dividend_yield * time_to_expiry).exp() * spot * norm_cdf(d1_val)
        - strike * (-risk_free_rate * time_to_expiry).exp() * norm_cdf(d2_val)
}

/// Spot delta of a European call, `Φ(d1)`.
///
/// Guarded with the same limits as [`call_price`]:
/// - `time_to_expiry <= 0`: 1 when in the money, else 0
/// - `strike <= 0`: 1
/// - `volatility <= 0`: 1 when the forward is above the strike, else 0
#[must_use]
pub fn call_delta(
    spot: f64,
    strike: f64,
    volatility: f64,
    time_to_expiry: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
) -> f64 {
    if time_to_expiry <= 0.0 {
        return if spot > strike { 1.0 } else { 0.0 };
    }
    if strike <= 0.0 {
        return 1.0;
    }
    if volatility <= 0.0 {
        let forward = spot * ((risk_free_rate - dividend_yield) * time_to_expiry).exp();
        return if forward > strike { 1.0 } else { 0.0 };
    }

    norm_cdf(d1(
        spot,
        strike,
        volatility,
        time_to_expiry,
        risk_free_rate,
        dividend_yield,
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    const THIRTY_DAYS: f64 = 30.0 / 365.0;

    #[test]
    fn test_norm_cdf() {
        assert!(approx_eq(norm_cdf(0.0), 0.5, 1e-12));
        assert!(approx_eq(norm_cdf(1.96), 0.975, 0.001));
        assert!(approx_eq(norm_cdf(-1.96), 0.025, 0.001));
        assert!(approx_eq(norm_cdf(1.0) + norm_cdf(-1.0), 1.0, 1e-12));
    }

    #[test]
    fn test_call_atm_reference() {
        // S=100, K=100, T=1, r=0.05, q=0, sigma=0.20
        let price = call_price(100.0, 100.0, 0.20, 1.0, 0.05, 0.0);
        assert!(approx_eq(price, 10.450_583_572_185_565, 1e-9));
    }

    #[test]
    fn test_call_atm_thirty_days_half_vol() {
        // With r = q = 0 the ATM call reduces to S * (2 * Φ(σ√T / 2) - 1)
        let sigma_sqrt_t = 0.5 * THIRTY_DAYS.sqrt();
        let closed_form = 100.0 * (2.0 * norm_cdf(0.5 * sigma_sqrt_t) - 1.0);

        let price = call_price(100.0, 100.0, 0.5, THIRTY_DAYS, 0.0, 0.0);

        assert!(approx_eq(price, closed_form, 1e-10));
        assert!(approx_eq(price, 5.713_767_509, 1e-6));
    }

    #[test]
    fn test_call_with_dividend_yield() {
        // S=100, K=95, T=0.5, r=0.10, q=0.05, sigma=0.20
        let price = call_price(100.0, 95.0, 0.20, 0.5, 0.10, 0.05);
        let no_carry = call_price(100.0, 95.0, 0.20, 0.5, 0.10, 0.0);
        assert!(approx_eq(price, 9.628_984, 1e-5));
        assert!(price < no_carry);
    }

    #[test_case(100.0, 80.0 => 20.0; "in the money")]
    #[test_case(100.0, 120.0 => 0.0; "out of the money")]
    #[test_case(100.0, 100.0 => 0.0; "at the money")]
    fn test_zero_expiry_is_intrinsic(spot: f64, strike: f64) -> f64 {
        call_price(spot, strike, 0.5, 0.0, 0.05, 0.0)
    }

    #[test]
    fn test_negative_expiry_is_intrinsic() {
        assert!(approx_eq(call_price(100.0, 60.0, 0.5, -1.0, 0.0, 0.0), 40.0, 1e-12));
    }

    #[test_case(0.0; "zero strike")]
    #[test_case(-25.0; "negative strike")]
    fn test_non_positive_strike_is_spot(strike: f64) {
        assert!(approx_eq(call_price(100.0, strike, 0.5, 1.0, 0.05, 0.02), 100.0, 1e-12));
    }

    #[test]
    fn test_zero_expiry_takes_precedence_over_strike() {
        // Case 1 wins over case 2: intrinsic of a negative strike exceeds spot
        assert!(approx_eq(call_price(100.0, -10.0, 0.5, 0.0, 0.0, 0.0), 110.0, 1e-12));
    }

    #[test]
    fn test_delta_atm() {
        let delta = call_delta(100.0, 100.0, 0.20, 1.0, 0.05, 0.0);
        // d1 = (0.05 + 0.02) / 0.2 = 0.35
        assert!(approx_eq(delta, norm_cdf(0.35), 1e-12));
    }

    #[test]
    fn test_delta_extreme_strikes() {
        assert!(call_delta(100.0, 1e-6, 0.5, THIRTY_DAYS, 0.0, 0.0) > 0.999_999);
        assert!(call_delta(100.0, 1e6, 0.5, THIRTY_DAYS, 0.0, 0.0) < 1e-6);
    }

    #[test_case(100.0, 90.0, 0.5, 0.0 => 1.0; "expired in the money")]
    #[test_case(100.0, 110.0, 0.5, 0.0 => 0.0; "expired out of the money")]
    #[test_case(100.0, 0.0, 0.5, 1.0 => 1.0; "zero strike")]
    #[test_case(100.0, 90.0, 0.0, 1.0 => 1.0; "zero vol forward above strike")]
    #[test_case(100.0, 110.0, 0.0, 1.0 => 0.0; "zero vol forward below strike")]
    fn test_delta_degenerate_cases(spot: f64, strike: f64, vol: f64, t: f64) -> f64 {
        call_delta(spot, strike, vol, t, 0.0, 0.0)
    }

    #[test]
    fn test_price_non_decreasing_in_volatility() {
        let mut previous = 0.0;
        for step in 1..=40 {
            let vol = f64::from(step) * 0.05;
            let price = call_price(100.0, 110.0, vol, 0.25, 0.01, 0.0);
            assert!(price >= previous - 1e-12, "vol {vol}: {price} < {previous}");
            previous = price;
        }
    }
}
