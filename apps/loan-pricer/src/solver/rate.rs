//! Fair interest rate calibration.
//!
//! The lender disburses `ltv·S`, holds collateral worth `S` and has sold the
//! borrower a call struck at the repayment amount `K = ltv·S·(1 + rate·T)`.
//! The fair rate makes the lender's position balance:
//!
//! `f(K) = S − C(S, K, σ, T, r, q) − ltv·S = 0`
//!
//! The root is searched by minimizing the rescaled `f(K)²` from a sequence
//! of strike guesses fanning out from spot.

use tracing::{debug, instrument};

use super::config::SolverConfig;
use super::guesses::strike_guesses;
use super::minimizer::{BoundedMinimizer, Bounds, ProjectedNewton};
use super::outcome::{SolveOutcome, Solution};
use super::search::{Accepted, first_accepted};
use crate::error::PricingError;
use crate::pricing::{ContractTerms, MarketAssumptions};

/// Balance of the lender's position for a repayment strike.
#[must_use]
pub fn rate_balance(market: &MarketAssumptions, terms: &ContractTerms, strike: f64) -> f64 {
    market.spot - market.call_price(terms.option(strike)) - terms.loan_amount(market.spot)
}

/// Fair interest rate solver.
#[derive(Debug, Clone)]
pub struct RateSolver<M = ProjectedNewton> {
    config: SolverConfig,
    minimizer: M,
}

impl Default for RateSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl RateSolver {
    /// Create a solver using the projected quasi-Newton minimizer.
    #[must_use]
    pub const fn new(config: SolverConfig) -> Self {
        Self {
            minimizer: ProjectedNewton::new(config.minimizer),
            config,
        }
    }
}

impl<M: BoundedMinimizer> RateSolver<M> {
    /// Create a solver with a custom minimizer.
    #[must_use]
    pub const fn with_minimizer(config: SolverConfig, minimizer: M) -> Self {
        Self { config, minimizer }
    }

    /// Active policy.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve the annualized interest rate balancing the lender's position.
    ///
    /// Returns `NoSolution` when no strike guess converges below the
    /// acceptance threshold, e.g. when `ltv` is so high that collateral minus
    /// the call can never cover the loan. When the guesses at the caller's
    /// spot are exhausted the search is repeated at
    /// [`SolverConfig::reference_spot`] and the root refined at the caller's
    /// spot, so the outcome does not depend on the price level.
    #[instrument(
        level = "debug",
        skip(self, market, terms),
        fields(spot = market.spot, ltv = terms.loan_to_value, tenor = terms.tenor_years)
    )]
    pub fn solve(&self, market: &MarketAssumptions, terms: &ContractTerms) -> SolveOutcome {
        let guesses = self.guesses(market.spot);
        let guesses_tried = guesses.len();

        self.search(market, terms, guesses)
            .or_else(|| self.search_at_reference(market, terms))
            .map_or(SolveOutcome::NoSolution { guesses_tried }, |accepted| {
                let strike = accepted.minimum.x;
                SolveOutcome::Solved(Solution {
                    value: terms.rate_for_strike(market.spot, strike),
                    argument: strike,
                    guess_index: accepted.guess_index,
                    initial_guess: accepted.initial_guess,
                    objective: accepted.minimum.value,
                    iterations: accepted.minimum.iterations,
                })
            })
    }

    fn guesses(&self, spot: f64) -> Vec<f64> {
        strike_guesses(
            spot,
            self.config.strike_step_fraction,
            self.config.strike_upper_multiple,
            self.config.strike_lower_bound,
            self.config.max_strike_guesses,
        )
    }

    fn search(
        &self,
        market: &MarketAssumptions,
        terms: &ContractTerms,
        guesses: Vec<f64>,
    ) -> Option<Accepted> {
        let objective = |strike: f64| self.config.objective(rate_balance(market, terms, strike));
        first_accepted(
            &self.minimizer,
            &objective,
            guesses,
            Bounds::at_least(self.config.strike_lower_bound),
            self.config.acceptance_threshold,
        )
    }

    /// Solve at the reference spot, then refine the scaled strike at `market.spot`.
    ///
    /// The refined candidate must pass the acceptance threshold at the
    /// caller's spot.
    fn search_at_reference(
        &self,
        market: &MarketAssumptions,
        terms: &ContractTerms,
    ) -> Option<Accepted> {
        let reference_spot = self.config.reference_spot;
        if (market.spot - reference_spot).abs() <= f64::EPSILON * reference_spot {
            return None;
        }
        let reference = market.with_spot(reference_spot).ok()?;
        let found = self.search(&reference, terms, self.guesses(reference_spot))?;

        let start = found.minimum.x * market.spot / reference_spot;
        let refined = self.search(market, terms, vec![start])?;
        debug!(
            reference_spot,
            reference_strike = found.minimum.x,
            strike = refined.minimum.x,
            "Solved via reference spot"
        );
        Some(Accepted {
            guess_index: found.guess_index,
            initial_guess: found.initial_guess,
            ..refined
        })
    }
}

/// Solve the fair interest rate with the default policy.
///
/// Validates the inputs first; invalid market parameters are an error,
/// an unsolvable balance is `Ok(SolveOutcome::NoSolution)`.
pub fn solve_fair_rate(
    loan_to_value: f64,
    tenor_years: f64,
    spot: f64,
    volatility: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
) -> Result<SolveOutcome, PricingError> {
    let market = MarketAssumptions::new(spot, volatility, risk_free_rate, dividend_yield)?;
    let terms = ContractTerms::new(loan_to_value, tenor_years)?;
    Ok(RateSolver::default().solve(&market, &terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::GoldenSection;

    const THIRTY_DAYS: f64 = 30.0 / 365.0;

    fn market() -> MarketAssumptions {
        MarketAssumptions::new(100.0, 0.5, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_thirty_day_seventy_percent_ltv() {
        let outcome = solve_fair_rate(0.7, THIRTY_DAYS, 100.0, 0.5, 0.0, 0.0).unwrap();
        let Some(rate) = outcome.value() else {
            panic!("expected a fair rate, got {outcome:?}");
        };

        assert!(rate.is_finite());
        assert!(rate > 0.0);
        // Put value at K≈70 is a few cents; the rate is well under 1% p.a.
        assert!(rate < 0.01, "rate = {rate}");

        let terms = ContractTerms::new(0.7, THIRTY_DAYS).unwrap();
        let strike = terms.strike_for_rate(100.0, rate);
        assert!(rate_balance(&market(), &terms, strike).abs() < 0.001);
    }

    #[test]
    fn test_rate_increases_with_ltv() {
        let rates: Vec<f64> = [0.5, 0.7, 0.9]
            .iter()
            .map(|&ltv| {
                solve_fair_rate(ltv, 90.0 / 365.0, 100.0, 0.5, 0.0, 0.0)
                    .unwrap()
                    .value()
                    .unwrap()
            })
            .collect();

        assert!(rates[0] < rates[1], "{rates:?}");
        assert!(rates[1] < rates[2], "{rates:?}");
    }

    #[test]
    fn test_solution_reports_strike_and_guess() {
        let terms = ContractTerms::new(0.9, THIRTY_DAYS).unwrap();
        let outcome = RateSolver::default().solve(&market(), &terms);
        let solution = outcome.solution().unwrap();

        assert!(solution.objective < 0.001);
        assert!(solution.argument > 90.0);
        assert!((terms.strike_for_rate(100.0, solution.value) - solution.argument).abs() < 1e-9);
    }

    #[test]
    fn test_ltv_above_one_has_no_solution() {
        let outcome = solve_fair_rate(1.5, THIRTY_DAYS, 100.0, 0.5, 0.0, 0.0).unwrap();
        assert_eq!(outcome, SolveOutcome::NoSolution { guesses_tried: 99 });
    }

    #[test]
    fn test_invalid_volatility_is_rejected() {
        assert!(solve_fair_rate(0.7, THIRTY_DAYS, 100.0, 0.0, 0.0, 0.0).is_err());
        assert!(solve_fair_rate(0.7, 0.0, 100.0, 0.5, 0.0, 0.0).is_err());
        assert!(solve_fair_rate(0.7, THIRTY_DAYS, -1.0, 0.5, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_rate_independent_of_spot() {
        let tenor = 90.0 / 365.0;
        let rates: Vec<f64> = [100.0, 500.0, 2000.0]
            .iter()
            .map(|&spot| {
                let outcome = solve_fair_rate(0.8, tenor, spot, 0.5, 0.0, 0.0).unwrap();
                let Some(rate) = outcome.value() else {
                    panic!("spot {spot}: expected a fair rate, got {outcome:?}");
                };
                let market = MarketAssumptions::new(spot, 0.5, 0.0, 0.0).unwrap();
                let terms = ContractTerms::new(0.8, tenor).unwrap();
                let strike = terms.strike_for_rate(spot, rate);
                assert!(
                    SolverConfig::default().objective(rate_balance(&market, &terms, strike)) < 0.001
                );
                rate
            })
            .collect();

        assert!((rates[0] - 0.148_73).abs() < 1e-4, "{rates:?}");
        assert!((rates[0] - rates[1]).abs() < 1e-6, "{rates:?}");
        assert!((rates[0] - rates[2]).abs() < 1e-6, "{rates:?}");
    }

    #[test]
    fn test_short_tenor_high_ltv_at_high_spot() {
        let at_reference = solve_fair_rate(0.9, THIRTY_DAYS, 100.0, 0.5, 0.0, 0.0)
            .unwrap()
            .value()
            .unwrap();
        let at_high_spot = solve_fair_rate(0.9, THIRTY_DAYS, 2000.0, 0.5, 0.0, 0.0)
            .unwrap()
            .value()
            .unwrap();

        assert!((at_reference - at_high_spot).abs() < 1e-6, "{at_reference} vs {at_high_spot}");
    }

    #[test]
    fn test_scale_cutoff_tracks_price_level() {
        let terms = ContractTerms::new(0.8, 60.0 / 365.0).unwrap();
        let reference = MarketAssumptions::new(100.0, 0.6, 0.02, 0.0).unwrap();
        let expensive = MarketAssumptions::new(2000.0, 0.6, 0.02, 0.0).unwrap();

        let at_reference = RateSolver::default().solve(&reference, &terms).value().unwrap();

        let widened = SolverConfig {
            scale_cutoff: 200.0,
            ..SolverConfig::default()
        };
        let at_expensive = RateSolver::new(widened).solve(&expensive, &terms).value().unwrap();

        assert!((at_reference - at_expensive).abs() < 1e-6, "{at_reference} vs {at_expensive}");
    }

    #[test]
    fn test_custom_minimizer_keeps_acceptance_policy() {
        let solver = RateSolver::with_minimizer(SolverConfig::default(), GoldenSection::default());
        let terms = ContractTerms::new(0.7, THIRTY_DAYS).unwrap();

        match solver.solve(&market(), &terms) {
            SolveOutcome::Solved(solution) => {
                let strike = terms.strike_for_rate(100.0, solution.value);
                assert!(rate_balance(&market(), &terms, strike).abs() < 0.001);
            }
            SolveOutcome::NoSolution { guesses_tried } => assert_eq!(guesses_tried, 99),
        }
    }
}
