//! Fair upfront fee calibration.
//!
//! Instead of accruing interest, the lender keeps a fraction `φ` of the
//! collateral upfront. The borrower's call on the remaining `1 − φ` of the
//! collateral is struck at `K(φ) = ltv·S / (1 − φ)`, and the fair fee solves
//!
//! `g(φ) = (1 − φ)·(S − C(S, K(φ), σ, T, r, q)) − (ltv·S − φ·S) = 0`
//!
//! on `φ ∈ [0, max_fee]`.

use tracing::{debug, instrument};

use super::config::SolverConfig;
use super::guesses::fee_guesses;
use super::minimizer::{BoundedMinimizer, Bounds, ProjectedNewton};
use super::outcome::{SolveOutcome, Solution};
use super::search::{Accepted, first_accepted};
use crate::error::PricingError;
use crate::pricing::{ContractTerms, MarketAssumptions};

/// Balance of the lender's position for an upfront fee.
#[must_use]
pub fn fee_balance(market: &MarketAssumptions, terms: &ContractTerms, fee: f64) -> f64 {
    let strike = terms.strike_for_fee(market.spot, fee);
    let retained = market.spot - market.call_price(terms.option(strike));
    (1.0 - fee) * retained - (terms.loan_amount(market.spot) - fee * market.spot)
}

/// Fair upfront fee solver.
#[derive(Debug, Clone)]
pub struct FeeSolver<M = ProjectedNewton> {
    config: SolverConfig,
    minimizer: M,
}

impl Default for FeeSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl FeeSolver {
    /// Create a solver using the projected quasi-Newton minimizer.
    #[must_use]
    pub const fn new(config: SolverConfig) -> Self {
        Self {
            minimizer: ProjectedNewton::new(config.minimizer),
            config,
        }
    }
}

impl<M: BoundedMinimizer> FeeSolver<M> {
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

    /// Solve the upfront fee fraction balancing the lender's position.
    ///
    /// Like [`RateSolver::solve`](super::RateSolver::solve), an exhausted
    /// search is retried at the reference spot and refined at the caller's.
    #[instrument(
        level = "debug",
        skip(self, market, terms),
        fields(spot = market.spot, ltv = terms.loan_to_value, tenor = terms.tenor_years)
    )]
    pub fn solve(&self, market: &MarketAssumptions, terms: &ContractTerms) -> SolveOutcome {
        let guesses = fee_guesses(self.config.max_fee, self.config.fee_guess_count);
        let guesses_tried = guesses.len();

        self.search(market, terms, guesses)
            .or_else(|| self.search_at_reference(market, terms))
            .map_or(SolveOutcome::NoSolution { guesses_tried }, |accepted| {
                SolveOutcome::Solved(Solution {
                    value: accepted.minimum.x,
                    argument: accepted.minimum.x,
                    guess_index: accepted.guess_index,
                    initial_guess: accepted.initial_guess,
                    objective: accepted.minimum.value,
                    iterations: accepted.minimum.iterations,
                })
            })
    }

    fn search(
        &self,
        market: &MarketAssumptions,
        terms: &ContractTerms,
        guesses: Vec<f64>,
    ) -> Option<Accepted> {
        let objective = |fee: f64| self.config.objective(fee_balance(market, terms, fee));
        first_accepted(
            &self.minimizer,
            &objective,
            guesses,
            Bounds::new(0.0, self.config.max_fee),
            self.config.acceptance_threshold,
        )
    }

    /// The fee is a fraction of spot, so the reference root is the starting
    /// point at `market.spot` as is.
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
        let guesses = fee_guesses(self.config.max_fee, self.config.fee_guess_count);
        let found = self.search(&reference, terms, guesses)?;

        let refined = self.search(market, terms, vec![found.minimum.x])?;
        debug!(
            reference_spot,
            reference_fee = found.minimum.x,
            fee = refined.minimum.x,
            "Solved via reference spot"
        );
        Some(Accepted {
            guess_index: found.guess_index,
            initial_guess: found.initial_guess,
            ..refined
        })
    }
}

/// Solve the fair upfront fee with the default policy.
pub fn solve_fair_fee(
    loan_to_value: f64,
    tenor_years: f64,
    spot: f64,
    volatility: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
) -> Result<SolveOutcome, PricingError> {
    let market = MarketAssumptions::new(spot, volatility, risk_free_rate, dividend_yield)?;
    let terms = ContractTerms::new(loan_to_value, tenor_years)?;
    Ok(FeeSolver::default().solve(&market, &terms))
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
    fn test_ninety_percent_ltv_fee() {
        let outcome = solve_fair_fee(0.9, THIRTY_DAYS, 100.0, 0.5, 0.0, 0.0).unwrap();
        let fee = outcome.value().unwrap();

        assert!(fee > 0.02 && fee < 0.03, "fee = {fee}");
        let terms = ContractTerms::new(0.9, THIRTY_DAYS).unwrap();
        assert!(fee_balance(&market(), &terms, fee).abs() < 0.001);
    }

    #[test]
    fn test_fee_stays_within_bounds() {
        for ltv in [0.3, 0.5, 0.7, 0.9] {
            let outcome = solve_fair_fee(ltv, 60.0 / 365.0, 100.0, 0.5, 0.0, 0.0).unwrap();
            if let Some(fee) = outcome.value() {
                assert!((0.0..=0.1).contains(&fee), "ltv {ltv}: fee {fee}");
            }
        }
    }

    #[test]
    fn test_ltv_above_one_has_no_solution() {
        let outcome = solve_fair_fee(1.5, THIRTY_DAYS, 100.0, 0.5, 0.0, 0.0).unwrap();
        assert_eq!(outcome, SolveOutcome::NoSolution { guesses_tried: 20 });
    }

    #[test]
    fn test_fee_above_cap_has_no_solution() {
        // A fair fee beyond max_fee is not clipped to the cap
        let config = SolverConfig {
            max_fee: 0.01,
            ..SolverConfig::default()
        };
        let terms = ContractTerms::new(0.9, THIRTY_DAYS).unwrap();
        let outcome = FeeSolver::new(config).solve(&market(), &terms);
        assert!(!outcome.is_solved());
    }

    #[test]
    fn test_fee_independent_of_spot() {
        let tenor = 180.0 / 365.0;
        let fees: Vec<f64> = [100.0, 500.0, 2000.0]
            .iter()
            .map(|&spot| {
                let outcome = solve_fair_fee(0.7, tenor, spot, 0.5, 0.0, 0.0).unwrap();
                let Some(fee) = outcome.value() else {
                    panic!("spot {spot}: expected a fair fee, got {outcome:?}");
                };
                let market = MarketAssumptions::new(spot, 0.5, 0.0, 0.0).unwrap();
                let terms = ContractTerms::new(0.7, tenor).unwrap();
                assert!(
                    SolverConfig::default().objective(fee_balance(&market, &terms, fee)) < 0.001
                );
                fee
            })
            .collect();

        assert!((fees[0] - 0.026_86).abs() < 1e-4, "{fees:?}");
        assert!((fees[0] - fees[1]).abs() < 1e-6, "{fees:?}");
        assert!((fees[0] - fees[2]).abs() < 1e-6, "{fees:?}");
    }

    #[test]
    fn test_golden_section_agrees() {
        let terms = ContractTerms::new(0.9, THIRTY_DAYS).unwrap();
        let quasi_newton = FeeSolver::default().solve(&market(), &terms).value().unwrap();
        let golden = FeeSolver::with_minimizer(SolverConfig::default(), GoldenSection::default())
            .solve(&market(), &terms)
            .value()
            .unwrap();

        assert!((quasi_newton - golden).abs() < 1e-4, "{quasi_newton} vs {golden}");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(solve_fair_fee(0.9, THIRTY_DAYS, 0.0, 0.5, 0.0, 0.0).is_err());
        assert!(solve_fair_fee(0.9, THIRTY_DAYS, 100.0, f64::NAN, 0.0, 0.0).is_err());
    }
}
