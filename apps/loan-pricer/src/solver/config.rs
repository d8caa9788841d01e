//! Calibration policy shared by the rate and fee solvers.

use serde::{Deserialize, Serialize};

use super::minimizer::ProjectedNewtonConfig;

/// Multi-start calibration policy.
///
/// Guess generation, objective rescaling and acceptance live here rather
/// than in the minimizer, so any [`BoundedMinimizer`](super::BoundedMinimizer)
/// can be plugged in underneath.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// A candidate is accepted when its objective is strictly below this.
    pub acceptance_threshold: f64,
    /// Balance residuals with magnitude below this are multiplied by `scale_factor`.
    pub scale_cutoff: f64,
    /// Multiplier applied to small residuals before squaring.
    pub scale_factor: f64,
    /// Strike guesses step away from spot by this fraction of spot.
    pub strike_step_fraction: f64,
    /// Strike guesses stop below `spot * strike_upper_multiple`.
    pub strike_upper_multiple: f64,
    /// Lower bound of the strike search.
    pub strike_lower_bound: f64,
    /// Upper limit on strike guesses per side of spot.
    pub max_strike_guesses: u32,
    /// Spot at which an exhausted search is retried before giving up.
    ///
    /// The rescaling window is absolute, so the guesses at some price
    /// levels never converge inside it. The root found at this spot is
    /// mapped back and refined at the caller's spot.
    pub reference_spot: f64,
    /// Upper bound of the fee search.
    pub max_fee: f64,
    /// Number of fee guesses.
    pub fee_guess_count: u32,
    /// Local minimizer settings.
    pub minimizer: ProjectedNewtonConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.001,
            scale_cutoff: 10.0,
            scale_factor: 100.0,
            strike_step_fraction: 0.1,
            strike_upper_multiple: 10.0,
            strike_lower_bound: 1e-7,
            max_strike_guesses: 1_000,
            reference_spot: 100.0,
            max_fee: 0.1,
            fee_guess_count: 20,
            minimizer: ProjectedNewtonConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Squared balance residual with small residuals scaled up.
    ///
    /// Keeps the objective well-conditioned when the balance is close to
    /// zero, which matters for low-priced collateral.
    #[must_use]
    pub fn objective(&self, residual: f64) -> f64 {
        let scaled = if residual.abs() < self.scale_cutoff {
            residual * self.scale_factor
        } else {
            residual
        };
        scaled * scaled
    }

    /// Validate policy parameters.
    pub fn validate(&self) -> Result<(), String> {
        if !is_positive(self.acceptance_threshold) {
            return Err("solver.acceptance_threshold must be positive".to_string());
        }
        if !is_positive(self.scale_factor) {
            return Err("solver.scale_factor must be positive".to_string());
        }
        if !(self.scale_cutoff.is_finite() && self.scale_cutoff >= 0.0) {
            return Err("solver.scale_cutoff must be non-negative".to_string());
        }
        if !is_unit_fraction(self.strike_step_fraction) {
            return Err("solver.strike_step_fraction must be between 0.0 and 1.0".to_string());
        }
        if !is_positive(self.strike_upper_multiple - 1.0) {
            return Err("solver.strike_upper_multiple must be greater than 1.0".to_string());
        }
        if !is_positive(self.strike_lower_bound) {
            return Err("solver.strike_lower_bound must be positive".to_string());
        }
        if self.max_strike_guesses == 0 {
            return Err("solver.max_strike_guesses must be at least 1".to_string());
        }
        if !is_positive(self.reference_spot) {
            return Err("solver.reference_spot must be positive".to_string());
        }
        if !is_unit_fraction(self.max_fee) {
            return Err("solver.max_fee must be between 0.0 and 1.0".to_string());
        }
        if self.fee_guess_count == 0 {
            return Err("solver.fee_guess_count must be at least 1".to_string());
        }
        if self.minimizer.max_iterations == 0 {
            return Err("solver.minimizer.max_iterations must be at least 1".to_string());
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_unit_fraction(value: f64) -> bool {
    is_positive(value) && value < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_scales_small_residuals() {
        let config = SolverConfig::default();
        assert!((config.objective(0.5) - 2_500.0).abs() < 1e-9);
        assert!((config.objective(-0.5) - 2_500.0).abs() < 1e-9);
        assert!((config.objective(12.0) - 144.0).abs() < 1e-9);
        assert!((config.objective(-12.0) - 144.0).abs() < 1e-9);
        assert_eq!(config.objective(0.0), 0.0);
    }

    #[test]
    fn test_default_validates() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_max_fee() {
        let config = SolverConfig {
            max_fee: 1.0,
            ..SolverConfig::default()
        };
        let Err(message) = config.validate() else {
            panic!("max_fee of 1.0 should be rejected");
        };
        assert!(message.contains("max_fee"));
    }

    #[test]
    fn test_invalid_reference_spot() {
        let config = SolverConfig {
            reference_spot: 0.0,
            ..SolverConfig::default()
        };
        let Err(message) = config.validate() else {
            panic!("reference_spot of 0.0 should be rejected");
        };
        assert!(message.contains("reference_spot"));
    }
}
