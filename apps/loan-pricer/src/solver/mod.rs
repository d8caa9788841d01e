//! Calibration of fair loan terms.
//!
//! Both solvers turn a balance equation into a rescaled least-squares
//! objective, run a bounded local minimizer from a fixed sequence of
//! initial guesses and accept the first candidate whose objective falls
//! below the acceptance threshold.
//!
//! - [`RateSolver`]: searches the repayment strike, reports the annualized rate
//! - [`FeeSolver`]: searches the upfront fee fraction directly

mod config;
mod fee;
mod guesses;
mod minimizer;
mod outcome;
mod rate;
mod search;

pub use config::SolverConfig;
pub use fee::{FeeSolver, fee_balance, solve_fair_fee};
pub use guesses::{fee_guesses, strike_guesses};
pub use minimizer::{
    BoundedMinimizer, Bounds, GoldenSection, GoldenSectionConfig, Minimum, ProjectedNewton,
    ProjectedNewtonConfig, Termination,
};
pub use outcome::{Solution, SolveOutcome};
pub use rate::{RateSolver, rate_balance, solve_fair_rate};
