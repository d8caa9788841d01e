// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_collect,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Loan Pricer - Zero-Liquidation Loan Calibration
//!
//! A zero-liquidation loan is economically a loan plus a European call the
//! lender writes to the borrower: the borrower repays and reclaims the
//! collateral only if it is worth more than the repayment amount. Pricing
//! the call lets the lender solve the interest rate or upfront fee that
//! makes the position fair.
//!
//! # Modules
//!
//! - **pricing**: Black-Scholes call price and delta, market and contract value types
//! - **solver**: Multi-start bounded minimization for fair rates and fees
//! - **grid**: Loan-to-value × tenor grids with delta risk
//! - **quote**: Fixed-point quote tuples
//! - **config**: YAML configuration with environment interpolation
//! - **telemetry**: Tracing subscriber setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod grid;
pub mod pricing;
pub mod quote;
pub mod solver;
pub mod telemetry;

pub use error::PricingError;
pub use grid::{GridError, GridResult, PricingGrid, SolveTarget};
pub use pricing::{ContractTerms, MarketAssumptions, call_delta, call_price};
pub use quote::{QuoteEncoder, QuoteError, QuoteTuple};
pub use solver::{FeeSolver, RateSolver, SolveOutcome, solve_fair_fee, solve_fair_rate};
