//! Option pricing for zero-liquidation loans.
//!
//! This module provides:
//! - Black-Scholes European call price and delta
//! - Validated market assumptions and loan terms
//!
//! # Example
//!
//! ```
//! use loan_pricer::pricing::{ContractTerms, MarketAssumptions, call_price};
//!
//! let price = call_price(100.0, 100.0, 0.5, 30.0 / 365.0, 0.0, 0.0);
//! assert!(price > 0.0 && price < 100.0);
//!
//! let market = MarketAssumptions::new(100.0, 0.5, 0.0, 0.0)?;
//! let terms = ContractTerms::new(0.7, 30.0 / 365.0)?;
//! let protection = market.call_price(terms.option(terms.loan_amount(market.spot)));
//! assert!(protection > 30.0);
//! # Ok::<(), loan_pricer::PricingError>(())
//! ```

mod black_scholes;
mod market;

pub use black_scholes::{call_delta, call_price, d1, norm_cdf};
pub use market::{ContractTerms, MarketAssumptions, OptionSpec};
