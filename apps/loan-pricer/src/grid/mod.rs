//! Pricing Grid
//!
//! Solves fair rates or fees over a loan-to-value × tenor grid and derives
//! the lender's residual delta exposure for every solved cell.
//!
//! Fair rates and fees are scale-free in spot, so cells are solved at a
//! normalized reference spot. The market spot only enters when cells are
//! encoded into quotes.
//!
//! # Example
//!
//! ```
//! use loan_pricer::grid::{GridSpec, PricingGrid, SolveTarget};
//! use loan_pricer::pricing::MarketAssumptions;
//! use loan_pricer::solver::SolverConfig;
//!
//! let spec = GridSpec::from_labels(&["50%", "70%"], &["30d"]).unwrap();
//! let grid = PricingGrid::new(spec, SolverConfig::default());
//! let market = MarketAssumptions::new(2000.0, 0.5, 0.0, 0.0).unwrap();
//!
//! let result = grid.solve(SolveTarget::InterestRate, &market).unwrap();
//! assert_eq!(result.cells().len(), 2);
//! ```

mod labels;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub use labels::{GridSpec, parse_ltv_label, parse_tenor_label};

use crate::error::PricingError;
use crate::pricing::{ContractTerms, MarketAssumptions, call_delta};
use crate::quote::{QuoteEncoder, QuoteError, QuoteTuple};
use crate::solver::{FeeSolver, RateSolver, SolveOutcome, SolverConfig};

/// Days per year used to convert tenor labels.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Default normalized spot for grid solves.
pub const DEFAULT_REFERENCE_SPOT: f64 = 100.0;

/// Default cell count from which grids are solved in parallel.
pub const DEFAULT_MIN_PARALLEL_CELLS: usize = 4;

// ============================================================================
// Error Types
// ============================================================================

/// Errors from grid construction and quoting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Loan-to-value label could not be parsed.
    #[error("Invalid loan-to-value label: '{0}'")]
    InvalidLtvLabel(String),

    /// Tenor label could not be parsed.
    #[error("Invalid tenor label: '{0}'")]
    InvalidTenorLabel(String),

    /// An axis has no entries.
    #[error("Grid axis '{0}' is empty")]
    EmptyAxis(&'static str),

    /// Market or contract inputs are invalid.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A solved cell could not be encoded.
    #[error(transparent)]
    Quote(#[from] QuoteError),
}

// ============================================================================
// Grid Types
// ============================================================================

/// Quantity solved in every cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveTarget {
    /// Annualized interest rate.
    #[default]
    #[serde(rename = "apr")]
    InterestRate,
    /// Upfront fee fraction of the collateral.
    UpfrontFee,
}

/// One solved grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridCell {
    /// Loan-to-value fraction.
    pub ltv: f64,
    /// Tenor in days.
    pub tenor_days: u32,
    /// Solver outcome.
    pub outcome: SolveOutcome,
    /// Share of the collateral's spot exposure left with the lender.
    pub delta_risk: Option<f64>,
}

impl GridCell {
    /// Tenor in years.
    #[must_use]
    pub fn tenor_years(&self) -> f64 {
        f64::from(self.tenor_days) / DAYS_PER_YEAR
    }
}

/// A quote for one solved cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellQuote {
    /// Loan-to-value label, e.g. `"70%"`.
    pub ltv: String,
    /// Tenor label, e.g. `"30d"`.
    pub tenor: String,
    /// Encoded quote.
    pub quote: QuoteTuple,
}

/// Result of solving a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridResult {
    target: SolveTarget,
    spec: GridSpec,
    cells: Vec<GridCell>,
}

impl GridResult {
    /// Solved quantity.
    #[must_use]
    pub const fn target(&self) -> SolveTarget {
        self.target
    }

    /// Grid axes.
    #[must_use]
    pub const fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell at the given LTV row and tenor column.
    #[must_use]
    pub fn cell(&self, ltv_index: usize, tenor_index: usize) -> Option<&GridCell> {
        let columns = self.spec.tenor_days().len();
        if tenor_index >= columns {
            return None;
        }
        self.cells.get(ltv_index * columns + tenor_index)
    }

    /// Number of solved cells.
    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.outcome.is_solved()).count()
    }

    /// Solved values as LTV rows × tenor columns, `None` where unsolved.
    #[must_use]
    pub fn values(&self) -> Vec<Vec<Option<f64>>> {
        self.matrix(|cell| cell.outcome.value())
    }

    /// Delta risk as LTV rows × tenor columns, `None` where unsolved.
    #[must_use]
    pub fn delta_risk(&self) -> Vec<Vec<Option<f64>>> {
        self.matrix(|cell| cell.delta_risk)
    }

    fn matrix(&self, field: impl Fn(&GridCell) -> Option<f64>) -> Vec<Vec<Option<f64>>> {
        self.cells
            .chunks(self.spec.tenor_days().len().max(1))
            .map(|row| row.iter().map(&field).collect())
            .collect()
    }

    /// Encode every solved cell at the market spot.
    ///
    /// Rate cells carry a zero fee and fee cells a zero rate. Unsolved cells
    /// are skipped.
    pub fn quotes(&self, encoder: &QuoteEncoder, spot: f64) -> Result<Vec<CellQuote>, GridError> {
        let mut quotes = Vec::with_capacity(self.cells.len());

        for cell in &self.cells {
            let ltv = format_ltv_label(cell.ltv);
            let tenor = format_tenor_label(cell.tenor_days);

            let Some(value) = cell.outcome.value() else {
                warn!(ltv = %ltv, tenor = %tenor, "No fair value for grid cell, skipping quote");
                continue;
            };
            let (rate, fee) = match self.target {
                SolveTarget::InterestRate => (value, 0.0),
                SolveTarget::UpfrontFee => (0.0, value),
            };

            let quote = encoder.encode(cell.ltv, spot, cell.tenor_years(), rate, fee)?;
            quotes.push(CellQuote { ltv, tenor, quote });
        }
        Ok(quotes)
    }
}

/// Render an LTV fraction as a percent label.
#[must_use]
pub fn format_ltv_label(ltv: f64) -> String {
    format!("{}%", (ltv * 1e6).round() / 1e4)
}

/// Render a day count as a tenor label.
#[must_use]
pub fn format_tenor_label(days: u32) -> String {
    format!("{days}d")
}

// ============================================================================
// Pricing Grid
// ============================================================================

/// Solver for a loan-to-value × tenor grid.
#[derive(Debug, Clone)]
pub struct PricingGrid {
    spec: GridSpec,
    rate_solver: RateSolver,
    fee_solver: FeeSolver,
    reference_spot: f64,
    min_parallel_cells: usize,
}

impl PricingGrid {
    /// Create a grid solver with default reference spot and parallelism.
    #[must_use]
    pub const fn new(spec: GridSpec, solver: SolverConfig) -> Self {
        Self {
            spec,
            rate_solver: RateSolver::new(solver),
            fee_solver: FeeSolver::new(solver),
            reference_spot: DEFAULT_REFERENCE_SPOT,
            min_parallel_cells: DEFAULT_MIN_PARALLEL_CELLS,
        }
    }

    /// Solve at a different normalized spot.
    #[must_use]
    pub const fn with_reference_spot(mut self, reference_spot: f64) -> Self {
        self.reference_spot = reference_spot;
        self
    }

    /// Solve sequentially below this many cells.
    #[must_use]
    pub const fn with_min_parallel_cells(mut self, min_parallel_cells: usize) -> Self {
        self.min_parallel_cells = min_parallel_cells;
        self
    }

    /// Grid axes.
    #[must_use]
    pub const fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Solve every cell for `target` under `market`.
    ///
    /// The market spot is replaced by the reference spot; volatility, rate
    /// and yield are used as given.
    pub fn solve(
        &self,
        target: SolveTarget,
        market: &MarketAssumptions,
    ) -> Result<GridResult, GridError> {
        let market = market.validated()?.with_spot(self.reference_spot)?;
        let cells: Vec<(f64, u32)> = self.spec.cells().collect();

        info!(
            "Solving {:?} grid: {} LTVs x {} tenors at reference spot {}",
            target,
            self.spec.ltvs().len(),
            self.spec.tenor_days().len(),
            self.reference_spot
        );

        let solved: Result<Vec<GridCell>, PricingError> = if cells.len() >= self.min_parallel_cells
        {
            cells
                .par_iter()
                .map(|&(ltv, days)| self.solve_cell(target, &market, ltv, days))
                .collect()
        } else {
            cells
                .iter()
                .map(|&(ltv, days)| self.solve_cell(target, &market, ltv, days))
                .collect()
        };

        let result = GridResult {
            target,
            spec: self.spec.clone(),
            cells: solved?,
        };

        info!(
            "Grid complete: {}/{} cells solved",
            result.solved_count(),
            result.cells.len()
        );
        Ok(result)
    }

    fn solve_cell(
        &self,
        target: SolveTarget,
        market: &MarketAssumptions,
        ltv: f64,
        tenor_days: u32,
    ) -> Result<GridCell, PricingError> {
        let terms = ContractTerms::new(ltv, f64::from(tenor_days) / DAYS_PER_YEAR)?;
        let outcome = match target {
            SolveTarget::InterestRate => self.rate_solver.solve(market, &terms),
            SolveTarget::UpfrontFee => self.fee_solver.solve(market, &terms),
        };

        Ok(GridCell {
            ltv,
            tenor_days,
            outcome,
            delta_risk: outcome
                .value()
                .map(|value| delta_risk(target, market, &terms, value)),
        })
    }
}

/// Spot exposure the lender keeps after selling the embedded call.
///
/// For a rate the call is struck at the repayment amount; for a fee it is
/// struck at the loan amount and covers only the `1 − fee` share of the
/// collateral that is returned. The carry yield is ignored.
#[must_use]
pub fn delta_risk(
    target: SolveTarget,
    market: &MarketAssumptions,
    terms: &ContractTerms,
    value: f64,
) -> f64 {
    let (strike, share) = match target {
        SolveTarget::InterestRate => (terms.strike_for_rate(market.spot, value), 1.0),
        SolveTarget::UpfrontFee => (terms.loan_amount(market.spot), 1.0 - value),
    };
    let delta = call_delta(
        market.spot,
        strike,
        market.volatility,
        terms.tenor_years,
        market.risk_free_rate,
        0.0,
    );
    1.0 - share * delta
}
