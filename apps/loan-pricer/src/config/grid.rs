//! Loan-to-value × tenor grid configuration.

use serde::{Deserialize, Serialize};

use crate::grid::{
    DEFAULT_MIN_PARALLEL_CELLS, DEFAULT_REFERENCE_SPOT, GridError, GridSpec, SolveTarget,
};

/// Grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Quantity to solve for (`apr` or `upfront_fee`).
    #[serde(default)]
    pub solve_for: SolveTarget,
    /// Loan-to-value labels such as `"70%"`.
    #[serde(default = "default_ltvs")]
    pub ltvs: Vec<String>,
    /// Tenor labels such as `"30d"`.
    #[serde(default = "default_tenors")]
    pub tenors: Vec<String>,
    /// Normalized spot the cells are solved at.
    #[serde(default = "default_reference_spot")]
    pub reference_spot: f64,
    /// Grids with fewer cells are solved sequentially.
    #[serde(default = "default_min_parallel_cells")]
    pub min_parallel_cells: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            solve_for: SolveTarget::default(),
            ltvs: default_ltvs(),
            tenors: default_tenors(),
            reference_spot: default_reference_spot(),
            min_parallel_cells: default_min_parallel_cells(),
        }
    }
}

impl GridConfig {
    /// Parsed and sorted grid axes.
    pub fn spec(&self) -> Result<GridSpec, GridError> {
        GridSpec::from_labels(self.ltvs.as_slice(), self.tenors.as_slice())
    }
}

fn default_ltvs() -> Vec<String> {
    ["50%", "60%", "70%"].map(String::from).to_vec()
}

fn default_tenors() -> Vec<String> {
    ["30d", "60d", "90d"].map(String::from).to_vec()
}

const fn default_reference_spot() -> f64 {
    DEFAULT_REFERENCE_SPOT
}

const fn default_min_parallel_cells() -> usize {
    DEFAULT_MIN_PARALLEL_CELLS
}
