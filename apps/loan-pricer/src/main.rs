//! Loan Pricer Binary
//!
//! Solves the configured loan-to-value × tenor grid and writes a JSON
//! report to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin loan-pricer -- config.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `LOAN_PRICER_CONFIG`: config path when no argument is given (default: config.yaml)
//! - `RUST_LOG`: log filter, overrides `observability.logging.level`

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use loan_pricer::config::{Config, DEFAULT_CONFIG_PATH, load_config};
use loan_pricer::grid::{
    CellQuote, GridResult, PricingGrid, SolveTarget, format_ltv_label, format_tenor_label,
};
use loan_pricer::telemetry::init_tracing;

/// Environment variable naming the config file.
const CONFIG_PATH_ENV: &str = "LOAN_PRICER_CONFIG";

/// JSON report written to stdout.
#[derive(Debug, Serialize)]
struct Report<'a> {
    solve_for: SolveTarget,
    spot: f64,
    volatility: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
    ltvs: Vec<String>,
    tenors: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
    delta_risk: Vec<Vec<Option<f64>>>,
    quotes: &'a [CellQuote],
}

impl<'a> Report<'a> {
    fn new(config: &Config, result: &GridResult, quotes: &'a [CellQuote]) -> Self {
        Self {
            solve_for: result.target(),
            spot: config.market.spot,
            volatility: config.market.volatility,
            risk_free_rate: config.market.risk_free_rate,
            dividend_yield: config.market.dividend_yield,
            ltvs: result
                .spec()
                .ltvs()
                .iter()
                .map(|&ltv| format_ltv_label(ltv))
                .collect(),
            tenors: result
                .spec()
                .tenor_days()
                .iter()
                .map(|&days| format_tenor_label(days))
                .collect(),
            values: result.values(),
            delta_risk: result.delta_risk(),
            quotes,
        }
    }
}

fn main() -> Result<()> {
    load_dotenv();

    let path = config_path();
    let config = load_config(Some(path.as_str()))
        .with_context(|| format!("Failed to load config from {path}"))?;

    init_tracing(&config.observability.logging)
        .map_err(|e| anyhow!("Failed to initialize tracing: {e}"))?;

    tracing::info!(
        config = %path,
        solve_for = ?config.grid.solve_for,
        spot = config.market.spot,
        volatility = config.market.volatility,
        "Configuration loaded"
    );

    let market = config.market.assumptions()?;
    let encoder = config.quote.encoder()?;
    let grid = PricingGrid::new(config.grid.spec()?, config.solver)
        .with_reference_spot(config.grid.reference_spot)
        .with_min_parallel_cells(config.grid.min_parallel_cells);

    let result = grid.solve(config.grid.solve_for, &market)?;
    let quotes = result.quotes(&encoder, market.spot)?;

    let report = Report::new(&config, &result, &quotes);
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!(
        solved = result.solved_count(),
        cells = result.cells().len(),
        quotes = quotes.len(),
        "Report written"
    );
    Ok(())
}

/// Config path from the first argument, then the environment, then the default.
fn config_path() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
