//! Tracing Setup
//!
//! Installs a `tracing-subscriber` formatter writing to stderr, so the JSON
//! report on stdout stays machine-readable.
//!
//! # Configuration
//!
//! - `RUST_LOG`: overrides `observability.logging.level` when set
//! - `observability.logging.format`: `json` (default) or `pretty`
//!
//! # Usage
//!
//! ```rust,ignore
//! use loan_pricer::config::LoggingConfig;
//! use loan_pricer::telemetry::init_tracing;
//!
//! init_tracing(&LoggingConfig::default())?;
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` when present, else the configured level.
///
/// An unparsable configured level falls back to `info`.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = env_filter(config);
    let span_events = if config.include_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.format == "pretty" {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .with_span_events(span_events)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(config.include_spans)
            .with_span_list(config.include_spans)
            .with_span_events(span_events)
            .with_writer(std::io::stderr)
            .try_init()
    }
}
