//! Symbol universes and skip-and-continue batch operations.
//!
//! A batch never aborts because one symbol has no data or too little
//! history; such symbols are recorded as skipped and logged.

use crate::domain::analysis::{AnalysisConfig, AnalysisResult, analyze_instrument};
use crate::domain::error::RegimeLabError;
use crate::domain::metrics::{InstrumentMetrics, compute_instrument_metrics};
use crate::domain::price::{Lookback, PriceSeries};
use crate::ports::price_port::PriceHistoryPort;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("invalid symbol: {0:?}")]
    InvalidSymbol(String),
}

impl From<UniverseError> for RegimeLabError {
    fn from(err: UniverseError) -> Self {
        RegimeLabError::InvalidInput {
            reason: err.to_string(),
        }
    }
}

/// Trim and uppercase `raw`; append `default_suffix` when the symbol has no
/// exchange suffix of its own.
pub fn normalize_symbol(raw: &str, default_suffix: &str) -> Result<String, UniverseError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(UniverseError::EmptyToken);
    }
    if symbol
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '&' | '^' | '_')))
    {
        return Err(UniverseError::InvalidSymbol(raw.to_string()));
    }

    let suffix = default_suffix.trim().to_uppercase();
    if suffix.is_empty() || symbol.contains('.') {
        return Ok(symbol);
    }
    if suffix.starts_with('.') {
        Ok(format!("{symbol}{suffix}"))
    } else {
        Ok(format!("{symbol}.{suffix}"))
    }
}

/// Parse a comma-separated list. Rejects empty tokens and duplicates after
/// normalization.
pub fn parse_symbols(input: &str, default_suffix: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = normalize_symbol(token, default_suffix)?;
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData { reason: String },
    InsufficientHistory { observations: usize, minimum: usize },
    InvalidData { reason: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData { reason } => write!(f, "no data ({reason})"),
            SkipReason::InsufficientHistory {
                observations,
                minimum,
            } => write!(f, "only {observations} observations, minimum {minimum}"),
            SkipReason::InvalidData { reason } => write!(f, "invalid data ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

impl SkippedSymbol {
    pub fn from_error(symbol: &str, err: &RegimeLabError) -> Self {
        let reason = match err {
            RegimeLabError::InsufficientHistory {
                observations,
                minimum,
                ..
            } => SkipReason::InsufficientHistory {
                observations: *observations,
                minimum: *minimum,
            },
            RegimeLabError::DataUnavailable { reason, .. } => SkipReason::NoData {
                reason: reason.clone(),
            },
            RegimeLabError::InvalidSeries { reason, .. } => SkipReason::InvalidData {
                reason: reason.clone(),
            },
            other => SkipReason::NoData {
                reason: other.to_string(),
            },
        };
        Self {
            symbol: symbol.to_string(),
            reason,
        }
    }
}

/// Results of a batch, in input order, plus the symbols that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    pub results: Vec<T>,
    pub skipped: Vec<SkippedSymbol>,
}

impl<T> BatchOutcome<T> {
    pub fn attempted(&self) -> usize {
        self.results.len() + self.skipped.len()
    }
}

/// Run `op` over every symbol. Skippable errors are logged and recorded;
/// any other error aborts the batch.
pub fn run_batch<T, F>(symbols: &[String], mut op: F) -> Result<BatchOutcome<T>, RegimeLabError>
where
    F: FnMut(&str) -> Result<T, RegimeLabError>,
{
    let mut results = Vec::with_capacity(symbols.len());
    let mut skipped = Vec::new();

    for symbol in symbols {
        match op(symbol) {
            Ok(value) => {
                debug!(%symbol, "ok");
                results.push(value);
            }
            Err(e) if e.is_skippable() => {
                warn!(%symbol, error = %e, "skipping symbol");
                skipped.push(SkippedSymbol::from_error(symbol, &e));
            }
            Err(e) => return Err(e),
        }
    }

    if !skipped.is_empty() {
        warn!(
            processed = results.len(),
            total = symbols.len(),
            "some symbols were skipped"
        );
    }

    Ok(BatchOutcome { results, skipped })
}

pub fn analyze_universe(
    port: &dyn PriceHistoryPort,
    symbols: &[String],
    config: &AnalysisConfig,
) -> Result<BatchOutcome<AnalysisResult>, RegimeLabError> {
    run_batch(symbols, |symbol| analyze_instrument(port, symbol, config))
}

pub fn metrics_universe(
    port: &dyn PriceHistoryPort,
    symbols: &[String],
    lookback: Lookback,
    risk_free_rate: f64,
    min_observations: usize,
) -> Result<BatchOutcome<InstrumentMetrics>, RegimeLabError> {
    run_batch(symbols, |symbol| {
        compute_instrument_metrics(port, symbol, lookback, risk_free_rate, min_observations)
    })
}

/// Price series for every symbol, for curve simulation.
pub fn fetch_universe(
    port: &dyn PriceHistoryPort,
    symbols: &[String],
    lookback: Lookback,
) -> Result<BatchOutcome<PriceSeries>, RegimeLabError> {
    run_batch(symbols, |symbol| port.fetch_price_history(symbol, lookback))
}
