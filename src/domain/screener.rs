//! Filter analysed instruments by regime, RSI band and risk flag.

use crate::domain::analysis::{AnalysisConfig, AnalysisResult};
use crate::domain::error::RegimeLabError;
use crate::domain::regime::RegimeLabel;
use crate::domain::universe::{BatchOutcome, analyze_universe};
use crate::ports::price_port::PriceHistoryPort;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenFilter {
    /// Accepted regimes. Empty accepts every regime.
    pub states: Vec<RegimeLabel>,
    pub rsi_min: f64,
    pub rsi_max: f64,
    pub include_high_risk: bool,
}

impl Default for ScreenFilter {
    fn default() -> Self {
        Self {
            states: vec![RegimeLabel::Bullish],
            rsi_min: 40.0,
            rsi_max: 70.0,
            include_high_risk: false,
        }
    }
}

impl ScreenFilter {
    pub fn matches(&self, result: &AnalysisResult) -> bool {
        (self.states.is_empty() || self.states.contains(&result.regime))
            && result.rsi >= self.rsi_min
            && result.rsi <= self.rsi_max
            && (self.include_high_risk || !result.high_risk)
    }
}

pub fn screen<'a>(results: &'a [AnalysisResult], filter: &ScreenFilter) -> Vec<&'a AnalysisResult> {
    results.iter().filter(|r| filter.matches(r)).collect()
}

/// Analyse every symbol and keep the matches. Symbols without usable data
/// are skipped.
pub fn screen_watchlist(
    port: &dyn PriceHistoryPort,
    symbols: &[String],
    config: &AnalysisConfig,
    filter: &ScreenFilter,
) -> Result<BatchOutcome<AnalysisResult>, RegimeLabError> {
    let outcome = analyze_universe(port, symbols, config)?;
    let analysed = outcome.results.len();
    let results: Vec<AnalysisResult> = outcome
        .results
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect();
    info!(analysed, matched = results.len(), "screen complete");

    Ok(BatchOutcome {
        results,
        skipped: outcome.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn result(symbol: &str, regime: RegimeLabel, rsi: f64, high_risk: bool) -> AnalysisResult {
        AnalysisResult {
            symbol: symbol.into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            price: 100.0,
            rsi,
            regime,
            confidence: (rsi - 50.0).abs() * 2.0,
            high_risk,
            explanation: Vec::new(),
        }
    }

    #[test]
    fn default_filter() {
        let results = vec![
            result("A", RegimeLabel::Bullish, 65.0, false),
            result("B", RegimeLabel::Bullish, 75.0, false),
            result("C", RegimeLabel::Bearish, 50.0, false),
            result("D", RegimeLabel::Bullish, 56.0, true),
        ];
        let hits = screen(&results, &ScreenFilter::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol, "A");
    }

    #[test]
    fn rsi_bounds_are_inclusive() {
        let filter = ScreenFilter::default();
        assert!(filter.matches(&result("A", RegimeLabel::Bullish, 70.0, false)));
        assert!(filter.matches(&result("A", RegimeLabel::Bullish, 40.0, false)));
    }

    #[test]
    fn empty_states_accept_all_and_high_risk_opt_in() {
        let filter = ScreenFilter {
            states: Vec::new(),
            rsi_min: 0.0,
            rsi_max: 100.0,
            include_high_risk: true,
        };
        let results = vec![
            result("A", RegimeLabel::Bearish, 20.0, false),
            result("B", RegimeLabel::Sideways, 51.0, true),
        ];
        assert_eq!(screen(&results, &filter).len(), 2);
    }
}
