//! Point-in-time regime analysis of one instrument.

use crate::domain::error::RegimeLabError;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::price::{Lookback, PriceSeries};
use crate::domain::regime::{ClassifierInputs, RegimeConfig, RegimeLabel, classify};
use crate::ports::price_port::PriceHistoryPort;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub regime: RegimeConfig,
    pub lookback: Lookback,
    pub min_observations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            regime: RegimeConfig::default(),
            lookback: Lookback::Years(2),
            min_observations: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub date: NaiveDate,
    pub price: f64,
    pub rsi: f64,
    pub regime: RegimeLabel,
    pub confidence: f64,
    pub high_risk: bool,
    pub explanation: Vec<String>,
}

/// Classify the most recent observation of `series`.
pub fn analyze_series(
    series: &PriceSeries,
    config: &RegimeConfig,
) -> Result<AnalysisResult, RegimeLabError> {
    let frame = IndicatorFrame::compute(series, config.ma_window, config.rsi_window);
    let last = frame.last().ok_or_else(|| RegimeLabError::DataUnavailable {
        symbol: series.symbol().to_string(),
        reason: "empty series".into(),
    })?;

    if !last.is_defined() {
        return Err(RegimeLabError::InsufficientHistory {
            symbol: series.symbol().to_string(),
            observations: series.len(),
            minimum: IndicatorFrame::warmup(config.ma_window, config.rsi_window),
        });
    }

    let inputs = ClassifierInputs::from_point(last)?;
    let classification = classify(&inputs, config);

    Ok(AnalysisResult {
        symbol: series.symbol().to_string(),
        date: last.date,
        price: inputs.close,
        rsi: inputs.rsi,
        regime: classification.regime,
        confidence: classification.confidence,
        high_risk: classification.high_risk,
        explanation: classification.explanation,
    })
}

pub fn analyze_instrument(
    port: &dyn PriceHistoryPort,
    symbol: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, RegimeLabError> {
    let series = port.fetch_price_history(symbol, config.lookback)?;
    let minimum = config
        .min_observations
        .max(IndicatorFrame::warmup(config.regime.ma_window, config.regime.rsi_window));

    if series.len() < minimum {
        return Err(RegimeLabError::InsufficientHistory {
            symbol: symbol.to_string(),
            observations: series.len(),
            minimum,
        });
    }

    analyze_series(&series, &config.regime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;

    fn make_series(values: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        PriceSeries::new("STEP.NS", points).unwrap()
    }

    #[test]
    fn step_up_is_bullish() {
        let mut closes = vec![100.0; 30];
        closes.extend(vec![110.0; 10]);
        let result = analyze_series(&make_series(&closes), &RegimeConfig::default()).unwrap();

        assert_eq!(result.symbol, "STEP.NS");
        assert_eq!(result.regime, RegimeLabel::Bullish);
        assert_eq!(result.rsi, 100.0);
        assert_eq!(result.confidence, 100.0);
        assert!(!result.high_risk);
        assert_eq!(result.price, 110.0);
        assert_eq!(result.date, NaiveDate::from_ymd_opt(2024, 2, 9).unwrap());
    }

    #[test]
    fn constant_series_is_sideways() {
        let result = analyze_series(&make_series(&[100.0; 40]), &RegimeConfig::default()).unwrap();
        assert_eq!(result.regime, RegimeLabel::Sideways);
    }

    #[test]
    fn short_series_is_insufficient() {
        let err = analyze_series(&make_series(&[100.0; 10]), &RegimeConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            RegimeLabError::InsufficientHistory {
                observations: 10,
                minimum: 20,
                ..
            }
        ));
    }

    #[test]
    fn empty_series_is_unavailable() {
        let err = analyze_series(&make_series(&[]), &RegimeConfig::default()).unwrap_err();
        assert!(matches!(err, RegimeLabError::DataUnavailable { .. }));
    }
}
