//! Risk and performance metrics over a price series.
//!
//! Every function is pure and resolves degenerate inputs (fewer than two
//! observations, zero deviation, non-finite intermediates) to 0.

use crate::domain::error::RegimeLabError;
use crate::domain::price::{Lookback, PriceSeries};
use crate::ports::price_port::PriceHistoryPort;
use chrono::NaiveDate;
use serde::Serialize;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentMetrics {
    pub symbol: String,
    pub cagr: f64,
    pub volatility: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
    pub calmar: f64,
    pub latest_price: f64,
}

impl InstrumentMetrics {
    pub fn compute(series: &PriceSeries, risk_free_rate: f64) -> Self {
        let prices = series.closes();
        let returns = daily_returns(&prices);
        let cagr = cagr(series);
        let max_drawdown = max_drawdown(&prices);

        InstrumentMetrics {
            symbol: series.symbol().to_string(),
            cagr,
            volatility: volatility(&returns),
            sharpe: sharpe_ratio(&returns, risk_free_rate),
            sortino: sortino_ratio(&returns, risk_free_rate),
            max_drawdown,
            calmar: calmar_ratio(cagr, max_drawdown),
            latest_price: series.last().map(|p| p.close).unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    pub risk_free_rate: f64,
    pub lookback: Lookback,
    pub min_observations: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.065,
            lookback: Lookback::Years(3),
            min_observations: 30,
        }
    }
}

/// Fetch `symbol` over `lookback` and compute its metrics.
pub fn compute_instrument_metrics(
    port: &dyn PriceHistoryPort,
    symbol: &str,
    lookback: Lookback,
    risk_free_rate: f64,
    min_observations: usize,
) -> Result<InstrumentMetrics, RegimeLabError> {
    let series = port.fetch_price_history(symbol, lookback)?;
    if series.len() < min_observations.max(2) {
        return Err(RegimeLabError::InsufficientHistory {
            symbol: symbol.to_string(),
            observations: series.len(),
            minimum: min_observations.max(2),
        });
    }
    Ok(InstrumentMetrics::compute(&series, risk_free_rate))
}

/// Simple percentage change between consecutive prices.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| {
            if w[0] != 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

/// (last / first)^(365.25 / days) - 1
pub fn cagr(series: &PriceSeries) -> f64 {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => {
            cagr_between(first.date, first.close, last.date, last.close)
        }
        _ => 0.0,
    }
}

pub fn cagr_between(start: NaiveDate, first: f64, end: NaiveDate, last: f64) -> f64 {
    let days = (end - start).num_days();
    if days <= 0 || first <= 0.0 {
        return 0.0;
    }
    let growth = (last / first).powf(DAYS_PER_YEAR / days as f64) - 1.0;
    if growth.is_finite() { growth } else { 0.0 }
}

/// stdev(daily returns) * sqrt(252)
pub fn volatility(returns: &[f64]) -> f64 {
    sample_stddev(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// (mean * 252 - rf) / volatility
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let vol = volatility(returns);
    let excess = annualized_excess(returns, risk_free_rate);
    ratio(excess, vol)
}

/// (mean * 252 - rf) / downside volatility, using only negative returns.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    if downside.is_empty() {
        return 0.0;
    }
    let downside_vol = sample_stddev(&downside) * TRADING_DAYS_PER_YEAR.sqrt();
    let excess = annualized_excess(returns, risk_free_rate);
    ratio(excess, downside_vol)
}

/// min((price - running_max) / running_max). Always <= 0.
pub fn max_drawdown(prices: &[f64]) -> f64 {
    let Some(&first) = prices.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &price in prices {
        if price > peak {
            peak = price;
        }
        if peak > 0.0 {
            let dd = (price - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    if max_dd.is_finite() { max_dd } else { 0.0 }
}

/// CAGR / |max drawdown|
pub fn calmar_ratio(cagr: f64, max_drawdown: f64) -> f64 {
    ratio(cagr, max_drawdown.abs())
}

fn annualized_excess(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    mean * TRADING_DAYS_PER_YEAR - risk_free_rate
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if !numerator.is_finite() || !denominator.is_finite() || denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// Sample standard deviation (n - 1). 0 for fewer than two values.
fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();
    if stddev.is_finite() { stddev } else { 0.0 }
}
