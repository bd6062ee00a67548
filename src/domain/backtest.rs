//! Walk-forward regime backtest.
//!
//! For each eligible index i the classifier sees only closes `0..=i`; the
//! forward returns at each horizon are measured from close[i]. The realized
//! regime comes from the shortest horizon's return.
//!
//! Indicators are computed once over the full series. Each indicator value
//! depends only on its own prefix, so this is equivalent to recomputing on
//! `series.prefix(i + 1)` at every step.

use crate::domain::error::RegimeLabError;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::price::{Lookback, PriceSeries};
use crate::domain::regime::{ClassifierInputs, RegimeConfig, RegimeLabel, classify};
use crate::domain::universe::{BatchOutcome, SkippedSymbol, run_batch};
use crate::ports::price_port::PriceHistoryPort;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Forward horizons in trading days.
    pub horizons: [usize; 3],
    /// First index evaluated.
    pub warm_up: usize,
    /// Forward return (%) above which the realized regime is Bullish.
    pub bullish_threshold: f64,
    /// Forward return (%) below which the realized regime is Bearish.
    pub bearish_threshold: f64,
    /// Minimum series length for `backtest_instrument` to try at all.
    pub min_observations: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            horizons: [5, 10, 20],
            warm_up: 60,
            bullish_threshold: 1.0,
            bearish_threshold: -1.0,
            min_observations: 80,
        }
    }
}

impl BacktestConfig {
    pub fn max_horizon(&self) -> usize {
        self.horizons.iter().copied().max().unwrap_or(0)
    }

    /// Position in `horizons` of the shortest horizon.
    pub fn shortest_horizon_index(&self) -> usize {
        self.horizons
            .iter()
            .enumerate()
            .min_by_key(|(_, h)| **h)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn realized_regime(&self, forward_return_pct: f64) -> RegimeLabel {
        if forward_return_pct > self.bullish_threshold {
            RegimeLabel::Bullish
        } else if forward_return_pct < self.bearish_threshold {
            RegimeLabel::Bearish
        } else {
            RegimeLabel::Sideways
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub predicted: RegimeLabel,
    pub realized: RegimeLabel,
    /// Forward % returns, aligned with `BacktestConfig::horizons`.
    pub forward_returns: [f64; 3],
}

/// Mean forward returns and hit rate for one predicted regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeStats {
    pub regime: RegimeLabel,
    pub count: usize,
    pub mean_returns: [f64; 3],
    pub hit_rate: f64,
}

/// Rows: predicted regime, columns: realized regime, in `RegimeLabel::ALL` order.
pub type ConfusionMatrix = [[usize; 3]; 3];

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub horizons: [usize; 3],
    /// Only regimes that were predicted at least once, in `RegimeLabel::ALL` order.
    pub per_regime: Vec<RegimeStats>,
    pub confusion: ConfusionMatrix,
    pub total: usize,
    pub accuracy: f64,
}

impl BacktestSummary {
    pub fn from_records(records: &[BacktestRecord], horizons: [usize; 3]) -> Self {
        let mut confusion: ConfusionMatrix = [[0; 3]; 3];
        let mut sums = [[0.0_f64; 3]; 3];

        for record in records {
            let p = record.predicted.index();
            confusion[p][record.realized.index()] += 1;
            for (sum, r) in sums[p].iter_mut().zip(record.forward_returns) {
                *sum += r;
            }
        }

        let per_regime = RegimeLabel::ALL
            .iter()
            .filter_map(|&regime| {
                let p = regime.index();
                let count: usize = confusion[p].iter().sum();
                if count == 0 {
                    return None;
                }
                Some(RegimeStats {
                    regime,
                    count,
                    mean_returns: sums[p].map(|s| s / count as f64),
                    hit_rate: confusion[p][p] as f64 / count as f64,
                })
            })
            .collect();

        let total = records.len();
        let correct: usize = (0..3).map(|i| confusion[i][i]).sum();
        let accuracy = if total > 0 {
            correct as f64 / total as f64
        } else {
            0.0
        };

        Self {
            horizons,
            per_regime,
            confusion,
            total,
            accuracy,
        }
    }

    pub fn stats_for(&self, regime: RegimeLabel) -> Option<&RegimeStats> {
        self.per_regime.iter().find(|s| s.regime == regime)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub symbol: String,
    pub records: Vec<BacktestRecord>,
    pub summary: BacktestSummary,
}

impl BacktestReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Replay the classifier over `series`. Never fails: a series too short for
/// any eligible index yields an empty report.
pub fn run_backtest(
    series: &PriceSeries,
    regime_config: &RegimeConfig,
    config: &BacktestConfig,
) -> BacktestReport {
    let frame = IndicatorFrame::compute(series, regime_config.ma_window, regime_config.rsi_window);
    let closes = series.closes();
    let max_horizon = config.max_horizon();
    let shortest = config.shortest_horizon_index();

    let mut records = Vec::new();

    // last eligible index: len - max_horizon - 1
    let end = closes.len().saturating_sub(max_horizon);
    for i in config.warm_up..end {
        let Ok(inputs) = ClassifierInputs::from_point(&frame.points[i]) else {
            continue;
        };
        let predicted = classify(&inputs, regime_config).regime;

        let base = closes[i];
        let forward_returns = config.horizons.map(|h| (closes[i + h] - base) / base * 100.0);
        let realized = config.realized_regime(forward_returns[shortest]);

        records.push(BacktestRecord {
            symbol: series.symbol().to_string(),
            date: frame.points[i].date,
            predicted,
            realized,
            forward_returns,
        });
    }

    let summary = BacktestSummary::from_records(&records, config.horizons);

    BacktestReport {
        symbol: series.symbol().to_string(),
        records,
        summary,
    }
}

/// Prediction at `index` computed from the prefix `0..=index` only.
pub fn predict_at(
    series: &PriceSeries,
    index: usize,
    regime_config: &RegimeConfig,
) -> Option<RegimeLabel> {
    if index >= series.len() {
        return None;
    }
    let prefix = series.prefix(index + 1);
    let frame = IndicatorFrame::compute(&prefix, regime_config.ma_window, regime_config.rsi_window);
    let inputs = ClassifierInputs::from_point(frame.last()?).ok()?;
    Some(classify(&inputs, regime_config).regime)
}

/// Fetch and backtest one symbol. A series that is too short, or one that
/// yields no eligible records, is `InsufficientHistory`.
pub fn backtest_instrument(
    port: &dyn PriceHistoryPort,
    symbol: &str,
    lookback: Lookback,
    regime_config: &RegimeConfig,
    config: &BacktestConfig,
) -> Result<BacktestReport, RegimeLabError> {
    let series = port.fetch_price_history(symbol, lookback)?;
    let minimum = config
        .min_observations
        .max(config.warm_up + config.max_horizon() + 1);

    if series.len() < minimum {
        return Err(RegimeLabError::InsufficientHistory {
            symbol: symbol.to_string(),
            observations: series.len(),
            minimum,
        });
    }

    let report = run_backtest(&series, regime_config, config);
    if report.is_empty() {
        return Err(RegimeLabError::InsufficientHistory {
            symbol: symbol.to_string(),
            observations: series.len(),
            minimum,
        });
    }
    Ok(report)
}

/// Backtest results over many symbols with one combined summary.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioBacktest {
    pub reports: Vec<BacktestReport>,
    /// Summary over every record of every symbol.
    pub summary: BacktestSummary,
    pub skipped: Vec<SkippedSymbol>,
}

impl PortfolioBacktest {
    pub fn records(&self) -> impl Iterator<Item = &BacktestRecord> {
        self.reports.iter().flat_map(|r| r.records.iter())
    }
}

/// Backtest every symbol, skipping those without usable history. Errors
/// other than missing or short data abort the batch.
pub fn backtest_portfolio(
    port: &dyn PriceHistoryPort,
    symbols: &[String],
    lookback: Lookback,
    regime_config: &RegimeConfig,
    config: &BacktestConfig,
) -> Result<PortfolioBacktest, RegimeLabError> {
    let BatchOutcome {
        results: reports,
        skipped,
    } = run_batch(symbols, |symbol| {
        let report = backtest_instrument(port, symbol, lookback, regime_config, config)?;
        info!(%symbol, records = report.records.len(), "backtested");
        Ok(report)
    })?;

    let all: Vec<BacktestRecord> = reports
        .iter()
        .flat_map(|r| r.records.iter().cloned())
        .collect();
    let summary = BacktestSummary::from_records(&all, config.horizons);

    Ok(PortfolioBacktest {
        reports,
        summary,
        skipped,
    })
}
