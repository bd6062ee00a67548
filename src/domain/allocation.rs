//! Capital allocation across instruments and the simulated portfolio curve.
//!
//! Weights are percentages. After the strategy scores each instrument, every
//! weight is capped at `max_weight_pct` and the set is renormalized once to
//! sum to 100.

use crate::domain::error::RegimeLabError;
use crate::domain::metrics::{self, InstrumentMetrics};
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AllocationStrategy {
    EqualWeight,
    RiskAdjusted,
    MinimumVolatility,
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationStrategy::EqualWeight => write!(f, "equal"),
            AllocationStrategy::RiskAdjusted => write!(f, "risk-adjusted"),
            AllocationStrategy::MinimumVolatility => write!(f, "min-volatility"),
        }
    }
}

impl FromStr for AllocationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equal" | "equal-weight" => Ok(AllocationStrategy::EqualWeight),
            "risk-adjusted" | "sharpe" => Ok(AllocationStrategy::RiskAdjusted),
            "min-volatility" | "minimum-volatility" | "min-vol" => {
                Ok(AllocationStrategy::MinimumVolatility)
            }
            other => Err(format!("unknown allocation strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationConfig {
    pub strategy: AllocationStrategy,
    pub capital: f64,
    pub max_weight_pct: f64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            strategy: AllocationStrategy::RiskAdjusted,
            capital: 500_000.0,
            max_weight_pct: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub symbol: String,
    pub weight_pct: f64,
    pub capital: f64,
    pub shares: i64,
    pub price: f64,
}

impl Allocation {
    pub fn fraction(&self) -> f64 {
        self.weight_pct / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationPlan {
    pub strategy: AllocationStrategy,
    pub total_capital: f64,
    /// In the order of the input metrics.
    pub allocations: Vec<Allocation>,
}

impl AllocationPlan {
    pub fn get(&self, symbol: &str) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.symbol == symbol)
    }

    pub fn total_weight_pct(&self) -> f64 {
        self.allocations.iter().map(|a| a.weight_pct).sum()
    }

    pub fn fractions(&self) -> HashMap<&str, f64> {
        self.allocations
            .iter()
            .map(|a| (a.symbol.as_str(), a.fraction()))
            .collect()
    }
}

/// Raw strategy weights (%), before capping.
pub fn strategy_weights(metrics: &[InstrumentMetrics], strategy: AllocationStrategy) -> Vec<f64> {
    let n = metrics.len();
    if n == 0 {
        return Vec::new();
    }
    let equal = vec![100.0 / n as f64; n];

    let scores: Vec<f64> = match strategy {
        AllocationStrategy::EqualWeight => return equal,
        AllocationStrategy::RiskAdjusted => metrics
            .iter()
            .map(|m| finite_or_zero(m.sharpe).max(0.0) / safe_volatility_pct(m.volatility))
            .collect(),
        AllocationStrategy::MinimumVolatility => metrics
            .iter()
            .map(|m| 1.0 / safe_volatility_pct(m.volatility))
            .collect(),
    };

    let total: f64 = scores.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return equal;
    }
    scores.iter().map(|s| s / total * 100.0).collect()
}

/// Cap each weight at `max_pct`, then rescale once so the weights sum to 100.
pub fn cap_and_normalize(weights: &[f64], max_pct: f64) -> Vec<f64> {
    let capped: Vec<f64> = weights.iter().map(|w| w.clamp(0.0, max_pct)).collect();
    let total: f64 = capped.iter().sum();
    if total <= 0.0 {
        return capped;
    }
    capped.iter().map(|w| w / total * 100.0).collect()
}

pub fn build_allocation_plan(
    metrics: &[InstrumentMetrics],
    strategy: AllocationStrategy,
    total_capital: f64,
    max_weight_pct: f64,
) -> Result<AllocationPlan, RegimeLabError> {
    if metrics.is_empty() {
        return Err(RegimeLabError::InvalidInput {
            reason: "allocation needs at least one instrument".into(),
        });
    }
    if !(total_capital > 0.0) || !total_capital.is_finite() {
        return Err(RegimeLabError::InvalidInput {
            reason: format!("capital must be positive, got {total_capital}"),
        });
    }
    if !(max_weight_pct > 0.0 && max_weight_pct <= 100.0) {
        return Err(RegimeLabError::InvalidInput {
            reason: format!("max weight must be in (0, 100], got {max_weight_pct}"),
        });
    }

    let raw = strategy_weights(metrics, strategy);
    let weights = cap_and_normalize(&raw, max_weight_pct);

    let allocations = metrics
        .iter()
        .zip(weights)
        .map(|(m, weight_pct)| {
            let capital = (weight_pct / 100.0 * total_capital).round_ties_even();
            let shares = if m.latest_price > 0.0 {
                (capital / m.latest_price).round_ties_even() as i64
            } else {
                0
            };
            Allocation {
                symbol: m.symbol.clone(),
                weight_pct,
                capital,
                shares,
                price: m.latest_price,
            }
        })
        .collect();

    Ok(AllocationPlan {
        strategy,
        total_capital,
        allocations,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PortfolioCurve {
    pub points: Vec<EquityPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRiskSummary {
    pub cagr: f64,
    pub volatility: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
}

impl PortfolioCurve {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn risk_summary(&self, risk_free_rate: f64) -> PortfolioRiskSummary {
        let values = self.values();
        let returns = metrics::daily_returns(&values);
        let cagr = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => {
                metrics::cagr_between(first.date, first.value, last.date, last.value)
            }
            _ => 0.0,
        };

        PortfolioRiskSummary {
            cagr,
            volatility: metrics::volatility(&returns),
            sharpe: metrics::sharpe_ratio(&returns, risk_free_rate),
            sortino: metrics::sortino_ratio(&returns, risk_free_rate),
            max_drawdown: metrics::max_drawdown(&values),
        }
    }
}

/// Dates present in every series, ascending, with each series' close.
pub fn align_prices(series: &[&PriceSeries]) -> BTreeMap<NaiveDate, Vec<f64>> {
    let mut aligned: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    let Some((head, rest)) = series.split_first() else {
        return aligned;
    };

    let lookups: Vec<HashMap<NaiveDate, f64>> = rest
        .iter()
        .map(|s| s.points().iter().map(|p| (p.date, p.close)).collect())
        .collect();

    for point in head.points() {
        let mut row = Vec::with_capacity(series.len());
        row.push(point.close);
        for lookup in &lookups {
            match lookup.get(&point.date) {
                Some(&close) => row.push(close),
                None => break,
            }
        }
        if row.len() == series.len() {
            aligned.insert(point.date, row);
        }
    }

    aligned
}

/// Weighted sum of aligned prices, rescaled so the first point equals the
/// plan's capital. Series whose symbol is not in the plan are ignored.
pub fn simulate_portfolio_curve(
    plan: &AllocationPlan,
    prices: &[PriceSeries],
) -> PortfolioCurve {
    let fractions = plan.fractions();
    let included: Vec<&PriceSeries> = prices
        .iter()
        .filter(|s| fractions.contains_key(s.symbol()))
        .collect();
    let weights: Vec<f64> = included
        .iter()
        .map(|s| fractions.get(s.symbol()).copied().unwrap_or(0.0))
        .collect();

    let blended: Vec<(NaiveDate, f64)> = align_prices(&included)
        .into_iter()
        .map(|(date, row)| {
            let value = row.iter().zip(&weights).map(|(p, w)| p * w).sum();
            (date, value)
        })
        .collect();

    let Some(&(_, base)) = blended.first() else {
        return PortfolioCurve::default();
    };
    if base <= 0.0 {
        return PortfolioCurve::default();
    }

    PortfolioCurve {
        points: blended
            .into_iter()
            .map(|(date, value)| EquityPoint {
                date,
                value: value / base * plan.total_capital,
            })
            .collect(),
    }
}

/// Volatility in percent, with 1 substituted for a zero reading.
fn safe_volatility_pct(volatility: f64) -> f64 {
    let pct = finite_or_zero(volatility).abs() * 100.0;
    if pct == 0.0 { 1.0 } else { pct }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
