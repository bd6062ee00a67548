//! CSV report writer.
//!
//! Percentages are written as percent values rounded to 2 decimals. Rounding
//! happens here only; domain values are never rounded.

use crate::domain::allocation::{AllocationPlan, PortfolioCurve};
use crate::domain::analysis::AnalysisResult;
use crate::domain::backtest::{BacktestRecord, BacktestSummary};
use crate::domain::error::RegimeLabError;
use crate::domain::metrics::InstrumentMetrics;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn round2(value: f64) -> String {
    format!("{:.2}", value)
}

fn return_headers(horizons: [usize; 3]) -> Vec<String> {
    horizons.iter().map(|h| format!("Return_{}D", h)).collect()
}

fn report_err(path: &str, e: impl std::fmt::Display) -> RegimeLabError {
    RegimeLabError::Report {
        reason: format!("{}: {}", path, e),
    }
}

/// Write `rows` under `header` to `output_path`, creating parent directories.
fn write_table(
    output_path: &str,
    header: &[String],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<(), RegimeLabError> {
    if let Some(parent) = Path::new(output_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(output_path).map_err(|e| report_err(output_path, e))?;
    writer
        .write_record(header)
        .map_err(|e| report_err(output_path, e))?;

    let mut count = 0usize;
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|e| report_err(output_path, e))?;
        count += 1;
    }
    writer.flush()?;

    info!(path = output_path, rows = count, "report written");
    Ok(())
}

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl ReportPort for CsvReportAdapter {
    fn write_backtest_summary(
        &self,
        summary: &BacktestSummary,
        output_path: &str,
    ) -> Result<(), RegimeLabError> {
        let mut cols = header(&["Regime", "Count", "Hit_Rate"]);
        cols.extend(return_headers(summary.horizons));

        let rows = summary.per_regime.iter().map(|stats| {
            let mut row = vec![
                stats.regime.to_string(),
                stats.count.to_string(),
                round2(stats.hit_rate * 100.0),
            ];
            row.extend(stats.mean_returns.iter().map(|r| round2(*r)));
            row
        });
        write_table(output_path, &cols, rows)
    }

    fn write_backtest_records(
        &self,
        records: &[BacktestRecord],
        horizons: [usize; 3],
        output_path: &str,
    ) -> Result<(), RegimeLabError> {
        let mut cols = header(&["Stock", "Date", "Regime", "Realized"]);
        cols.extend(return_headers(horizons));

        let rows = records.iter().map(|rec| {
            let mut row = vec![
                rec.symbol.clone(),
                rec.date.to_string(),
                rec.predicted.to_string(),
                rec.realized.to_string(),
            ];
            row.extend(rec.forward_returns.iter().map(|r| round2(*r)));
            row
        });
        write_table(output_path, &cols, rows)
    }

    fn write_metrics(
        &self,
        metrics: &[InstrumentMetrics],
        output_path: &str,
    ) -> Result<(), RegimeLabError> {
        let cols = header(&[
            "Stock",
            "CAGR",
            "Volatility",
            "Sharpe",
            "Sortino",
            "MaxDD",
            "Calmar",
            "Price",
        ]);
        let rows = metrics.iter().map(|m| {
            vec![
                m.symbol.clone(),
                round2(m.cagr * 100.0),
                round2(m.volatility * 100.0),
                round2(m.sharpe),
                round2(m.sortino),
                round2(m.max_drawdown * 100.0),
                round2(m.calmar),
                round2(m.latest_price),
            ]
        });
        write_table(output_path, &cols, rows)
    }

    fn write_allocation(
        &self,
        plan: &AllocationPlan,
        output_path: &str,
    ) -> Result<(), RegimeLabError> {
        let cols = header(&["Stock", "Weight", "Capital", "Shares"]);
        let rows = plan.allocations.iter().map(|a| {
            vec![
                a.symbol.clone(),
                round2(a.weight_pct),
                format!("{:.0}", a.capital),
                a.shares.to_string(),
            ]
        });
        write_table(output_path, &cols, rows)
    }

    fn write_analysis(
        &self,
        results: &[AnalysisResult],
        output_path: &str,
    ) -> Result<(), RegimeLabError> {
        let cols = header(&[
            "Stock",
            "Date",
            "Price",
            "RSI",
            "State",
            "Confidence",
            "High_Risk",
            "Explanation",
        ]);
        let rows = results.iter().map(|r| {
            vec![
                r.symbol.clone(),
                r.date.to_string(),
                round2(r.price),
                round2(r.rsi),
                r.regime.to_string(),
                round2(r.confidence),
                r.high_risk.to_string(),
                r.explanation.join("; "),
            ]
        });
        write_table(output_path, &cols, rows)
    }

    fn write_curve(&self, curve: &PortfolioCurve, output_path: &str) -> Result<(), RegimeLabError> {
        let cols = header(&["Date", "Value"]);
        let rows = curve
            .points
            .iter()
            .map(|p| vec![p.date.to_string(), round2(p.value)]);
        write_table(output_path, &cols, rows)
    }
}
