//! Report generation port trait.

use crate::domain::allocation::{AllocationPlan, PortfolioCurve};
use crate::domain::analysis::AnalysisResult;
use crate::domain::backtest::{BacktestRecord, BacktestSummary};
use crate::domain::error::RegimeLabError;
use crate::domain::metrics::InstrumentMetrics;

/// Port for persisting analysis artifacts. Each method writes one table to
/// `output_path`.
pub trait ReportPort {
    fn write_backtest_summary(
        &self,
        summary: &BacktestSummary,
        output_path: &str,
    ) -> Result<(), RegimeLabError>;

    fn write_backtest_records(
        &self,
        records: &[BacktestRecord],
        horizons: [usize; 3],
        output_path: &str,
    ) -> Result<(), RegimeLabError>;

    fn write_metrics(
        &self,
        metrics: &[InstrumentMetrics],
        output_path: &str,
    ) -> Result<(), RegimeLabError>;

    fn write_allocation(
        &self,
        plan: &AllocationPlan,
        output_path: &str,
    ) -> Result<(), RegimeLabError>;

    fn write_analysis(
        &self,
        results: &[AnalysisResult],
        output_path: &str,
    ) -> Result<(), RegimeLabError>;

    fn write_curve(&self, curve: &PortfolioCurve, output_path: &str) -> Result<(), RegimeLabError>;
}
