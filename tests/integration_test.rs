//! Integration tests across the analytical pipeline.
//!
//! Tests cover:
//! - Single-instrument entry points over a mock price port
//! - Skip-and-continue behaviour of batch operations
//! - Allocation scenarios and the simulated portfolio curve
//! - Report writing through the CSV adapter

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use regimelab::adapters::csv_adapter::CsvAdapter;
use regimelab::domain::allocation::{
    AllocationStrategy, build_allocation_plan, simulate_portfolio_curve,
};
use regimelab::domain::analysis::{AnalysisConfig, analyze_instrument};
use regimelab::domain::backtest::{
    BacktestConfig, backtest_instrument, backtest_portfolio, run_backtest,
};
use regimelab::domain::error::RegimeLabError;
use regimelab::domain::health::{HealthBand, portfolio_health};
use regimelab::domain::metrics::{InstrumentMetrics, compute_instrument_metrics};
use regimelab::domain::price::Lookback;
use regimelab::domain::regime::{RegimeConfig, RegimeLabel};
use regimelab::domain::screener::{ScreenFilter, screen_watchlist};
use regimelab::domain::universe::{SkipReason, analyze_universe, metrics_universe};

fn step_closes() -> Vec<f64> {
    // the 20-day MA still lags the jump at the last observation
    let mut closes = vec![100.0; 50];
    closes.extend(vec![110.0; 12]);
    closes
}

mod single_instrument {
    use super::*;

    #[test]
    fn analyze_step_series_is_bullish() {
        let port = MockPriceHistoryPort::new().with_series(make_series("STEP.NS", &step_closes()));
        let result = analyze_instrument(&port, "STEP.NS", &AnalysisConfig::default()).unwrap();

        assert_eq!(result.regime, RegimeLabel::Bullish);
        assert_eq!(result.rsi, 100.0);
        assert_eq!(result.confidence, 100.0);
        assert!(!result.high_risk);
        assert_eq!(result.explanation.len(), 3);
    }

    #[test]
    fn analyze_unknown_symbol_is_unavailable() {
        let port = MockPriceHistoryPort::new();
        let err = analyze_instrument(&port, "NOPE.NS", &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, RegimeLabError::DataUnavailable { .. }));
    }

    #[test]
    fn analyze_short_history_is_insufficient() {
        let port = MockPriceHistoryPort::new().with_series(make_series("NEW.NS", &[100.0; 40]));
        let err = analyze_instrument(&port, "NEW.NS", &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            RegimeLabError::InsufficientHistory {
                observations: 40,
                minimum: 60,
                ..
            }
        ));
    }

    #[test]
    fn metrics_for_constant_series_are_neutral() {
        let port = MockPriceHistoryPort::new().with_series(make_series("FLAT.NS", &[250.0; 90]));
        let m = compute_instrument_metrics(&port, "FLAT.NS", Lookback::Max, 0.065, 30).unwrap();
        assert_eq!(m.cagr, 0.0);
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.sharpe, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.latest_price, 250.0);
    }

    #[test]
    fn metrics_respect_lookback() {
        let closes: Vec<f64> = (0..400).map(|i| 100.0 + i as f64).collect();
        let port = MockPriceHistoryPort::new().with_series(make_series("UP.NS", &closes));
        let full = compute_instrument_metrics(&port, "UP.NS", Lookback::Max, 0.0, 30).unwrap();
        let recent =
            compute_instrument_metrics(&port, "UP.NS", Lookback::Days(60), 0.0, 30).unwrap();
        assert_eq!(full.latest_price, recent.latest_price);
        // linear growth annualizes lower over the most recent window
        assert!(recent.cagr < full.cagr);
    }

    #[test]
    fn backtest_sixty_observations_has_no_records() {
        let series = make_series("SHORT.NS", &wave_closes(60, 0.0, 0.0));
        let report = run_backtest(&series, &RegimeConfig::default(), &BacktestConfig::default());
        assert!(report.is_empty());

        let port = MockPriceHistoryPort::new().with_series(series);
        let err = backtest_instrument(
            &port,
            "SHORT.NS",
            Lookback::Max,
            &RegimeConfig::default(),
            &BacktestConfig::default(),
        )
        .unwrap_err();
        assert!(err.is_skippable());
    }

    #[test]
    fn backtest_records_are_ordered_and_causal() {
        let series = make_series("WAVE.NS", &wave_closes(200, 0.3, 0.02));
        let port = MockPriceHistoryPort::new().with_series(series.clone());
        let report = backtest_instrument(
            &port,
            "WAVE.NS",
            Lookback::Max,
            &RegimeConfig::default(),
            &BacktestConfig::default(),
        )
        .unwrap();

        assert_eq!(report.records.len(), 200 - 20 - 60);
        assert!(report.records.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(report.summary.total, report.records.len());

        // truncating right after an evaluated index must not change its prediction
        let i = 100;
        let truncated = series.prefix(i + 1 + 20);
        let short = run_backtest(&truncated, &RegimeConfig::default(), &BacktestConfig::default());
        let full_rec = &report.records[i - 60];
        let short_rec = short
            .records
            .iter()
            .find(|r| r.date == full_rec.date)
            .unwrap();
        assert_eq!(short_rec.predicted, full_rec.predicted);
        assert_eq!(short_rec.forward_returns, full_rec.forward_returns);
    }
}

mod batch_skip_and_continue {
    use super::*;

    fn port() -> MockPriceHistoryPort {
        MockPriceHistoryPort::new()
            .with_series(make_series("A.NS", &wave_closes(200, 0.0, 0.03)))
            .with_series(make_series("B.NS", &wave_closes(200, 1.3, -0.02)))
            .with_series(make_series("TINY.NS", &[100.0; 10]))
    }

    #[test]
    fn analyze_universe_skips_missing_and_short() {
        let outcome = analyze_universe(
            &port(),
            &symbols(&["A.NS", "GONE.NS", "TINY.NS", "B.NS"]),
            &AnalysisConfig::default(),
        )
        .unwrap();

        let analysed: Vec<&str> = outcome.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(analysed, vec!["A.NS", "B.NS"]);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].symbol, "GONE.NS");
        assert!(matches!(outcome.skipped[0].reason, SkipReason::NoData { .. }));
        assert!(matches!(
            outcome.skipped[1].reason,
            SkipReason::InsufficientHistory {
                observations: 10,
                ..
            }
        ));
    }

    /// Written unvalidated, so bad closes reach the adapter as-is.
    fn write_closes(dir: &std::path::Path, symbol: &str, closes: &[f64]) {
        let mut csv = String::from("date,close\n");
        for (i, close) in closes.iter().enumerate() {
            let date = start_date() + chrono::Duration::days(i as i64);
            csv.push_str(&format!("{date},{close}\n"));
        }
        std::fs::write(dir.join(format!("{symbol}.csv")), csv).unwrap();
    }

    #[test]
    fn malformed_price_file_does_not_stop_the_batch() {
        let dir = tempfile::TempDir::new().unwrap();
        let rising: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let mut zero_close = rising.clone();
        zero_close[49] = 0.0;
        write_closes(dir.path(), "GOOD.NS", &rising);
        write_closes(dir.path(), "BAD.NS", &zero_close);
        std::fs::write(
            dir.path().join("GARBLED.NS.csv"),
            "date,close\n2023-01-02,101.5\nnot-a-date,102.0\n",
        )
        .unwrap();

        let port = CsvAdapter::new(dir.path());
        let universe = symbols(&["BAD.NS", "GARBLED.NS", "GOOD.NS"]);

        let outcome = analyze_universe(&port, &universe, &AnalysisConfig::default()).unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].symbol, "GOOD.NS");
        let skipped: Vec<&str> = outcome.skipped.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(skipped, vec!["BAD.NS", "GARBLED.NS"]);
        assert!(
            outcome
                .skipped
                .iter()
                .all(|s| matches!(s.reason, SkipReason::InvalidData { .. }))
        );

        let metrics = metrics_universe(&port, &universe, Lookback::Max, 0.05, 30).unwrap();
        assert_eq!(metrics.results.len(), 1);
        assert_eq!(metrics.results[0].symbol, "GOOD.NS");
    }

    #[test]
    fn connection_errors_abort_the_batch() {
        let port = port().with_error("B.NS", "connection reset");
        let result = metrics_universe(&port, &symbols(&["A.NS", "B.NS"]), Lookback::Max, 0.05, 30);
        assert!(matches!(result, Err(RegimeLabError::Database { .. })));
    }

    #[test]
    fn backtest_portfolio_combines_records() {
        let outcome = backtest_portfolio(
            &port(),
            &symbols(&["A.NS", "TINY.NS", "B.NS"]),
            Lookback::Max,
            &RegimeConfig::default(),
            &BacktestConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.reports.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].symbol, "TINY.NS");
        assert_eq!(outcome.summary.total, 2 * 120);
        assert_eq!(outcome.records().count(), 240);

        let counted: usize = outcome.summary.per_regime.iter().map(|s| s.count).sum();
        assert_eq!(counted, outcome.summary.total);
        let confusion_total: usize = outcome.summary.confusion.iter().flatten().sum();
        assert_eq!(confusion_total, outcome.summary.total);
    }

    #[test]
    fn screen_watchlist_filters_and_skips() {
        let port = port().with_series(make_series("STEP.NS", &step_closes()));
        let filter = ScreenFilter {
            states: vec![RegimeLabel::Bullish],
            rsi_min: 90.0,
            rsi_max: 100.0,
            include_high_risk: false,
        };
        let outcome = screen_watchlist(
            &port,
            &symbols(&["STEP.NS", "GONE.NS"]),
            &AnalysisConfig::default(),
            &filter,
        )
        .unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].symbol, "STEP.NS");
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[test]
    fn health_of_bullish_portfolio_is_strong() {
        let port = MockPriceHistoryPort::new()
            .with_series(make_series("S1.NS", &step_closes()))
            .with_series(make_series("S2.NS", &step_closes()));
        let outcome = analyze_universe(
            &port,
            &symbols(&["S1.NS", "S2.NS"]),
            &AnalysisConfig::default(),
        )
        .unwrap();
        let health = portfolio_health(&outcome.results);
        assert_eq!(health.score, 100);
        assert_eq!(health.band, HealthBand::Strong);
    }
}

mod allocation_scenarios {
    use super::*;

    fn metrics(symbol: &str, sharpe: f64, volatility: f64, price: f64) -> InstrumentMetrics {
        InstrumentMetrics {
            symbol: symbol.to_string(),
            cagr: 0.12,
            volatility,
            sharpe,
            sortino: 1.0,
            max_drawdown: -0.2,
            calmar: 0.6,
            latest_price: price,
        }
    }

    #[test]
    fn equal_weight_four_instruments() {
        let list = vec![
            metrics("A.NS", 1.0, 0.2, 100.0),
            metrics("B.NS", 0.5, 0.3, 250.0),
            metrics("C.NS", -0.2, 0.25, 500.0),
            metrics("D.NS", 2.0, 0.15, 1000.0),
        ];
        let plan =
            build_allocation_plan(&list, AllocationStrategy::EqualWeight, 200_000.0, 40.0).unwrap();
        for a in &plan.allocations {
            assert_abs_diff_eq!(a.weight_pct, 25.0, epsilon = 1e-9);
            assert_eq!(a.capital, 50_000.0);
        }
        assert_eq!(plan.get("B.NS").unwrap().shares, 200);
    }

    #[test]
    fn risk_adjusted_without_positive_sharpe_is_equal_weight() {
        let list = vec![
            metrics("A.NS", -1.0, 0.2, 100.0),
            metrics("B.NS", 0.0, 0.3, 100.0),
            metrics("C.NS", -0.3, 0.25, 100.0),
            metrics("D.NS", -2.0, 0.15, 100.0),
        ];
        let plan =
            build_allocation_plan(&list, AllocationStrategy::RiskAdjusted, 200_000.0, 40.0)
                .unwrap();
        for a in &plan.allocations {
            assert_abs_diff_eq!(a.weight_pct, 25.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn plan_and_curve_from_mock_port() {
        let port = MockPriceHistoryPort::new()
            .with_series(make_series("A.NS", &wave_closes(150, 0.0, 0.05)))
            .with_series(make_series("B.NS", &wave_closes(150, 2.0, 0.01)))
            .with_series(make_series("C.NS", &wave_closes(150, 4.0, -0.01)));
        let list = symbols(&["A.NS", "B.NS", "C.NS"]);

        let outcome = metrics_universe(&port, &list, Lookback::Max, 0.05, 30).unwrap();
        let plan = build_allocation_plan(
            &outcome.results,
            AllocationStrategy::MinimumVolatility,
            300_000.0,
            40.0,
        )
        .unwrap();
        assert_abs_diff_eq!(plan.total_weight_pct(), 100.0, epsilon = 1e-6);

        let series: Vec<_> = list
            .iter()
            .map(|s| make_series(s, &wave_closes(150, 0.0, 0.0)))
            .collect();
        let curve = simulate_portfolio_curve(&plan, &series);
        assert_eq!(curve.points.len(), 150);
        assert_abs_diff_eq!(curve.points[0].value, 300_000.0, epsilon = 1e-6);

        let risk = curve.risk_summary(0.05);
        assert!(risk.max_drawdown <= 0.0);
    }
}

mod reports {
    use super::*;
    use regimelab::adapters::csv_report_adapter::CsvReportAdapter;
    use regimelab::ports::report_port::ReportPort;
    use std::fs;

    #[test]
    fn backtest_report_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let port = MockPriceHistoryPort::new()
            .with_series(make_series("A.NS", &wave_closes(150, 0.0, 0.03)));
        let outcome = backtest_portfolio(
            &port,
            &symbols(&["A.NS"]),
            Lookback::Max,
            &RegimeConfig::default(),
            &BacktestConfig::default(),
        )
        .unwrap();

        let summary_path = dir.path().join("summary.csv");
        let records_path = dir.path().join("records.csv");
        let reporter = CsvReportAdapter::new();
        reporter
            .write_backtest_summary(&outcome.summary, summary_path.to_str().unwrap())
            .unwrap();
        let records: Vec<_> = outcome.records().cloned().collect();
        reporter
            .write_backtest_records(&records, [5, 10, 20], records_path.to_str().unwrap())
            .unwrap();

        let summary = fs::read_to_string(&summary_path).unwrap();
        assert!(summary.starts_with("Regime,Count,Hit_Rate,Return_5D,Return_10D,Return_20D\n"));
        assert_eq!(summary.lines().count(), 1 + outcome.summary.per_regime.len());

        let records_csv = fs::read_to_string(&records_path).unwrap();
        assert_eq!(records_csv.lines().count(), 1 + 70);
    }
}
