//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_watchlist_adapter::JsonWatchlistAdapter;
use crate::domain::allocation::{
    AllocationConfig, build_allocation_plan, simulate_portfolio_curve,
};
use crate::domain::analysis::{AnalysisConfig, AnalysisResult, analyze_instrument};
use crate::domain::backtest::{BacktestConfig, backtest_portfolio};
use crate::domain::config_validation::{
    read_horizons, read_lookback, read_strategy, validate_config,
};
use crate::domain::error::RegimeLabError;
use crate::domain::health::portfolio_health;
use crate::domain::metrics::MetricsConfig;
use crate::domain::price::Lookback;
use crate::domain::regime::{HighRiskRule, RegimeConfig, RegimeLabel};
use crate::domain::screener::{ScreenFilter, screen_watchlist};
use crate::domain::universe::{
    BatchOutcome, SkippedSymbol, analyze_universe, fetch_universe, metrics_universe,
    normalize_symbol, parse_symbols,
};
use crate::domain::watchlist::{AddOutcome, RemoveOutcome, add_symbol, remove_symbol};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceHistoryPort;
use crate::ports::report_port::ReportPort;
use crate::ports::symbol_port::SymbolRepository;

#[derive(Parser, Debug)]
#[command(
    name = "regimelab",
    version,
    about = "Market regime analysis, walk-forward backtests and capital allocation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify the current regime of one symbol or the whole universe
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        /// Directory to write analysis.csv into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Filter the universe by regime, RSI band and risk flag
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        /// Accepted regime; repeatable (default: Bullish)
        #[arg(long = "state")]
        states: Vec<RegimeLabel>,
        #[arg(long)]
        rsi_min: Option<f64>,
        #[arg(long)]
        rsi_max: Option<f64>,
        #[arg(long)]
        include_high_risk: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute risk metrics for every symbol
    Metrics {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Walk-forward backtest of the regime classifier
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build an allocation plan and simulate its equity curve
    Allocate {
        #[arg(short, long)]
        config: PathBuf,
        /// equal, risk-adjusted or min-volatility
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        capital: Option<f64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or edit the watchlist
    Watchlist {
        #[arg(short, long)]
        config: PathBuf,
        #[command(subcommand)]
        action: WatchlistAction,
    },
    /// Show available data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    List,
    Add { symbol: String },
    Remove { symbol: String },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            config,
            symbol,
            json,
            output,
        } => run_analyze(&config, symbol.as_deref(), json, output.as_deref()),
        Command::Screen {
            config,
            states,
            rsi_min,
            rsi_max,
            include_high_risk,
            output,
        } => {
            let overrides = ScreenOverrides {
                states,
                rsi_min,
                rsi_max,
                include_high_risk,
            };
            run_screen(&config, overrides, output.as_deref())
        }
        Command::Metrics {
            config,
            symbol,
            output,
        } => run_metrics(&config, symbol.as_deref(), output.as_deref()),
        Command::Backtest {
            config,
            symbol,
            output,
        } => run_backtest(&config, symbol.as_deref(), output.as_deref()),
        Command::Allocate {
            config,
            strategy,
            capital,
            output,
        } => run_allocate(&config, strategy.as_deref(), capital, output.as_deref()),
        Command::Watchlist { config, action } => run_watchlist(&config, action),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load and validate the config file.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, RegimeLabError> {
    info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn build_regime_config(config: &dyn ConfigPort) -> Result<RegimeConfig, RegimeLabError> {
    let high_risk = match config
        .get_string("regime", "high_risk_rule")
        .as_deref()
        .map(str::trim)
    {
        None | Some("confidence") => HighRiskRule::LowConfidence {
            below: config.get_double("regime", "high_risk_confidence", 40.0),
        },
        Some("bearish-breakdown") => HighRiskRule::BearishBreakdown {
            rsi_floor: config.get_double("regime", "bearish_rsi_floor", 35.0),
        },
        Some(other) => {
            return Err(RegimeLabError::ConfigInvalid {
                section: "regime".into(),
                key: "high_risk_rule".into(),
                reason: format!("unknown rule '{other}'"),
            });
        }
    };

    Ok(RegimeConfig {
        ma_window: config.get_positive("indicators", "ma_window", 20)?,
        rsi_window: config.get_positive("indicators", "rsi_window", 14)?,
        bullish_rsi: config.get_double("regime", "bullish_rsi", 55.0),
        bearish_rsi: config.get_double("regime", "bearish_rsi", 45.0),
        confidence_scale: config.get_double("regime", "confidence_scale", 2.0),
        high_risk,
    })
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, RegimeLabError> {
    Ok(AnalysisConfig {
        regime: build_regime_config(config)?,
        lookback: read_lookback(config, "data", Lookback::Years(2))?,
        min_observations: config.get_positive("regime", "min_observations", 60)?,
    })
}

pub fn build_metrics_config(config: &dyn ConfigPort) -> Result<MetricsConfig, RegimeLabError> {
    Ok(MetricsConfig {
        risk_free_rate: config.get_double("risk", "risk_free_rate", 0.065),
        lookback: read_lookback(config, "risk", Lookback::Years(3))?,
        min_observations: config.get_positive("risk", "min_observations", 30)?,
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, RegimeLabError> {
    Ok(BacktestConfig {
        horizons: read_horizons(config)?,
        warm_up: config.get_positive("backtest", "warm_up", 60)?,
        bullish_threshold: config.get_double("backtest", "bullish_threshold", 1.0),
        bearish_threshold: config.get_double("backtest", "bearish_threshold", -1.0),
        min_observations: config.get_positive("backtest", "min_observations", 80)?,
    })
}

pub fn build_allocation_config(config: &dyn ConfigPort) -> Result<AllocationConfig, RegimeLabError> {
    Ok(AllocationConfig {
        strategy: read_strategy(config)?,
        capital: config.get_double("allocation", "capital", 500_000.0),
        max_weight_pct: config.get_double("allocation", "max_weight", 40.0),
    })
}

/// Screen options given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ScreenOverrides {
    pub states: Vec<RegimeLabel>,
    pub rsi_min: Option<f64>,
    pub rsi_max: Option<f64>,
    pub include_high_risk: bool,
}

/// `[screen]` settings with command line overrides applied on top.
pub fn build_screen_filter(
    config: &dyn ConfigPort,
    overrides: ScreenOverrides,
) -> Result<ScreenFilter, RegimeLabError> {
    let defaults = ScreenFilter::default();
    let states = if !overrides.states.is_empty() {
        overrides.states
    } else if let Some(list) = config.get_string("screen", "states") {
        list.split(',')
            .map(|s| {
                s.parse::<RegimeLabel>().map_err(|reason| RegimeLabError::ConfigInvalid {
                    section: "screen".into(),
                    key: "states".into(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    } else {
        defaults.states
    };

    let pick = |given: Option<f64>, key: &str, default: f64| {
        given.unwrap_or_else(|| config.get_double("screen", key, default))
    };
    let filter = ScreenFilter {
        states,
        rsi_min: pick(overrides.rsi_min, "rsi_min", defaults.rsi_min),
        rsi_max: pick(overrides.rsi_max, "rsi_max", defaults.rsi_max),
        include_high_risk: overrides.include_high_risk
            || config.get_bool("screen", "include_high_risk", defaults.include_high_risk),
    };
    if filter.rsi_min > filter.rsi_max {
        return Err(RegimeLabError::InvalidInput {
            reason: format!(
                "rsi_min {} is above rsi_max {}",
                filter.rsi_min, filter.rsi_max
            ),
        });
    }
    Ok(filter)
}

pub fn build_price_port(config: &dyn ConfigPort) -> Result<Box<dyn PriceHistoryPort>, RegimeLabError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());

    match source.as_str() {
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .unwrap_or_else(|| "data".to_string());
            Ok(Box::new(CsvAdapter::new(dir)))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            Ok(Box::new(SqliteAdapter::from_config(config)?))
        }
        other => Err(RegimeLabError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("source '{other}' is not available in this build"),
        }),
    }
}

pub fn build_symbol_repository(config: &dyn ConfigPort) -> JsonWatchlistAdapter {
    JsonWatchlistAdapter::new(
        config
            .get_string("universe", "watchlist_path")
            .unwrap_or_else(|| "watchlist.json".to_string()),
    )
}

fn default_suffix(config: &dyn ConfigPort) -> String {
    config
        .get_string("universe", "default_suffix")
        .unwrap_or_default()
}

/// `--symbol` wins, then `[universe] symbols`, then the watchlist.
pub fn resolve_symbols(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
    repo: &dyn SymbolRepository,
) -> Result<Vec<String>, RegimeLabError> {
    let suffix = default_suffix(config);
    if let Some(symbol) = symbol_override {
        return Ok(vec![normalize_symbol(symbol, &suffix)?]);
    }
    if let Some(list) = config.get_string("universe", "symbols") {
        return Ok(parse_symbols(&list, &suffix)?);
    }
    let symbols = repo.load_symbols()?;
    if symbols.is_empty() {
        return Err(RegimeLabError::InvalidInput {
            reason: "no symbols: set [universe] symbols or add to the watchlist".into(),
        });
    }
    Ok(symbols)
}

fn output_dir(output: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    output.map(Path::to_path_buf).unwrap_or_else(|| {
        PathBuf::from(
            config
                .get_string("report", "output_dir")
                .unwrap_or_else(|| "reports".to_string()),
        )
    })
}

fn report_path(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}

fn print_skipped(skipped: &[SkippedSymbol]) {
    for s in skipped {
        println!("  skipped {}: {}", s.symbol, s.reason);
    }
}

fn require_results<T>(outcome: &BatchOutcome<T>) -> Result<(), RegimeLabError> {
    if outcome.results.is_empty() {
        return Err(RegimeLabError::DataUnavailable {
            symbol: "all".into(),
            reason: format!("none of {} symbols had usable history", outcome.attempted()),
        });
    }
    Ok(())
}

fn print_analysis_table(results: &[AnalysisResult]) {
    println!(
        "{:<14} {:<10} {:>10} {:>7} {:<9} {:>6}  Risk",
        "Stock", "Date", "Price", "RSI", "State", "Conf"
    );
    for r in results {
        println!(
            "{:<14} {:<10} {:>10.2} {:>7.2} {:<9} {:>6.1}  {}",
            r.symbol,
            r.date,
            r.price,
            r.rsi,
            r.regime,
            r.confidence,
            if r.high_risk { "HIGH" } else { "-" }
        );
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), RegimeLabError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| RegimeLabError::Report {
        reason: e.to_string(),
    })?;
    println!("{json}");
    Ok(())
}

fn run_analyze(
    config_path: &Path,
    symbol: Option<&str>,
    json: bool,
    output: Option<&Path>,
) -> Result<(), RegimeLabError> {
    let config = load_config(config_path)?;
    let analysis = build_analysis_config(&config)?;
    let port = build_price_port(&config)?;

    let outcome = match symbol {
        Some(s) => {
            let symbol = normalize_symbol(s, &default_suffix(&config))?;
            BatchOutcome {
                results: vec![analyze_instrument(port.as_ref(), &symbol, &analysis)?],
                skipped: Vec::new(),
            }
        }
        None => {
            let repo = build_symbol_repository(&config);
            let symbols = resolve_symbols(None, &config, &repo)?;
            analyze_universe(port.as_ref(), &symbols, &analysis)?
        }
    };

    if json {
        print_json(&outcome.results)?;
    } else {
        print_analysis_table(&outcome.results);
        if let [single] = outcome.results.as_slice() {
            for line in &single.explanation {
                println!("  - {line}");
            }
        } else {
            let health = portfolio_health(&outcome.results);
            println!("\nPortfolio health: {} ({})", health.score, health.band);
        }
        print_skipped(&outcome.skipped);
    }

    if let Some(dir) = output {
        CsvReportAdapter::new().write_analysis(&outcome.results, &report_path(dir, "analysis.csv"))?;
    }
    Ok(())
}

fn run_screen(
    config_path: &Path,
    overrides: ScreenOverrides,
    output: Option<&Path>,
) -> Result<(), RegimeLabError> {
    let config = load_config(config_path)?;
    let analysis = build_analysis_config(&config)?;
    let filter = build_screen_filter(&config, overrides)?;
    let port = build_price_port(&config)?;
    let repo = build_symbol_repository(&config);
    let symbols = resolve_symbols(None, &config, &repo)?;

    let outcome = screen_watchlist(port.as_ref(), &symbols, &analysis, &filter)?;
    if outcome.results.is_empty() {
        println!("No symbols matched.");
    } else {
        print_analysis_table(&outcome.results);
    }
    print_skipped(&outcome.skipped);

    if let Some(dir) = output {
        CsvReportAdapter::new().write_analysis(&outcome.results, &report_path(dir, "screen.csv"))?;
    }
    Ok(())
}

fn run_metrics(
    config_path: &Path,
    symbol: Option<&str>,
    output: Option<&Path>,
) -> Result<(), RegimeLabError> {
    let config = load_config(config_path)?;
    let settings = build_metrics_config(&config)?;
    let port = build_price_port(&config)?;
    let repo = build_symbol_repository(&config);
    let symbols = resolve_symbols(symbol, &config, &repo)?;

    let outcome = metrics_universe(
        port.as_ref(),
        &symbols,
        settings.lookback,
        settings.risk_free_rate,
        settings.min_observations,
    )?;
    require_results(&outcome)?;

    println!(
        "{:<14} {:>8} {:>8} {:>7} {:>7} {:>8} {:>7} {:>10}",
        "Stock", "CAGR%", "Vol%", "Sharpe", "Sortino", "MaxDD%", "Calmar", "Price"
    );
    for m in &outcome.results {
        println!(
            "{:<14} {:>8.2} {:>8.2} {:>7.2} {:>7.2} {:>8.2} {:>7.2} {:>10.2}",
            m.symbol,
            m.cagr * 100.0,
            m.volatility * 100.0,
            m.sharpe,
            m.sortino,
            m.max_drawdown * 100.0,
            m.calmar,
            m.latest_price
        );
    }
    print_skipped(&outcome.skipped);

    let dir = output_dir(output, &config);
    CsvReportAdapter::new().write_metrics(&outcome.results, &report_path(&dir, "metrics.csv"))?;
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    symbol: Option<&str>,
    output: Option<&Path>,
) -> Result<(), RegimeLabError> {
    let config = load_config(config_path)?;
    let analysis = build_analysis_config(&config)?;
    let bt_config = build_backtest_config(&config)?;
    let port = build_price_port(&config)?;
    let repo = build_symbol_repository(&config);
    let symbols = resolve_symbols(symbol, &config, &repo)?;

    info!(symbols = symbols.len(), lookback = %analysis.lookback, "starting backtest");
    let result = backtest_portfolio(
        port.as_ref(),
        &symbols,
        analysis.lookback,
        &analysis.regime,
        &bt_config,
    )?;

    if result.reports.is_empty() {
        print_skipped(&result.skipped);
        return Err(RegimeLabError::DataUnavailable {
            symbol: "all".into(),
            reason: "no symbol produced backtest records".into(),
        });
    }

    let summary = &result.summary;
    let [h1, h2, h3] = summary.horizons;
    println!(
        "{:<9} {:>6} {:>8} {:>9} {:>9} {:>9}",
        "Regime",
        "Count",
        "Hit%",
        format!("{h1}D%"),
        format!("{h2}D%"),
        format!("{h3}D%")
    );
    for stats in &summary.per_regime {
        println!(
            "{:<9} {:>6} {:>8.2} {:>9.2} {:>9.2} {:>9.2}",
            stats.regime,
            stats.count,
            stats.hit_rate * 100.0,
            stats.mean_returns[0],
            stats.mean_returns[1],
            stats.mean_returns[2]
        );
    }
    println!(
        "\nAccuracy: {:.2}% over {} records",
        summary.accuracy * 100.0,
        summary.total
    );
    println!("\nConfusion (rows predicted, columns realized):");
    println!("{:<9} {:>8} {:>8} {:>8}", "", "Bullish", "Bearish", "Sideways");
    for label in RegimeLabel::ALL {
        let row = summary.confusion[label.index()];
        println!("{:<9} {:>8} {:>8} {:>8}", label, row[0], row[1], row[2]);
    }
    print_skipped(&result.skipped);

    let dir = output_dir(output, &config);
    let reporter = CsvReportAdapter::new();
    reporter.write_backtest_summary(summary, &report_path(&dir, "backtest_summary.csv"))?;
    let records: Vec<_> = result.records().cloned().collect();
    reporter.write_backtest_records(
        &records,
        summary.horizons,
        &report_path(&dir, "backtest_records.csv"),
    )?;
    Ok(())
}

fn run_allocate(
    config_path: &Path,
    strategy: Option<&str>,
    capital: Option<f64>,
    output: Option<&Path>,
) -> Result<(), RegimeLabError> {
    let config = load_config(config_path)?;
    let settings = build_metrics_config(&config)?;
    let mut alloc = build_allocation_config(&config)?;
    if let Some(s) = strategy {
        alloc.strategy = s
            .parse()
            .map_err(|reason| RegimeLabError::InvalidInput { reason })?;
    }
    if let Some(c) = capital {
        alloc.capital = c;
    }

    let port = build_price_port(&config)?;
    let repo = build_symbol_repository(&config);
    let symbols = resolve_symbols(None, &config, &repo)?;

    let metrics = metrics_universe(
        port.as_ref(),
        &symbols,
        settings.lookback,
        settings.risk_free_rate,
        settings.min_observations,
    )?;
    require_results(&metrics)?;

    let plan = build_allocation_plan(
        &metrics.results,
        alloc.strategy,
        alloc.capital,
        alloc.max_weight_pct,
    )?;

    let held: Vec<String> = plan.allocations.iter().map(|a| a.symbol.clone()).collect();
    let prices = fetch_universe(port.as_ref(), &held, settings.lookback)?;
    let curve = simulate_portfolio_curve(&plan, &prices.results);

    println!(
        "Strategy: {}  Capital: {:.0}",
        plan.strategy, plan.total_capital
    );
    println!("{:<14} {:>8} {:>12} {:>8}", "Stock", "Weight%", "Capital", "Shares");
    for a in &plan.allocations {
        println!(
            "{:<14} {:>8.2} {:>12.0} {:>8}",
            a.symbol, a.weight_pct, a.capital, a.shares
        );
    }

    if curve.is_empty() {
        println!("\nNo common dates across holdings; equity curve not simulated.");
    } else {
        let risk = curve.risk_summary(settings.risk_free_rate);
        println!("\nSimulated portfolio over {} days:", curve.points.len());
        println!("  CAGR:         {:.2}%", risk.cagr * 100.0);
        println!("  Volatility:   {:.2}%", risk.volatility * 100.0);
        println!("  Sharpe:       {:.2}", risk.sharpe);
        println!("  Sortino:      {:.2}", risk.sortino);
        println!("  Max drawdown: {:.2}%", risk.max_drawdown * 100.0);
    }
    print_skipped(&metrics.skipped);

    let dir = output_dir(output, &config);
    let reporter = CsvReportAdapter::new();
    reporter.write_allocation(&plan, &report_path(&dir, "allocation.csv"))?;
    reporter.write_curve(&curve, &report_path(&dir, "portfolio_curve.csv"))?;
    Ok(())
}

fn run_watchlist(config_path: &Path, action: WatchlistAction) -> Result<(), RegimeLabError> {
    let config = load_config(config_path)?;
    let repo = build_symbol_repository(&config);
    let suffix = default_suffix(&config);

    match action {
        WatchlistAction::List => {
            let symbols = repo.load_symbols()?;
            if symbols.is_empty() {
                println!("Watchlist is empty.");
            }
            for symbol in symbols {
                println!("{symbol}");
            }
        }
        WatchlistAction::Add { symbol } => match add_symbol(&repo, &symbol, &suffix)? {
            AddOutcome::Added(s) => println!("Added {s}"),
            AddOutcome::AlreadyPresent(s) => println!("{s} is already on the watchlist"),
        },
        WatchlistAction::Remove { symbol } => match remove_symbol(&repo, &symbol, &suffix)? {
            RemoveOutcome::Removed(s) => println!("Removed {s}"),
            RemoveOutcome::NotPresent(s) => println!("{s} is not on the watchlist"),
        },
    }
    Ok(())
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> Result<(), RegimeLabError> {
    let config = load_config(config_path)?;
    let port = build_price_port(&config)?;

    let symbols = match symbol {
        Some(s) => vec![normalize_symbol(s, &default_suffix(&config))?],
        None => port.list_symbols()?,
    };
    if symbols.is_empty() {
        println!("No symbols found.");
        return Ok(());
    }

    for symbol in &symbols {
        match port.get_data_range(symbol)? {
            Some((first, last, count)) => {
                println!("{symbol}: {first} to {last} ({count} observations)")
            }
            None => println!("{symbol}: no data"),
        }
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), RegimeLabError> {
    let config = load_config(config_path)?;
    let analysis = build_analysis_config(&config)?;
    let metrics = build_metrics_config(&config)?;
    let backtest = build_backtest_config(&config)?;
    let allocation = build_allocation_config(&config)?;

    println!("Configuration is valid.");
    println!(
        "  indicators:  MA({}) RSI({})",
        analysis.regime.ma_window, analysis.regime.rsi_window
    );
    println!(
        "  regime:      bullish RSI > {}, bearish RSI < {}, confidence x{}",
        analysis.regime.bullish_rsi, analysis.regime.bearish_rsi, analysis.regime.confidence_scale
    );
    println!("  data:        lookback {}", analysis.lookback);
    println!(
        "  risk:        rf {}, lookback {}",
        metrics.risk_free_rate, metrics.lookback
    );
    println!(
        "  backtest:    horizons {:?}, warm-up {}",
        backtest.horizons, backtest.warm_up
    );
    println!(
        "  allocation:  {} on {:.0}, cap {}%",
        allocation.strategy, allocation.capital, allocation.max_weight_pct
    );
    Ok(())
}
