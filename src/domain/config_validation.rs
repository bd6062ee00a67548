//! Configuration validation.
//!
//! Validates every section before a command runs. Missing keys fall back to
//! the same defaults the config builders use.

use crate::domain::allocation::AllocationStrategy;
use crate::domain::error::RegimeLabError;
use crate::domain::price::Lookback;
use crate::domain::regime::RegimeLabel;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_HORIZONS: [usize; 3] = [5, 10, 20];

const INT_KEYS: &[(&str, &str)] = &[
    ("indicators", "ma_window"),
    ("indicators", "rsi_window"),
    ("regime", "min_observations"),
    ("risk", "min_observations"),
    ("backtest", "warm_up"),
    ("backtest", "min_observations"),
    ("sqlite", "pool_size"),
];

const FLOAT_KEYS: &[(&str, &str)] = &[
    ("regime", "bullish_rsi"),
    ("regime", "bearish_rsi"),
    ("regime", "confidence_scale"),
    ("regime", "high_risk_confidence"),
    ("regime", "bearish_rsi_floor"),
    ("risk", "risk_free_rate"),
    ("backtest", "bullish_threshold"),
    ("backtest", "bearish_threshold"),
    ("allocation", "capital"),
    ("allocation", "max_weight"),
    ("screen", "rsi_min"),
    ("screen", "rsi_max"),
];

const BOOL_KEYS: &[(&str, &str)] = &[("screen", "include_high_risk")];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), RegimeLabError> {
    validate_value_types(config)?;
    validate_data(config)?;
    validate_indicators(config)?;
    validate_regime(config)?;
    validate_risk(config)?;
    validate_backtest(config)?;
    validate_allocation(config)?;
    validate_screen(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> RegimeLabError {
    RegimeLabError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Typed getters fall back to their default on a value that does not parse,
/// so a present but malformed value is reported here.
fn validate_value_types(config: &dyn ConfigPort) -> Result<(), RegimeLabError> {
    for &(section, key) in INT_KEYS {
        if let Some(value) = config.get_string(section, key) {
            value
                .parse::<i64>()
                .map_err(|_| invalid(section, key, format!("'{value}' is not a whole number")))?;
        }
    }
    for &(section, key) in FLOAT_KEYS {
        if let Some(value) = config.get_string(section, key) {
            match value.parse::<f64>() {
                Ok(v) if v.is_finite() => {}
                _ => return Err(invalid(section, key, format!("'{value}' is not a number"))),
            }
        }
    }
    for &(section, key) in BOOL_KEYS {
        if let Some(value) = config.get_string(section, key) {
            if !matches!(
                value.to_lowercase().as_str(),
                "true" | "false" | "yes" | "no" | "on" | "off" | "1" | "0"
            ) {
                return Err(invalid(section, key, format!("'{value}' is not a boolean")));
            }
        }
    }
    Ok(())
}

/// `5,10,20` -> `[5, 10, 20]`. Exactly three positive integers.
pub fn parse_horizons(value: &str) -> Result<[usize; 3], String> {
    let parsed: Vec<usize> = value
        .split(',')
        .map(|t| {
            t.trim()
                .parse::<usize>()
                .map_err(|_| format!("'{}' is not a whole number", t.trim()))
        })
        .collect::<Result<_, _>>()?;

    let horizons: [usize; 3] = parsed
        .try_into()
        .map_err(|v: Vec<usize>| format!("expected 3 horizons, got {}", v.len()))?;
    if horizons.contains(&0) {
        return Err("horizons must be positive".to_string());
    }
    Ok(horizons)
}

pub fn read_horizons(config: &dyn ConfigPort) -> Result<[usize; 3], RegimeLabError> {
    match config.get_string("backtest", "horizons") {
        None => Ok(DEFAULT_HORIZONS),
        Some(s) => parse_horizons(&s).map_err(|reason| invalid("backtest", "horizons", reason)),
    }
}

pub fn read_lookback(
    config: &dyn ConfigPort,
    section: &str,
    default: Lookback,
) -> Result<Lookback, RegimeLabError> {
    match config.get_string(section, "lookback") {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|reason: String| invalid(section, "lookback", reason)),
    }
}

pub fn read_strategy(config: &dyn ConfigPort) -> Result<AllocationStrategy, RegimeLabError> {
    match config.get_string("allocation", "strategy") {
        None => Ok(AllocationStrategy::RiskAdjusted),
        Some(s) => s
            .parse()
            .map_err(|reason: String| invalid("allocation", "strategy", reason)),
    }
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), RegimeLabError> {
    match config.get_string("data", "source").as_deref().map(str::trim) {
        None | Some("csv") | Some("sqlite") => {}
        Some(other) => {
            return Err(invalid(
                "data",
                "source",
                format!("unknown source '{other}', expected csv or sqlite"),
            ));
        }
    }
    read_lookback(config, "data", Lookback::Years(2))?;
    Ok(())
}

fn validate_indicators(config: &dyn ConfigPort) -> Result<(), RegimeLabError> {
    for (key, default) in [("ma_window", 20), ("rsi_window", 14)] {
        if config.get_int("indicators", key, default) <= 0 {
            return Err(invalid("indicators", key, format!("{key} must be positive")));
        }
    }
    Ok(())
}

fn validate_regime(config: &dyn ConfigPort) -> Result<(), RegimeLabError> {
    let bullish = config.get_double("regime", "bullish_rsi", 55.0);
    let bearish = config.get_double("regime", "bearish_rsi", 45.0);

    for (key, value) in [("bullish_rsi", bullish), ("bearish_rsi", bearish)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid("regime", key, format!("{key} must be between 0 and 100")));
        }
    }
    if bullish <= bearish {
        return Err(invalid(
            "regime",
            "bullish_rsi",
            "bullish_rsi must be greater than bearish_rsi",
        ));
    }

    if config.get_double("regime", "confidence_scale", 2.0) < 0.0 {
        return Err(invalid(
            "regime",
            "confidence_scale",
            "confidence_scale must be non-negative",
        ));
    }

    match config
        .get_string("regime", "high_risk_rule")
        .as_deref()
        .map(str::trim)
    {
        None | Some("confidence") | Some("bearish-breakdown") => {}
        Some(other) => {
            return Err(invalid(
                "regime",
                "high_risk_rule",
                format!("unknown rule '{other}', expected confidence or bearish-breakdown"),
            ));
        }
    }

    if config.get_int("regime", "min_observations", 60) <= 0 {
        return Err(invalid(
            "regime",
            "min_observations",
            "min_observations must be positive",
        ));
    }
    Ok(())
}

fn validate_risk(config: &dyn ConfigPort) -> Result<(), RegimeLabError> {
    let value = config.get_double("risk", "risk_free_rate", 0.065);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "risk",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    if config.get_int("risk", "min_observations", 30) < 2 {
        return Err(invalid(
            "risk",
            "min_observations",
            "min_observations must be at least 2",
        ));
    }
    read_lookback(config, "risk", Lookback::Years(3))?;
    Ok(())
}

fn validate_backtest(config: &dyn ConfigPort) -> Result<(), RegimeLabError> {
    read_horizons(config)?;

    let warm_up = config.get_int("backtest", "warm_up", 60);
    let ma = config.get_int("indicators", "ma_window", 20);
    let rsi = config.get_int("indicators", "rsi_window", 14);
    if warm_up < ma.max(rsi) {
        return Err(invalid(
            "backtest",
            "warm_up",
            format!("warm_up must be at least the largest indicator window ({})", ma.max(rsi)),
        ));
    }

    let bullish = config.get_double("backtest", "bullish_threshold", 1.0);
    let bearish = config.get_double("backtest", "bearish_threshold", -1.0);
    if bullish < bearish {
        return Err(invalid(
            "backtest",
            "bullish_threshold",
            "bullish_threshold must not be below bearish_threshold",
        ));
    }
    Ok(())
}

fn validate_allocation(config: &dyn ConfigPort) -> Result<(), RegimeLabError> {
    read_strategy(config)?;

    if config.get_double("allocation", "capital", 500_000.0) <= 0.0 {
        return Err(invalid("allocation", "capital", "capital must be positive"));
    }

    let max_weight = config.get_double("allocation", "max_weight", 40.0);
    if max_weight <= 0.0 || max_weight > 100.0 {
        return Err(invalid(
            "allocation",
            "max_weight",
            "max_weight must be in (0, 100]",
        ));
    }
    Ok(())
}

fn validate_screen(config: &dyn ConfigPort) -> Result<(), RegimeLabError> {
    if let Some(states) = config.get_string("screen", "states") {
        for state in states.split(',') {
            state
                .parse::<RegimeLabel>()
                .map_err(|reason| invalid("screen", "states", reason))?;
        }
    }

    let rsi_min = config.get_double("screen", "rsi_min", 40.0);
    let rsi_max = config.get_double("screen", "rsi_max", 70.0);
    for (key, value) in [("rsi_min", rsi_min), ("rsi_max", rsi_max)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid("screen", key, format!("{key} must be between 0 and 100")));
        }
    }
    if rsi_min > rsi_max {
        return Err(invalid("screen", "rsi_min", "rsi_min must not exceed rsi_max"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(ini: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(ini).unwrap()
    }

    #[test]
    fn empty_config_uses_valid_defaults() {
        assert!(validate_config(&config("")).is_ok());
    }

    #[test]
    fn parse_horizons_cases() {
        assert_eq!(parse_horizons("5, 10, 20"), Ok([5, 10, 20]));
        assert!(parse_horizons("5,10").is_err());
        assert!(parse_horizons("5,10,20,60").is_err());
        assert!(parse_horizons("0,10,20").is_err());
        assert!(parse_horizons("5,x,20").is_err());
    }

    #[test]
    fn rejects_inverted_rsi_thresholds() {
        let err = validate_config(&config("[regime]\nbullish_rsi = 40\nbearish_rsi = 60\n"))
            .unwrap_err();
        assert!(matches!(err, RegimeLabError::ConfigInvalid { key, .. } if key == "bullish_rsi"));
    }

    #[test]
    fn rejects_warm_up_below_window() {
        let err = validate_config(&config("[indicators]\nma_window = 50\n[backtest]\nwarm_up = 30\n"))
            .unwrap_err();
        assert!(matches!(err, RegimeLabError::ConfigInvalid { key, .. } if key == "warm_up"));
    }

    #[test]
    fn rejects_values_that_do_not_parse() {
        for (ini, bad_key) in [
            ("[allocation]\ncapital = 5O0000\n", "capital"),
            ("[indicators]\nma_window = twenty\n", "ma_window"),
            ("[indicators]\nrsi_window = 14.5\n", "rsi_window"),
            ("[risk]\nrisk_free_rate = 6.5%\n", "risk_free_rate"),
            ("[regime]\nconfidence_scale = inf\n", "confidence_scale"),
            ("[screen]\ninclude_high_risk = maybe\n", "include_high_risk"),
        ] {
            let err = validate_config(&config(ini)).unwrap_err();
            assert!(
                matches!(&err, RegimeLabError::ConfigInvalid { key, .. } if key == bad_key),
                "{ini}: {err}"
            );
        }
        assert!(validate_config(&config("[allocation]\ncapital = 250000\n[screen]\ninclude_high_risk = on\n")).is_ok());
    }

    #[test]
    fn screen_section() {
        assert!(validate_config(&config("[screen]\nstates = bullish, sideways\nrsi_min = 30\n")).is_ok());
        let err = validate_config(&config("[screen]\nstates = up\n")).unwrap_err();
        assert!(matches!(err, RegimeLabError::ConfigInvalid { key, .. } if key == "states"));
        let err = validate_config(&config("[screen]\nrsi_min = 80\nrsi_max = 60\n")).unwrap_err();
        assert!(matches!(err, RegimeLabError::ConfigInvalid { key, .. } if key == "rsi_min"));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(validate_config(&config("[allocation]\nstrategy = kelly\n")).is_err());
        assert!(validate_config(&config("[regime]\nhigh_risk_rule = vibes\n")).is_err());
        assert!(validate_config(&config("[data]\nsource = parquet\n")).is_err());
        assert!(validate_config(&config("[data]\nlookback = 3w\n")).is_err());
    }

    #[test]
    fn rejects_bad_allocation_numbers() {
        assert!(validate_config(&config("[allocation]\ncapital = 0\n")).is_err());
        assert!(validate_config(&config("[allocation]\nmax_weight = 120\n")).is_err());
    }

    #[test]
    fn rejects_risk_free_rate_out_of_range() {
        let err = validate_config(&config("[risk]\nrisk_free_rate = 1.5\n")).unwrap_err();
        assert!(matches!(err, RegimeLabError::ConfigInvalid { section, .. } if section == "risk"));
    }
}
