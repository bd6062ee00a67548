//! CSV file price history adapter.
//!
//! One file per symbol at `<base_path>/<SYMBOL>.csv` with a header row. The
//! `date` and `close` columns are required; an `adj_close` (or `Adj Close`)
//! column is used instead of `close` when present. Rows with an empty or
//! `null` price are dropped.

use crate::domain::error::RegimeLabError;
use crate::domain::price::{Lookback, PricePoint, PriceSeries};
use crate::ports::price_port::PriceHistoryPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Every row of the symbol's file, sorted by date. An unreadable or
    /// malformed file is `InvalidSeries` for that symbol only.
    fn read_points(&self, symbol: &str) -> Result<Vec<PricePoint>, RegimeLabError> {
        let path = self.csv_path(symbol);
        if !path.is_file() {
            return Err(RegimeLabError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("{} not found", path.display()),
            });
        }
        let invalid = |reason: String| RegimeLabError::InvalidSeries {
            symbol: symbol.to_string(),
            reason: format!("{}: {}", path.display(), reason),
        };

        let content =
            fs::read_to_string(&path).map_err(|e| invalid(format!("read failed: {e}")))?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| invalid(format!("header error: {e}")))?
            .clone();
        let column = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.to_lowercase().replace(' ', "_");
                names.contains(&h.as_str())
            })
        };

        let date_col =
            column(&["date"]).ok_or_else(|| invalid("missing date column".to_string()))?;
        let price_col = column(&["adj_close", "adjclose"])
            .or_else(|| column(&["close"]))
            .ok_or_else(|| invalid("missing close column".to_string()))?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| invalid(format!("parse error: {e}")))?;

            let date_str = record.get(date_col).unwrap_or_default();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| invalid(format!("invalid date '{date_str}': {e}")))?;

            let price_str = record.get(price_col).unwrap_or_default();
            if price_str.is_empty() || price_str.eq_ignore_ascii_case("null") {
                debug!(%symbol, %date, "dropping row without price");
                continue;
            }
            let close: f64 = price_str
                .parse()
                .map_err(|e| invalid(format!("invalid price '{price_str}' on {date}: {e}")))?;

            points.push(PricePoint { date, close });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

impl PriceHistoryPort for CsvAdapter {
    fn fetch_price_history(
        &self,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<PriceSeries, RegimeLabError> {
        let points = self.read_points(symbol)?;
        let series = PriceSeries::new(symbol, points)?.within(lookback);
        if series.is_empty() {
            return Err(RegimeLabError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no rows in file".into(),
            });
        }
        debug!(%symbol, observations = series.len(), %lookback, "loaded csv history");
        Ok(series)
    }

    fn list_symbols(&self) -> Result<Vec<String>, RegimeLabError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| RegimeLabError::Database {
            reason: format!("failed to list {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RegimeLabError> {
        let points = match self.read_points(symbol) {
            Ok(points) => points,
            Err(RegimeLabError::DataUnavailable { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, points.len()))),
            _ => Ok(None),
        }
    }
}
