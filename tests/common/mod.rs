#![allow(dead_code)]

use chrono::NaiveDate;
use regimelab::domain::error::RegimeLabError;
use regimelab::domain::price::{Lookback, PricePoint, PriceSeries};
use regimelab::ports::price_port::PriceHistoryPort;
use regimelab::ports::symbol_port::SymbolRepository;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockPriceHistoryPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockPriceHistoryPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.data.insert(series.symbol().to_string(), series);
        self
    }

    /// A hard (non-skippable) failure for `symbol`.
    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceHistoryPort for MockPriceHistoryPort {
    fn fetch_price_history(
        &self,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<PriceSeries, RegimeLabError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(RegimeLabError::Database {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(series) if !series.is_empty() => Ok(series.within(lookback)),
            _ => Err(RegimeLabError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "unknown symbol".into(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, RegimeLabError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RegimeLabError> {
        Ok(self.data.get(symbol).and_then(|s| {
            Some((s.first()?.date, s.last()?.date, s.len()))
        }))
    }
}

#[derive(Default)]
pub struct MemorySymbolRepository {
    pub symbols: RefCell<Vec<String>>,
}

impl MemorySymbolRepository {
    pub fn with(symbols: &[&str]) -> Self {
        Self {
            symbols: RefCell::new(symbols.iter().map(|s| s.to_string()).collect()),
        }
    }
}

impl SymbolRepository for MemorySymbolRepository {
    fn load_symbols(&self) -> Result<Vec<String>, RegimeLabError> {
        Ok(self.symbols.borrow().clone())
    }

    fn save_symbols(&self, symbols: &[String]) -> Result<(), RegimeLabError> {
        *self.symbols.borrow_mut() = symbols.to_vec();
        Ok(())
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

/// Daily series starting at `start_date()`.
pub fn make_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start_date() + chrono::Duration::days(i as i64),
            close,
        })
        .collect();
    PriceSeries::new(symbol, points).unwrap()
}

/// Oscillating series with a gentle drift; produces every regime.
pub fn wave_closes(len: usize, phase: f64, drift: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            100.0 + (t * 0.21 + phase).sin() * 9.0 + (t * 0.05).cos() * 3.0 + t * drift
        })
        .collect()
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
