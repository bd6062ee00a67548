//! SQLite price store and watchlist.
//!
//! Schema: `prices(symbol, date, close)` keyed on (symbol, date), and
//! `watchlist(symbol)`. Dates are stored as `YYYY-MM-DD` text so lexical
//! order is chronological.

use crate::domain::error::RegimeLabError;
use crate::domain::price::{Lookback, PricePoint, PriceSeries};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceHistoryPort;
use crate::ports::symbol_port::SymbolRepository;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> RegimeLabError {
    RegimeLabError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> RegimeLabError {
    RegimeLabError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            text.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, RegimeLabError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| RegimeLabError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).clamp(1, 64) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, RegimeLabError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_err)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, RegimeLabError> {
        self.pool.get().map_err(pool_err)
    }

    pub fn initialize_schema(&self) -> Result<(), RegimeLabError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS prices (
                    symbol TEXT NOT NULL,
                    date TEXT NOT NULL,
                    close REAL NOT NULL,
                    PRIMARY KEY (symbol, date)
                );
                CREATE INDEX IF NOT EXISTS idx_prices_date ON prices(date);
                CREATE TABLE IF NOT EXISTS watchlist (
                    symbol TEXT PRIMARY KEY
                );",
            )
            .map_err(query_err)
    }

    /// Upsert every point of `series`.
    pub fn insert_series(&self, series: &PriceSeries) -> Result<(), RegimeLabError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for point in series.points() {
            tx.execute(
                "INSERT OR REPLACE INTO prices (symbol, date, close) VALUES (?1, ?2, ?3)",
                params![
                    series.symbol(),
                    point.date.format(DATE_FORMAT).to_string(),
                    point.close
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        debug!(symbol = series.symbol(), rows = series.len(), "stored series");
        Ok(())
    }
}

impl PriceHistoryPort for SqliteAdapter {
    fn fetch_price_history(
        &self,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<PriceSeries, RegimeLabError> {
        let conn = self.conn()?;

        let last: Option<String> = conn
            .query_row(
                "SELECT MAX(date) FROM prices WHERE symbol = ?1",
                params![symbol],
                |row| row.get(0),
            )
            .map_err(query_err)?;
        let Some(last) = last else {
            return Err(RegimeLabError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no rows in prices table".into(),
            });
        };
        let last = parse_date(&last).map_err(query_err)?;
        let start = lookback
            .start_from(last)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();

        let mut stmt = conn
            .prepare(
                "SELECT date, close FROM prices
                 WHERE symbol = ?1 AND date >= ?2
                 ORDER BY date ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![symbol, start], |row| {
                let date: String = row.get(0)?;
                Ok(PricePoint {
                    date: parse_date(&date)?,
                    close: row.get(1)?,
                })
            })
            .map_err(query_err)?;

        let points = rows.collect::<Result<Vec<_>, _>>().map_err(query_err)?;
        PriceSeries::new(symbol, points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, RegimeLabError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM prices ORDER BY symbol")
            .map_err(query_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;
        rows.collect::<Result<Vec<String>, _>>().map_err(query_err)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RegimeLabError> {
        let conn = self.conn()?;
        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM prices WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_err)?;

        match result {
            (Some(min), Some(max), count) if count > 0 => Ok(Some((
                parse_date(&min).map_err(query_err)?,
                parse_date(&max).map_err(query_err)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}

impl SymbolRepository for SqliteAdapter {
    fn load_symbols(&self) -> Result<Vec<String>, RegimeLabError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT symbol FROM watchlist ORDER BY symbol")
            .map_err(query_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;
        rows.collect::<Result<Vec<String>, _>>().map_err(query_err)
    }

    fn save_symbols(&self, symbols: &[String]) -> Result<(), RegimeLabError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;
        tx.execute("DELETE FROM watchlist", []).map_err(query_err)?;
        for symbol in symbols {
            tx.execute(
                "INSERT OR IGNORE INTO watchlist (symbol) VALUES (?1)",
                params![symbol],
            )
            .map_err(query_err)?;
        }
        tx.commit().map_err(query_err)
    }
}
