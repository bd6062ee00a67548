//! Price history access port.

use crate::domain::error::RegimeLabError;
use crate::domain::price::{Lookback, PriceSeries};
use chrono::NaiveDate;

pub trait PriceHistoryPort {
    /// Daily closes for `symbol` within `lookback` of its newest observation.
    ///
    /// An unknown symbol or an empty window is `DataUnavailable`.
    fn fetch_price_history(
        &self,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<PriceSeries, RegimeLabError>;

    fn list_symbols(&self) -> Result<Vec<String>, RegimeLabError>;

    /// First date, last date and observation count, or `None` if unknown.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RegimeLabError>;
}
