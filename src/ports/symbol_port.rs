//! Watchlist persistence port.

use crate::domain::error::RegimeLabError;

pub trait SymbolRepository {
    fn load_symbols(&self) -> Result<Vec<String>, RegimeLabError>;
    fn save_symbols(&self, symbols: &[String]) -> Result<(), RegimeLabError>;
}
