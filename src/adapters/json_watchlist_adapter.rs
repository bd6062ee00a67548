//! JSON file watchlist repository.
//!
//! The file holds `{"symbols": [...]}`. A missing file is created with the
//! default watchlist on first load; an unreadable or corrupt one falls back
//! to the default list without being overwritten.

use crate::domain::error::RegimeLabError;
use crate::domain::watchlist::{canonical, default_watchlist};
use crate::ports::symbol_port::SymbolRepository;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
struct WatchlistFile {
    symbols: Vec<String>,
}

pub struct JsonWatchlistAdapter {
    path: PathBuf,
}

impl JsonWatchlistAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SymbolRepository for JsonWatchlistAdapter {
    fn load_symbols(&self) -> Result<Vec<String>, RegimeLabError> {
        if !self.path.exists() {
            let defaults = default_watchlist();
            self.save_symbols(&defaults)?;
            return Ok(canonical(&defaults));
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable watchlist, using defaults");
                return Ok(canonical(&default_watchlist()));
            }
        };

        match serde_json::from_str::<WatchlistFile>(&content) {
            Ok(file) => Ok(file.symbols),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt watchlist, using defaults");
                Ok(canonical(&default_watchlist()))
            }
        }
    }

    fn save_symbols(&self, symbols: &[String]) -> Result<(), RegimeLabError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = WatchlistFile {
            symbols: canonical(symbols),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| RegimeLabError::Watchlist {
            reason: e.to_string(),
        })?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
