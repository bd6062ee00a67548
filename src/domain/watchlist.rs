//! Watchlist editing rules on top of a `SymbolRepository`.

use crate::domain::error::RegimeLabError;
use crate::domain::universe::normalize_symbol;
use crate::ports::symbol_port::SymbolRepository;
use tracing::info;

pub const DEFAULT_WATCHLIST: [&str; 5] = ["TCS.NS", "INFY.NS", "RELIANCE.NS", "HDFCBANK.NS", "ITC.NS"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(String),
    AlreadyPresent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(String),
    NotPresent(String),
}

pub fn default_watchlist() -> Vec<String> {
    DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect()
}

/// Sorted and de-duplicated, the form in which watchlists are stored.
pub fn canonical(symbols: &[String]) -> Vec<String> {
    let mut out = symbols.to_vec();
    out.sort();
    out.dedup();
    out
}

pub fn add_symbol(
    repo: &dyn SymbolRepository,
    raw: &str,
    default_suffix: &str,
) -> Result<AddOutcome, RegimeLabError> {
    let symbol = normalize_symbol(raw, default_suffix)?;
    let mut symbols = repo.load_symbols()?;
    if symbols.contains(&symbol) {
        return Ok(AddOutcome::AlreadyPresent(symbol));
    }
    symbols.push(symbol.clone());
    repo.save_symbols(&canonical(&symbols))?;
    info!(%symbol, "added to watchlist");
    Ok(AddOutcome::Added(symbol))
}

pub fn remove_symbol(
    repo: &dyn SymbolRepository,
    raw: &str,
    default_suffix: &str,
) -> Result<RemoveOutcome, RegimeLabError> {
    let symbol = normalize_symbol(raw, default_suffix)?;
    let symbols = repo.load_symbols()?;
    if !symbols.contains(&symbol) {
        return Ok(RemoveOutcome::NotPresent(symbol));
    }
    let remaining: Vec<String> = symbols.into_iter().filter(|s| *s != symbol).collect();
    repo.save_symbols(&canonical(&remaining))?;
    info!(%symbol, "removed from watchlist");
    Ok(RemoveOutcome::Removed(symbol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct MemoryRepo {
        symbols: RefCell<Vec<String>>,
    }

    impl MemoryRepo {
        fn with(symbols: &[&str]) -> Self {
            Self {
                symbols: RefCell::new(symbols.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    impl SymbolRepository for MemoryRepo {
        fn load_symbols(&self) -> Result<Vec<String>, RegimeLabError> {
            Ok(self.symbols.borrow().clone())
        }

        fn save_symbols(&self, symbols: &[String]) -> Result<(), RegimeLabError> {
            *self.symbols.borrow_mut() = symbols.to_vec();
            Ok(())
        }
    }

    #[test]
    fn add_normalizes_and_sorts() {
        let repo = MemoryRepo::with(&["TCS.NS"]);
        let outcome = add_symbol(&repo, " infy ", "NS").unwrap();
        assert_eq!(outcome, AddOutcome::Added("INFY.NS".into()));
        assert_eq!(*repo.symbols.borrow(), vec!["INFY.NS", "TCS.NS"]);
    }

    #[test]
    fn add_existing_is_noop() {
        let repo = MemoryRepo::with(&["TCS.NS"]);
        let outcome = add_symbol(&repo, "tcs.ns", "").unwrap();
        assert_eq!(outcome, AddOutcome::AlreadyPresent("TCS.NS".into()));
    }

    #[test]
    fn add_rejects_empty() {
        let repo = MemoryRepo::with(&[]);
        assert!(matches!(
            add_symbol(&repo, "   ", ""),
            Err(RegimeLabError::InvalidInput { .. })
        ));
    }

    #[test]
    fn remove_present_and_missing() {
        let repo = MemoryRepo::with(&["INFY.NS", "TCS.NS"]);
        assert_eq!(
            remove_symbol(&repo, "TCS.NS", "").unwrap(),
            RemoveOutcome::Removed("TCS.NS".into())
        );
        assert_eq!(*repo.symbols.borrow(), vec!["INFY.NS"]);
        assert_eq!(
            remove_symbol(&repo, "ITC.NS", "").unwrap(),
            RemoveOutcome::NotPresent("ITC.NS".into())
        );
    }

    #[test]
    fn canonical_sorts_and_dedups() {
        let input: Vec<String> = ["B", "A", "B"].iter().map(|s| s.to_string()).collect();
        assert_eq!(canonical(&input), vec!["A", "B"]);
    }
}
