//! Core domain types and logic.

pub mod allocation;
pub mod analysis;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod health;
pub mod indicator;
pub mod metrics;
pub mod price;
pub mod regime;
pub mod screener;
pub mod universe;
pub mod watchlist;
