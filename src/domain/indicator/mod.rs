//! Technical indicator engine.
//!
//! - `IndicatorPoint`: moving average and RSI for one date, `None` until warm
//! - `IndicatorFrame`: the per-date frame computed from a `PriceSeries`
//!
//! Every value at index i depends only on closes `0..=i`.

pub mod rsi;
pub mod sma;

use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub moving_average: Option<f64>,
    pub rsi: Option<f64>,
}

impl IndicatorPoint {
    pub fn is_defined(&self) -> bool {
        self.moving_average.is_some() && self.rsi.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub ma_window: usize,
    pub rsi_window: usize,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorFrame {
    pub fn compute(series: &PriceSeries, ma_window: usize, rsi_window: usize) -> Self {
        let closes = series.closes();
        let sma = sma::calculate_sma(&closes, ma_window);
        let rsi = rsi::calculate_rsi(&closes, rsi_window);

        let points = series
            .points()
            .iter()
            .zip(sma)
            .zip(rsi)
            .map(|((p, moving_average), rsi)| IndicatorPoint {
                date: p.date,
                close: p.close,
                moving_average,
                rsi,
            })
            .collect();

        Self {
            ma_window,
            rsi_window,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorPoint> {
        self.points.get(index)
    }

    pub fn last(&self) -> Option<&IndicatorPoint> {
        self.points.last()
    }

    /// Index of the first point with both indicators defined.
    pub fn first_defined(&self) -> Option<usize> {
        self.points.iter().position(IndicatorPoint::is_defined)
    }

    /// Minimum observations before both indicators can be defined.
    pub fn warmup(ma_window: usize, rsi_window: usize) -> usize {
        ma_window.max(rsi_window + 1)
    }
}
