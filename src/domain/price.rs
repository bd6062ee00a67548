//! Daily close-price series and lookback windows.

use crate::domain::error::RegimeLabError;
use chrono::{Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ordered daily closes for one symbol. Dates are strictly increasing and
/// every close is finite and positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, RegimeLabError> {
        let symbol = symbol.into();

        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(RegimeLabError::InvalidSeries {
                    symbol,
                    reason: format!("close {} on {} is not a positive price", point.close, point.date),
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(RegimeLabError::InvalidSeries {
                    symbol,
                    reason: format!("dates not strictly increasing at {}", point.date),
                });
            }
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The first `len` observations. Still a valid series.
    pub fn prefix(&self, len: usize) -> PriceSeries {
        PriceSeries {
            symbol: self.symbol.clone(),
            points: self.points[..len.min(self.points.len())].to_vec(),
        }
    }

    /// Observations dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> PriceSeries {
        PriceSeries {
            symbol: self.symbol.clone(),
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start)
                .copied()
                .collect(),
        }
    }

    /// Restrict to the lookback window ending at the last observation.
    pub fn within(&self, lookback: Lookback) -> PriceSeries {
        match self.last().and_then(|p| lookback.start_from(p.date)) {
            Some(start) => self.since(start),
            None => self.clone(),
        }
    }
}

/// How far back from the most recent observation to read history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Days(u32),
    Months(u32),
    Years(u32),
    Max,
}

impl Lookback {
    /// Earliest date included when the newest observation is `last`.
    /// `None` means unbounded.
    pub fn start_from(&self, last: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Lookback::Days(n) => last.checked_sub_days(chrono::Days::new(n as u64)),
            Lookback::Months(n) => last.checked_sub_months(Months::new(n)),
            Lookback::Years(n) => last.checked_sub_months(Months::new(n.saturating_mul(12))),
            Lookback::Max => None,
        }
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "max" {
            return Ok(Lookback::Max);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("missing unit in lookback '{s}'"))?;
        let (digits, unit) = s.split_at(split);
        let n: u32 = digits
            .parse()
            .map_err(|_| format!("invalid count in lookback '{s}'"))?;
        if n == 0 {
            return Err(format!("lookback '{s}' must be positive"));
        }

        match unit {
            "d" => Ok(Lookback::Days(n)),
            "mo" => Ok(Lookback::Months(n)),
            "y" => Ok(Lookback::Years(n)),
            other => Err(format!("unknown lookback unit '{other}'")),
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(n) => write!(f, "{}d", n),
            Lookback::Months(n) => write!(f, "{}mo", n),
            Lookback::Years(n) => write!(f, "{}y", n),
            Lookback::Max => write!(f, "max"),
        }
    }
}
