//! Portfolio health score over a set of analysed instruments.
//!
//! Points per instrument: Bullish +20, Sideways +10, confidence >= 80 +10,
//! confidence >= 60 +5, high risk -10. The score is expressed as a percentage
//! of 30 points per instrument and clamped to 0..=100.

use crate::domain::analysis::AnalysisResult;
use crate::domain::regime::RegimeLabel;
use serde::Serialize;
use std::fmt;

const MAX_POINTS_PER_INSTRUMENT: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthBand {
    Strong,
    Moderate,
    Weak,
}

impl fmt::Display for HealthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthBand::Strong => write!(f, "Strong"),
            HealthBand::Moderate => write!(f, "Moderate"),
            HealthBand::Weak => write!(f, "Weak"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthScore {
    pub score: u8,
    pub band: HealthBand,
}

fn points(result: &AnalysisResult) -> i64 {
    let mut points = match result.regime {
        RegimeLabel::Bullish => 20,
        RegimeLabel::Sideways => 10,
        RegimeLabel::Bearish => 0,
    };
    if result.confidence >= 80.0 {
        points += 10;
    } else if result.confidence >= 60.0 {
        points += 5;
    }
    if result.high_risk {
        points -= 10;
    }
    points
}

pub fn portfolio_health(results: &[AnalysisResult]) -> HealthScore {
    if results.is_empty() {
        return HealthScore {
            score: 0,
            band: HealthBand::Weak,
        };
    }

    let total: i64 = results.iter().map(points).sum();
    let max = MAX_POINTS_PER_INSTRUMENT * results.len() as i64;
    let score = ((total as f64 / max as f64) * 100.0).trunc().clamp(0.0, 100.0) as u8;

    let band = if score >= 75 {
        HealthBand::Strong
    } else if score >= 50 {
        HealthBand::Moderate
    } else {
        HealthBand::Weak
    };

    HealthScore { score, band }
}
