//! Rule-based market regime classifier.
//!
//! Rules, first match wins:
//! 1. close > MA and RSI > bullish_rsi  -> Bullish
//! 2. close < MA and RSI < bearish_rsi  -> Bearish
//! 3. otherwise                         -> Sideways
//!
//! Confidence = min(|RSI - 50| * confidence_scale, 100).

use crate::domain::error::RegimeLabError;
use crate::domain::indicator::IndicatorPoint;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RegimeLabel {
    Bullish,
    Bearish,
    Sideways,
}

impl RegimeLabel {
    pub const ALL: [RegimeLabel; 3] = [
        RegimeLabel::Bullish,
        RegimeLabel::Bearish,
        RegimeLabel::Sideways,
    ];

    /// Stable position in `ALL`, used to index confusion matrices.
    pub fn index(self) -> usize {
        match self {
            RegimeLabel::Bullish => 0,
            RegimeLabel::Bearish => 1,
            RegimeLabel::Sideways => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegimeLabel::Bullish => "Bullish",
            RegimeLabel::Bearish => "Bearish",
            RegimeLabel::Sideways => "Sideways",
        }
    }
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegimeLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bullish" => Ok(RegimeLabel::Bullish),
            "bearish" => Ok(RegimeLabel::Bearish),
            "sideways" => Ok(RegimeLabel::Sideways),
            other => Err(format!("unknown regime '{other}'")),
        }
    }
}

/// Which condition flags a classification as high risk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HighRiskRule {
    /// High risk when confidence is below `below`.
    LowConfidence { below: f64 },
    /// High risk when Bearish and either close < MA or RSI < `rsi_floor`.
    BearishBreakdown { rsi_floor: f64 },
}

impl Default for HighRiskRule {
    fn default() -> Self {
        HighRiskRule::LowConfidence { below: 40.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegimeConfig {
    pub ma_window: usize,
    pub rsi_window: usize,
    pub bullish_rsi: f64,
    pub bearish_rsi: f64,
    pub confidence_scale: f64,
    pub high_risk: HighRiskRule,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            ma_window: 20,
            rsi_window: 14,
            bullish_rsi: 55.0,
            bearish_rsi: 45.0,
            confidence_scale: 2.0,
            high_risk: HighRiskRule::default(),
        }
    }
}

/// Fully defined classifier input for one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierInputs {
    pub close: f64,
    pub moving_average: f64,
    pub rsi: f64,
}

impl ClassifierInputs {
    pub fn new(close: f64, moving_average: f64, rsi: f64) -> Result<Self, RegimeLabError> {
        if !(close.is_finite() && moving_average.is_finite() && rsi.is_finite()) {
            return Err(RegimeLabError::ContractViolation {
                reason: format!(
                    "non-finite inputs: close={close}, moving_average={moving_average}, rsi={rsi}"
                ),
            });
        }
        Ok(Self {
            close,
            moving_average,
            rsi,
        })
    }

    /// Inputs from a frame point. Fails while the point is still warming up.
    pub fn from_point(point: &IndicatorPoint) -> Result<Self, RegimeLabError> {
        match (point.moving_average, point.rsi) {
            (Some(ma), Some(rsi)) => Self::new(point.close, ma, rsi),
            _ => Err(RegimeLabError::ContractViolation {
                reason: format!("indicators undefined on {}", point.date),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub regime: RegimeLabel,
    pub confidence: f64,
    pub high_risk: bool,
    pub explanation: Vec<String>,
}

pub fn classify(inputs: &ClassifierInputs, config: &RegimeConfig) -> Classification {
    let ClassifierInputs {
        close,
        moving_average,
        rsi,
    } = *inputs;

    let mut explanation = Vec::with_capacity(4);

    let regime = if close > moving_average && rsi > config.bullish_rsi {
        explanation.push(format!(
            "Price is above {}-day moving average",
            config.ma_window
        ));
        explanation.push(format!(
            "RSI is above {}, indicating momentum strength",
            config.bullish_rsi
        ));
        RegimeLabel::Bullish
    } else if close < moving_average && rsi < config.bearish_rsi {
        explanation.push(format!(
            "Price is below {}-day moving average",
            config.ma_window
        ));
        explanation.push(format!(
            "RSI is below {}, indicating weakness",
            config.bearish_rsi
        ));
        RegimeLabel::Bearish
    } else {
        explanation.push("Price and RSI show mixed signals".to_string());
        RegimeLabel::Sideways
    };

    let confidence = ((rsi - 50.0).abs() * config.confidence_scale).min(100.0);
    if confidence >= 70.0 {
        explanation.push("Strong deviation from neutral RSI (high confidence)".to_string());
    } else if confidence >= 40.0 {
        explanation.push("Moderate RSI conviction".to_string());
    } else {
        explanation.push("RSI close to neutral (low confidence)".to_string());
    }

    let high_risk = match config.high_risk {
        HighRiskRule::LowConfidence { below } => confidence < below,
        HighRiskRule::BearishBreakdown { rsi_floor } => {
            regime == RegimeLabel::Bearish && (close < moving_average || rsi < rsi_floor)
        }
    };
    if high_risk {
        explanation.push(match config.high_risk {
            HighRiskRule::LowConfidence { .. } => "Low confidence increases risk".to_string(),
            HighRiskRule::BearishBreakdown { .. } => {
                "Bearish breakdown below trend increases risk".to_string()
            }
        });
    }

    Classification {
        regime,
        confidence,
        high_risk,
        explanation,
    }
}
