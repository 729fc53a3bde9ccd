//! Momentum-extreme ("payapa") detector: RSI extreme against the EMA(20) side.

use super::{bar_observation, Detector};
use crate::services::signals::indicators::IndicatorFrame;
use crate::types::{PatternKind, PatternObservation, Polarity};

pub struct MomentumExtremeDetector {
    oversold: f64,
    overbought: f64,
}

impl Default for MomentumExtremeDetector {
    fn default() -> Self {
        Self {
            oversold: 35.0,
            overbought: 65.0,
        }
    }
}

impl Detector for MomentumExtremeDetector {
    fn id(&self) -> &str {
        "payapa"
    }

    fn min_rows(&self) -> usize {
        1
    }

    fn detect(&self, frame: &IndicatorFrame) -> Vec<PatternObservation> {
        let Some(row) = frame.last() else {
            return Vec::new();
        };
        let index = frame.len() - 1;

        let polarity = if row.rsi14 < self.oversold && row.bar.close > row.ema20 {
            Polarity::Bullish
        } else if row.rsi14 > self.overbought && row.bar.close < row.ema20 {
            Polarity::Bearish
        } else {
            return Vec::new();
        };

        vec![bar_observation(PatternKind::MomentumExtreme, polarity, index, row)]
    }
}
