//! Break-of-structure detector.
//!
//! Compares the latest bar against the 20-bar high/low range that ended one bar
//! earlier. Always reports a single observation carrying both reference levels;
//! the polarity is neutral when price stayed inside the range.

use super::Detector;
use crate::services::signals::indicators::{rolling_max, rolling_min, IndicatorFrame};
use crate::types::{PatternKind, PatternObservation, Polarity, StrategyToggles};

pub struct StructureBreakDetector {
    window: usize,
}

impl Default for StructureBreakDetector {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl Detector for StructureBreakDetector {
    fn id(&self) -> &str {
        "structure"
    }

    fn min_rows(&self) -> usize {
        self.window + 1
    }

    fn enabled(&self, toggles: &StrategyToggles) -> bool {
        toggles.choch
    }

    fn detect(&self, frame: &IndicatorFrame) -> Vec<PatternObservation> {
        let rows = frame.rows();
        if rows.len() < self.min_rows() {
            return Vec::new();
        }

        let highs = frame.highs();
        let lows = frame.lows();
        let last = rows.len() - 1;

        let (Some(last_high), Some(last_low)) = (
            rolling_max(&highs, self.window)[last - 1],
            rolling_min(&lows, self.window)[last - 1],
        ) else {
            return Vec::new();
        };

        let latest = &rows[last].bar;
        let polarity = if latest.high > last_high {
            Polarity::Bullish
        } else if latest.low < last_low {
            Polarity::Bearish
        } else {
            Polarity::Neutral
        };

        vec![PatternObservation {
            kind: PatternKind::StructureBreak,
            polarity,
            index: last,
            start: rows[last - self.window].bar.time,
            end: latest.time,
            low: last_low,
            high: last_high,
        }]
    }
}
