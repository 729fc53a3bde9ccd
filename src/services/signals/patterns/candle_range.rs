//! Candle-range flags on the latest two bars: inside bar, outside bar and
//! expansion ("big range") bar.

use super::Detector;
use crate::services::signals::indicators::{diff, rolling_std, IndicatorFrame};
use crate::types::{PatternKind, PatternObservation, Polarity, StrategyToggles};

pub struct CandleRangeDetector {
    /// Window for the standard deviation of high-to-high changes.
    std_window: usize,
    /// Range multiple of that deviation that counts as an expansion bar.
    big_range_factor: f64,
}

impl Default for CandleRangeDetector {
    fn default() -> Self {
        Self {
            std_window: 10,
            big_range_factor: 1.5,
        }
    }
}

impl Detector for CandleRangeDetector {
    fn id(&self) -> &str {
        "candle_range"
    }

    fn min_rows(&self) -> usize {
        2
    }

    fn enabled(&self, toggles: &StrategyToggles) -> bool {
        toggles.candle_range
    }

    fn detect(&self, frame: &IndicatorFrame) -> Vec<PatternObservation> {
        let rows = frame.rows();
        if rows.len() < self.min_rows() {
            return Vec::new();
        }

        let index = rows.len() - 1;
        let last = &rows[index].bar;
        let prev = &rows[index - 1].bar;

        let flag = |kind: PatternKind| PatternObservation {
            kind,
            polarity: Polarity::Neutral,
            index,
            start: prev.time,
            end: last.time,
            low: last.low,
            high: last.high,
        };

        let mut flags = Vec::new();
        if last.high < prev.high && last.low > prev.low {
            flags.push(flag(PatternKind::InsideBar));
        }
        if last.high > prev.high && last.low < prev.low {
            flags.push(flag(PatternKind::OutsideBar));
        }

        // Undefined deviation (short frame) or NaN never counts as a big range
        let deviation = rolling_std(&diff(&frame.highs()), self.std_window)
            .last()
            .copied()
            .flatten();
        if let Some(std) = deviation {
            if last.range() > self.big_range_factor * std {
                flags.push(flag(PatternKind::BigRange));
            }
        }

        flags
    }
}
