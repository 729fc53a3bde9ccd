//! Fair-value-gap (imbalance) detector.
//!
//! Compares each bar with the one before it. A gap up (low above the previous
//! high) is bullish, a gap down (high below the previous low) is bearish. The
//! newest bar is left out since the gap is not yet confirmed by a follow-up bar.

use super::{keep_last, Detector};
use crate::services::signals::indicators::IndicatorFrame;
use crate::types::{PatternKind, PatternObservation, Polarity, StrategyToggles};

pub struct FairValueGapDetector {
    max_results: usize,
}

impl Default for FairValueGapDetector {
    fn default() -> Self {
        Self { max_results: 8 }
    }
}

impl Detector for FairValueGapDetector {
    fn id(&self) -> &str {
        "fvg"
    }

    fn min_rows(&self) -> usize {
        3
    }

    fn enabled(&self, toggles: &StrategyToggles) -> bool {
        toggles.fvg
    }

    fn detect(&self, frame: &IndicatorFrame) -> Vec<PatternObservation> {
        let rows = frame.rows();
        if rows.len() < self.min_rows() {
            return Vec::new();
        }

        let mut gaps = Vec::new();
        for i in 1..rows.len() - 1 {
            let prev = &rows[i - 1].bar;
            let cur = &rows[i].bar;

            if cur.low > prev.high {
                gaps.push(PatternObservation {
                    kind: PatternKind::FairValueGap,
                    polarity: Polarity::Bullish,
                    index: i,
                    start: prev.time,
                    end: cur.time,
                    low: prev.high,
                    high: cur.low,
                });
            } else if cur.high < prev.low {
                gaps.push(PatternObservation {
                    kind: PatternKind::FairValueGap,
                    polarity: Polarity::Bearish,
                    index: i,
                    start: prev.time,
                    end: cur.time,
                    low: cur.high,
                    high: prev.low,
                });
            }
        }

        keep_last(gaps, self.max_results)
    }
}
