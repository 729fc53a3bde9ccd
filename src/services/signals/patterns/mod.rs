//! Smart-money-concept pattern detectors.
//!
//! Detectors are independent: each reads an `IndicatorFrame` and returns its
//! own observations. New detectors only need to be added to
//! [`all_detectors`].

pub mod candle_range;
pub mod fair_value_gap;
pub mod momentum;
pub mod order_block;
pub mod structure;

pub use candle_range::CandleRangeDetector;
pub use fair_value_gap::FairValueGapDetector;
pub use momentum::MomentumExtremeDetector;
pub use order_block::OrderBlockDetector;
pub use structure::StructureBreakDetector;

use super::indicators::{IndicatorFrame, IndicatorRow};
use crate::types::{PatternKind, PatternObservation, Polarity, StrategyToggles};

/// Trait for implementing pattern detectors.
pub trait Detector: Send + Sync {
    /// Unique identifier for this detector.
    fn id(&self) -> &str;

    /// Minimum number of frame rows required; fewer rows yield no observations.
    fn min_rows(&self) -> usize;

    /// Whether the operator's strategy toggles allow this detector to run.
    fn enabled(&self, _toggles: &StrategyToggles) -> bool {
        true
    }

    /// Scan the frame.
    fn detect(&self, frame: &IndicatorFrame) -> Vec<PatternObservation>;
}

/// Get all available detectors.
pub fn all_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(OrderBlockDetector::default()),
        Box::new(FairValueGapDetector::default()),
        Box::new(StructureBreakDetector::default()),
        Box::new(MomentumExtremeDetector::default()),
        Box::new(CandleRangeDetector::default()),
    ]
}

/// Run every detector the toggles allow and collect the observations.
pub fn detect_all(
    detectors: &[Box<dyn Detector>],
    frame: &IndicatorFrame,
    toggles: &StrategyToggles,
) -> Vec<PatternObservation> {
    detectors
        .iter()
        .filter(|d| d.enabled(toggles))
        .filter(|d| frame.len() >= d.min_rows())
        .flat_map(|d| d.detect(frame))
        .collect()
}

/// Observation anchored on one frame row, spanning that bar's range.
pub(crate) fn bar_observation(
    kind: PatternKind,
    polarity: Polarity,
    index: usize,
    row: &IndicatorRow,
) -> PatternObservation {
    PatternObservation {
        kind,
        polarity,
        index,
        start: row.bar.time,
        end: row.bar.time,
        low: row.bar.low,
        high: row.bar.high,
    }
}

/// Keep only the last `n` entries, preserving order.
pub(crate) fn keep_last<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    if items.len() > n {
        items.drain(..items.len() - n);
    }
    items
}
