//! Signal-derivation pipeline.
//!
//! Indicator calculations, pattern detectors and the aggregator that turns
//! them into a trade plan.

pub mod aggregator;
pub mod indicators;
pub mod patterns;

pub use aggregator::{probability_plan, score_analysis};
pub use indicators::{FrameProfile, IndicatorFrame, IndicatorRow};
pub use patterns::{all_detectors, detect_all, Detector};
