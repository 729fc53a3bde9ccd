//! Order-block detector.
//!
//! A bar is an order block when the next bar closes above its high (a
//! displacement breakout).

use super::{bar_observation, keep_last, Detector};
use crate::services::signals::indicators::IndicatorFrame;
use crate::types::{PatternKind, PatternObservation, Polarity, StrategyToggles};

pub struct OrderBlockDetector {
    /// Bars skipped at the start of the frame.
    skip: usize,
    max_results: usize,
}

impl Default for OrderBlockDetector {
    fn default() -> Self {
        Self {
            skip: 5,
            max_results: 6,
        }
    }
}

impl Detector for OrderBlockDetector {
    fn id(&self) -> &str {
        "order_blocks"
    }

    fn min_rows(&self) -> usize {
        self.skip + 2
    }

    fn enabled(&self, toggles: &StrategyToggles) -> bool {
        toggles.order_blocks
    }

    fn detect(&self, frame: &IndicatorFrame) -> Vec<PatternObservation> {
        let rows = frame.rows();
        if rows.len() < self.min_rows() {
            return Vec::new();
        }

        let mut found = Vec::new();
        for i in self.skip..rows.len() - 1 {
            let bar = &rows[i].bar;
            let next = &rows[i + 1].bar;
            if bar.body() > 0.0 && next.close > bar.high {
                let polarity = if bar.is_bearish() {
                    Polarity::Bearish
                } else {
                    Polarity::Bullish
                };
                found.push(bar_observation(PatternKind::OrderBlock, polarity, i, &rows[i]));
            }
        }

        keep_last(found, self.max_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::patterns::test_support::{flat_frame, frame_with_tail};

    #[test]
    fn test_flat_market_has_no_order_blocks() {
        let frame = flat_frame(100.0, 30);
        assert!(OrderBlockDetector::default().detect(&frame).is_empty());
    }

    #[test]
    fn test_breakout_after_bearish_bar() {
        let frame = frame_with_tail(
            100.0,
            &[(100.3, 100.4, 99.5, 99.8), (99.9, 101.2, 99.8, 101.0)],
        );
        let found = OrderBlockDetector::default().detect(&frame);
        assert_eq!(found.len(), 1);
        let ob = &found[0];
        assert_eq!(ob.kind, PatternKind::OrderBlock);
        assert_eq!(ob.polarity, Polarity::Bearish);
        assert_eq!(ob.index, 11);
        assert_eq!(ob.high, 100.4);
        assert_eq!(ob.low, 99.5);
    }

    #[test]
    fn test_breakout_after_bullish_bar() {
        let frame = frame_with_tail(
            100.0,
            &[(99.8, 100.4, 99.7, 100.3), (100.3, 101.0, 100.2, 100.9)],
        );
        let found = OrderBlockDetector::default().detect(&frame);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].polarity, Polarity::Bullish);
    }

    #[test]
    fn test_doji_is_not_an_order_block() {
        let frame = frame_with_tail(
            100.0,
            &[(100.0, 100.4, 99.6, 100.0), (100.0, 101.0, 99.9, 100.9)],
        );
        assert!(OrderBlockDetector::default().detect(&frame).is_empty());
    }

    #[test]
    fn test_keeps_last_six_most_recent_last() {
        // Ten consecutive breakouts: every bar closes above the previous high
        let tail: Vec<(f64, f64, f64, f64)> = (0..10)
            .map(|k| {
                let base = 100.0 + k as f64;
                (base, base + 0.6, base - 0.2, base + 0.5)
            })
            .collect();
        let frame = frame_with_tail(100.0, &tail);
        let found = OrderBlockDetector::default().detect(&frame);
        assert_eq!(found.len(), 6);
        assert!(found.windows(2).all(|w| w[0].index < w[1].index));
        assert_eq!(found.last().unwrap().index, frame.len() - 2);
    }

    #[test]
    fn test_respects_toggle() {
        let toggles = StrategyToggles {
            order_blocks: false,
            ..StrategyToggles::default()
        };
        assert!(!OrderBlockDetector::default().enabled(&toggles));
    }
}
