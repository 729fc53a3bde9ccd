//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! - MACD Line = EMA(12) - EMA(26)
//! - Signal Line = EMA(9) of MACD Line
//! - Histogram = MACD Line - Signal Line

use super::ema::{ema, ema_defined};

/// Aligned MACD columns.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

impl MacdSeries {
    pub fn histogram(&self) -> Vec<Option<f64>> {
        self.line
            .iter()
            .zip(&self.signal)
            .map(|(l, s)| Some((*l)? - (*s)?))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MacdParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdParams {
    /// Index of the first row with a defined signal line.
    pub fn warmup(&self) -> usize {
        self.slow_period.max(self.fast_period) + self.signal_period - 2
    }
}

pub fn macd(closes: &[f64], params: MacdParams) -> MacdSeries {
    let fast = ema(closes, params.fast_period);
    let slow = ema(closes, params.slow_period);

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_defined(&line, params.signal_period);

    MacdSeries { line, signal }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_warmup_alignment() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let params = MacdParams::default();
        let out = macd(&closes, params);

        assert!(out.line[..25].iter().all(|v| v.is_none()));
        assert!(out.line[25].is_some());
        assert_eq!(params.warmup(), 33);
        assert!(out.signal[..33].iter().all(|v| v.is_none()));
        assert!(out.signal[33..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let out = macd(&closes, MacdParams::default());
        assert!(out.line.last().unwrap().unwrap() > 0.0);
        assert!(out.histogram().last().unwrap().is_some());
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let closes = vec![50.0; 60];
        let out = macd(&closes, MacdParams::default());
        assert!(out.line.last().unwrap().unwrap().abs() < 1e-12);
        assert!(out.signal.last().unwrap().unwrap().abs() < 1e-12);
    }
}
