//! Average True Range (ATR) indicator.
//!
//! TR = max(High-Low, |High-PrevClose|, |Low-PrevClose|), averaged with
//! Wilder's smoothing.

use crate::types::Bar;

/// True range of `current` against the previous bar.
pub fn true_range(current: &Bar, previous: &Bar) -> f64 {
    let hl = current.high - current.low;
    let hc = (current.high - previous.close).abs();
    let lc = (current.low - previous.close).abs();
    hl.max(hc).max(lc)
}

/// ATR over `period`, aligned with `bars`. The first `period` entries are `None`.
pub fn atr(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    if period == 0 || bars.len() < period + 1 {
        return out;
    }

    let true_ranges: Vec<f64> = bars
        .windows(2)
        .map(|pair| true_range(&pair[1], &pair[0]))
        .collect();

    let mut atr = true_ranges.iter().take(period).sum::<f64>() / period as f64;
    out[period] = Some(atr);

    for (i, tr) in true_ranges.iter().enumerate().skip(period) {
        atr = (atr * (period - 1) as f64 + tr) / period as f64;
        out[i + 1] = Some(atr);
    }

    out
}
