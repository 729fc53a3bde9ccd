//! Relative Strength Index (RSI) indicator.
//!
//! Measures momentum by comparing the magnitude of recent gains to recent losses.
//! Values range from 0-100:
//! - Below 30: Oversold
//! - Above 70: Overbought

/// RSI of `closes` over `period`, aligned with the input.
///
/// Initial averages are simple means of the first `period` changes, followed by
/// Wilder smoothing. The first `period` entries are `None`.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut avg_gain: f64 = gains.iter().take(period).sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses.iter().take(period).sum::<f64>() / period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    // gains[i] is the change into closes[i + 1]
    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        out[i + 1] = Some(rsi_value(avg_gain, avg_loss));
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend(count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| 100.0 + i as f64 * 1.5 + if i % 3 == 0 { -2.0 } else { 0.0 })
            .collect()
    }

    fn downtrend(count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| 200.0 - i as f64 * 1.5 + if i % 3 == 0 { 2.0 } else { 0.0 })
            .collect()
    }

    #[test]
    fn test_rsi_warmup() {
        let out = rsi(&uptrend(30), 14);
        assert!(out[..14].iter().all(|v| v.is_none()));
        assert!(out[14..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let out = rsi(&uptrend(10), 14);
        assert!(out.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rsi_uptrend_high_value() {
        let out = rsi(&uptrend(50), 14);
        let value = out.last().unwrap().unwrap();
        assert!(value > 50.0, "RSI in uptrend should be > 50, got {}", value);
    }

    #[test]
    fn test_rsi_downtrend_low_value() {
        let out = rsi(&downtrend(50), 14);
        let value = out.last().unwrap().unwrap();
        assert!(value < 50.0, "RSI in downtrend should be < 50, got {}", value);
    }

    #[test]
    fn test_rsi_only_gains_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&closes, 14);
        assert_eq!(out.last().unwrap().unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_value_range() {
        let mut closes = uptrend(40);
        closes.extend(downtrend(40));
        for value in rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
        }
    }
}
