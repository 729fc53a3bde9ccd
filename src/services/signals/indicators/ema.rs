//! Exponential Moving Average (EMA) indicator.

/// EMA of `values` over `period`, aligned with the input.
///
/// The first EMA is the SMA of the first `period` values, so the first
/// `period - 1` entries are `None`.
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let defined: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    ema_defined(&defined, period)
}

/// EMA over a column that may carry a warm-up prefix of `None`s (e.g. the MACD
/// line). Smoothing starts at the first defined value.
pub fn ema_defined(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let Some(start) = values.iter().position(|v| v.is_some()) else {
        return out;
    };
    let seed_end = start + period;
    if seed_end > values.len() || values[start..seed_end].iter().any(|v| v.is_none()) {
        return out;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // First EMA is SMA
    let sma: f64 = values[start..seed_end].iter().flatten().sum::<f64>() / period as f64;
    out[seed_end - 1] = Some(sma);

    let mut ema = sma;
    for (i, value) in values.iter().enumerate().skip(seed_end) {
        let Some(v) = value else { break };
        ema = (v - ema) * multiplier + ema;
        out[i] = Some(ema);
    }

    out
}
