//! Period-over-period percent change.

/// Simple return `(c[i] - c[i-1]) / c[i-1]`. Undefined on the first value and
/// wherever the previous value is zero.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    for pair in values.windows(2) {
        if pair[0] == 0.0 {
            out.push(None);
        } else {
            out.push(Some((pair[1] - pair[0]) / pair[0]));
        }
    }
    out
}
