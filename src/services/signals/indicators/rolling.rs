//! Rolling-window statistics used by the pattern detectors.

/// First difference `v[i] - v[i-1]`; the first entry is `None`.
pub fn diff(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(values.windows(2).map(|pair| Some(pair[1] - pair[0])));
    out
}

/// Sample standard deviation (n - 1 denominator) over a trailing window.
///
/// An entry is `None` until `window` defined values are available, or when the
/// window contains an undefined value.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return out;
    }

    for end in window..=values.len() {
        let slice = &values[end - window..end];
        if slice.iter().any(|v| v.is_none()) {
            continue;
        }
        let n = window as f64;
        let mean = slice.iter().flatten().sum::<f64>() / n;
        let var = slice.iter().flatten().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        out[end - 1] = Some(var.sqrt());
    }

    out
}

/// Trailing maximum over `window` values; `None` during warm-up.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_fold(values, window, f64::max)
}

/// Trailing minimum over `window` values; `None` during warm-up.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_fold(values, window, f64::min)
}

fn rolling_fold(values: &[f64], window: usize, f: fn(f64, f64) -> f64) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for end in window..=values.len() {
        out[end - 1] = values[end - window..end].iter().copied().reduce(f);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 3.0, 2.0]), vec![None, Some(2.0), Some(-1.0)]);
    }

    #[test]
    fn test_rolling_std_sample() {
        let values: Vec<Option<f64>> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .iter()
            .map(|v| Some(*v))
            .collect();
        let out = rolling_std(&values, 8);
        // Sample variance of this set is 32 / 7
        assert!((out[7].unwrap() - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(out[..7].iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rolling_std_skips_undefined() {
        let values = vec![None, Some(1.0), Some(1.0), Some(1.0)];
        let out = rolling_std(&values, 3);
        assert_eq!(out[2], None);
        assert_eq!(out[3], Some(0.0));
    }

    #[test]
    fn test_rolling_max_min() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(
            rolling_max(&values, 3),
            vec![None, None, Some(4.0), Some(4.0), Some(5.0)]
        );
        assert_eq!(
            rolling_min(&values, 3),
            vec![None, None, Some(1.0), Some(1.0), Some(1.0)]
        );
    }
}
