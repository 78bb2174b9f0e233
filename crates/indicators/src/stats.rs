//! Rolling-window statistics shared by the indicators and the detectors.
//!
//! Windows are trailing and include the current index. Results have the same
//! length as the input with `f64::NAN` wherever the window is not yet full.

/// Converts a count to `f64`.
#[inline]
#[must_use]
pub fn count_f64(n: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let value = n as f64;
    value
}

/// Mean and standard deviation of `values` with `ddof` delta degrees of freedom.
///
/// Returns `(NaN, NaN)` for an empty slice; the deviation is NaN when
/// `values.len() <= ddof`.
#[must_use]
pub fn mean_std(values: &[f64], ddof: usize) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = count_f64(values.len());
    let mean = values.iter().sum::<f64>() / n;
    if values.len() <= ddof {
        return (mean, f64::NAN);
    }
    let sq_diff: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, (sq_diff / (n - count_f64(ddof))).sqrt())
}

/// Trailing mean over `window` values; NaN until the window is full.
#[must_use]
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let len = values.len();
    let mut result = vec![f64::NAN; len];
    if window == 0 || len < window {
        return result;
    }

    for i in (window - 1)..len {
        let start = i + 1 - window;
        result[i] = values[start..=i].iter().sum::<f64>() / count_f64(window);
    }
    result
}

/// Trailing mean over up to `window` values (minimum one), so every index
/// is defined.
#[must_use]
pub fn expanding_rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let len = values.len();
    if window == 0 {
        return vec![f64::NAN; len];
    }

    let mut result = Vec::with_capacity(len);
    for i in 0..len {
        let start = (i + 1).saturating_sub(window);
        let slice = &values[start..=i];
        result.push(slice.iter().sum::<f64>() / count_f64(slice.len()));
    }
    result
}

/// Trailing standard deviation with `ddof`; NaN until the window is full.
#[must_use]
pub fn rolling_std(values: &[f64], window: usize, ddof: usize) -> Vec<f64> {
    let len = values.len();
    let mut result = vec![f64::NAN; len];
    if window == 0 || len < window {
        return result;
    }

    for i in (window - 1)..len {
        let start = i + 1 - window;
        result[i] = mean_std(&values[start..=i], ddof).1;
    }
    result
}

/// Exponential moving average with span `period`, no bias adjustment.
///
/// Seeded with the first finite value. Non-finite inputs carry the previous
/// value forward.
#[must_use]
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let len = values.len();
    let mut result = vec![f64::NAN; len];
    if period == 0 {
        return result;
    }

    let alpha = 2.0 / (count_f64(period) + 1.0);
    let mut prev = f64::NAN;

    for (i, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            if prev.is_finite() {
                result[i] = prev;
            }
            continue;
        }

        if prev.is_finite() {
            prev = alpha * value + (1.0 - alpha) * prev;
        } else {
            prev = value;
        }
        result[i] = prev;
    }
    result
}

/// Quantile `q` (0..=1) of the finite entries of `values`, linearly
/// interpolated between closest ranks.
///
/// Returns `None` when no finite values exist.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 1.0);
    let pos = q * count_f64(sorted.len() - 1);
    let lower = pos.floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (lo, hi) = (lower as usize, pos.ceil() as usize);
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_std_sample() {
        let (mean, std) = mean_std(&[1.0, 2.0, 3.0], 1);
        assert_relative_eq!(mean, 2.0);
        assert_relative_eq!(std, 1.0);
    }

    #[test]
    fn test_mean_std_single_value_sample_is_nan() {
        let (mean, std) = mean_std(&[5.0], 1);
        assert_relative_eq!(mean, 5.0);
        assert!(std.is_nan());
    }

    #[test]
    fn test_rolling_mean_warmup() {
        let result = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_relative_eq!(result[2], 2.0);
        assert_relative_eq!(result[3], 3.0);
    }

    #[test]
    fn test_expanding_rolling_mean_defined_everywhere() {
        let result = expanding_rolling_mean(&[2.0, 4.0, 6.0, 8.0], 2);
        assert_relative_eq!(result[0], 2.0);
        assert_relative_eq!(result[1], 3.0);
        assert_relative_eq!(result[2], 5.0);
        assert_relative_eq!(result[3], 7.0);
    }

    #[test]
    fn test_rolling_std_constant_is_zero() {
        let result = rolling_std(&[7.0; 6], 4, 1);
        for value in &result[3..] {
            assert_eq!(*value, 0.0);
        }
    }

    #[test]
    fn test_ema_matches_adjust_false() {
        let result = ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        let expected = [1.0, 1.5, 2.25, 3.125, 4.0625];
        for (value, exp) in result.iter().zip(expected) {
            assert_relative_eq!(*value, exp, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0, f64::NAN];
        assert_relative_eq!(quantile(&values, 0.5).unwrap(), 2.5);
        assert_relative_eq!(quantile(&values, 0.95).unwrap(), 3.85, epsilon = 1e-12);
        assert_relative_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile(&values, 1.0).unwrap(), 4.0);
    }

    #[test]
    fn test_quantile_no_finite_values() {
        assert!(quantile(&[f64::NAN, f64::INFINITY], 0.5).is_none());
        assert!(quantile(&[], 0.5).is_none());
    }
}
