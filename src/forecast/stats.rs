//! Always-present statistics primitives for the forecasting engine.
//!
//! Plain O(n) passes over slices; no numeric backend to probe for, so
//! thresholds and fallback formulas behave identically everywhere.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Least-squares linear trend over `values` indexed 0..n. Returns
/// (slope, intercept), or None when the fit is undefined (fewer than two
/// points) or numerically degenerate.
pub fn linear_trend(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = mean(values);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }
    Some((slope, intercept))
}

/// Exponentially weighted level of the series: newer points dominate.
/// Returns None for an empty input.
pub fn ewma(values: &[f64], alpha: f64) -> Option<f64> {
    let mut iter = values.iter();
    let mut level = *iter.next()?;
    for &v in iter {
        level = alpha * v + (1.0 - alpha) * level;
    }
    Some(level)
}
