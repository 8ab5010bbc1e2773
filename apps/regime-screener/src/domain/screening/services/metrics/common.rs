//! Arithmetic shared by the metric calculators.
//!
//! None of these functions panic. Undefined results are NaN, except
//! [`coverage`], which reports +∞ for a zero denominator.

/// `num / den`, NaN when the denominator is zero or either side is NaN.
#[must_use]
pub fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 || den.is_nan() || num.is_nan() {
        f64::NAN
    } else {
        num / den
    }
}

/// Coverage-style ratio: +∞ when the denominator is exactly zero.
#[must_use]
pub fn coverage(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        f64::INFINITY
    } else {
        num / den
    }
}

/// Period-over-period growth `(current - previous) / previous`.
#[must_use]
pub fn growth(current: f64, previous: f64) -> f64 {
    ratio(current - previous, previous)
}

/// Mean of the non-NaN values; NaN when there are none.
#[must_use]
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0_usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// Sample standard deviation (n − 1) of the non-NaN values; NaN below two values.
#[must_use]
pub fn sample_std(values: impl IntoIterator<Item = f64>) -> f64 {
    let observed: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if observed.len() < 2 {
        return f64::NAN;
    }
    let avg = observed.iter().sum::<f64>() / observed.len() as f64;
    let variance = observed.iter().map(|v| (v - avg).powi(2)).sum::<f64>()
        / (observed.len() - 1) as f64;
    variance.sqrt()
}

/// Consecutive differences `x[i] - x[i-1]` of a chronological sequence.
#[must_use]
pub fn diffs(chronological: &[f64]) -> Vec<f64> {
    chronological.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Consecutive growth rates `x[i] / x[i-1] - 1` of a chronological sequence.
#[must_use]
pub fn growth_rates(chronological: &[f64]) -> Vec<f64> {
    chronological.windows(2).map(|w| growth(w[1], w[0])).collect()
}
