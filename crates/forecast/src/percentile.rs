//! Percentiles by linear interpolation between order statistics.
//!
//! For `n` sorted values and a percentile `q` in `[0, 100]` the rank is
//! `h = (n - 1) * q / 100` and the result is
//! `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.
//! This is the "linear" rule (Hyndman & Fan type 7), the default of NumPy,
//! pandas and R. Other rules give different values near the tails, so the
//! forecast band depends on this choice.

/// Percentile `q` of an ascending, non-empty slice.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty(), "percentile of an empty sample");
    debug_assert!((0.0..=100.0).contains(&q));

    let last = sorted.len() - 1;
    let rank = last as f64 * q / 100.0;
    let lo = (rank.floor() as usize).min(last);
    let hi = (lo + 1).min(last);
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Sorts `values` in place and returns the percentile for each entry of `qs`.
pub fn percentiles(values: &mut [f64], qs: &[f64]) -> Vec<f64> {
    values.sort_unstable_by(f64::total_cmp);
    qs.iter().map(|&q| percentile_sorted(values, q)).collect()
}
