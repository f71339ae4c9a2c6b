//! Windowed and running statistics over plain `f64` slices.
//!
//! The rolling kernels are O(n): each step slides the window by one element
//! with an incremental update, and every `window` steps the accumulators are
//! re-anchored with an exact pass over the current window so rounding error
//! cannot build up over long histories.

/// Running mean and sum of squared deviations (Welford).
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStat {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance (denominator `count - 1`). Zero below two observations.
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        self.m2 / (self.count - 1) as f64
    }

    pub fn sample_std(&self) -> f64 {
        self.sample_variance().sqrt()
    }
}

impl FromIterator<f64> for RunningStat {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stat = Self::new();
        for value in iter {
            stat.update(value);
        }
        stat
    }
}

/// Exact mean and sum of squared deviations of `values` (two passes).
fn mean_and_m2(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let m2 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (mean, m2)
}

/// Sample standard deviation of every full trailing window of `values`.
///
/// Output element `i` covers `values[i..i + window]`; there are
/// `values.len() - window + 1` of them, or none when the input is shorter
/// than one window. `window` must be at least 2.
pub fn rolling_sample_std(values: &[f64], window: usize) -> Vec<f64> {
    debug_assert!(window >= 2, "sample std needs a window of at least 2");
    if values.len() < window {
        return Vec::new();
    }

    let n = window as f64;
    let to_std = |m2: f64| (m2 / (n - 1.0)).sqrt();

    let mut out = Vec::with_capacity(values.len() - window + 1);
    let (mut mean, mut m2) = mean_and_m2(&values[..window]);
    out.push(to_std(m2));

    for end in window..values.len() {
        let start = end + 1 - window;
        if start % window == 0 {
            (mean, m2) = mean_and_m2(&values[start..=end]);
        } else {
            let incoming = values[end];
            let outgoing = values[start - 1];
            let delta = incoming - outgoing;
            let next_mean = mean + delta / n;
            m2 += delta * (incoming - next_mean + outgoing - mean);
            mean = next_mean;
            // Cancellation can push a zero-variance window slightly negative.
            if m2 < 0.0 {
                m2 = 0.0;
            }
        }
        out.push(to_std(m2));
    }

    out
}

/// Simple mean of every full trailing window of `values`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    debug_assert!(window >= 1);
    if values.len() < window {
        return Vec::new();
    }

    let n = window as f64;
    let mut out = Vec::with_capacity(values.len() - window + 1);
    let mut sum: f64 = values[..window].iter().sum();
    out.push(sum / n);

    for end in window..values.len() {
        let start = end + 1 - window;
        if start % window == 0 {
            sum = values[start..=end].iter().sum();
        } else {
            sum += values[end] - values[start - 1];
        }
        out.push(sum / n);
    }

    out
}
