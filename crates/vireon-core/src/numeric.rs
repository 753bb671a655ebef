//! Numeric helpers shared by the discrete and Gaussian-proxy leashes.

use ndarray::{ArrayView2, Axis};

/// Clip every entry to `floor` and normalize so the result sums to 1.
///
/// The floor keeps all-zero (or negative) inputs well defined: they come out
/// as the uniform distribution instead of dividing by zero.
pub fn to_distribution(values: &[f64], floor: f64) -> Vec<f64> {
    let clipped: Vec<f64> = values.iter().map(|&v| v.max(floor)).collect();
    let total: f64 = clipped.iter().sum();
    clipped.into_iter().map(|v| v / total).collect()
}

/// Trace of the per-feature covariance of a `[batch, dim]` array.
///
/// Each feature is centered on its batch mean and its population variance
/// (divisor = batch size) is taken; the variances are summed and the result is
/// floored at `floor` so callers never divide by a vanishing spread. An empty
/// batch returns `floor`.
pub fn covariance_trace(batch: ArrayView2<'_, f64>, floor: f64) -> f64 {
    let Some(mean) = batch.mean_axis(Axis(0)) else {
        return floor;
    };
    let centered = &batch - &mean;
    let trace = centered
        .mapv(|x| x * x)
        .mean_axis(Axis(0))
        .map_or(0.0, |var| var.sum());
    trace.max(floor)
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
