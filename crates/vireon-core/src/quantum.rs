//! Gaussian-proxy KL leash for vector-valued state snapshots.
//!
//! Consecutive snapshots `h_prev`, `h_t` (each `[batch, dim]`) are read as
//! samples of Gaussian "mixed states" `N(μ, Σ)` that share a covariance. The
//! per-step divergence
//!
//! ```text
//! D_KL(N(μ_t, Σ) || N(μ_prev, Σ)) = ½ · Δμᵀ Σ⁻¹ Δμ
//! ```
//!
//! is estimated with an isotropic `Σ ≈ σ²·I`, where `σ² = tr(Σ) / dim` comes
//! from the spread of the current batch. When the estimate exceeds the budget
//! the step is damped by linear interpolation,
//!
//! ```text
//! h_out = h_prev + s · (h_t - h_prev),   s = clamp(√(budget / D), min, max)
//! ```
//!
//! Since `D` scales with `‖Δμ‖²`, shrinking the step by `s` shrinks `D` by `s²`.
//! The clamp keeps the step from collapsing entirely or being amplified.

use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD, Axis, Ix1, Ix2};
use serde::{Deserialize, Serialize};

use crate::error::{self, Result};
use crate::numeric::covariance_trace;

/// Divergence floor used when deriving the damping scale.
const MIN_DIVERGENCE: f64 = 1e-12;

/// Configuration for [`GaussianDriftLeash`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianLeashConfig {
    /// Maximum allowed per-step divergence.
    pub budget: f64,
    /// Lower bound on the damping scale when the budget is exceeded.
    pub min_scale: f64,
    /// Upper bound on the damping scale (usually 1.0).
    pub max_scale: f64,
    /// Floor on the covariance trace, also added to the scalar variance.
    pub cov_reg: f64,
}

impl Default for GaussianLeashConfig {
    fn default() -> Self {
        Self {
            budget: 0.012,
            min_scale: 0.10,
            max_scale: 1.00,
            cov_reg: 1e-4,
        }
    }
}

impl GaussianLeashConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(error::config(format!(
                "budget must be positive, got {}",
                self.budget
            )));
        }
        if !(self.min_scale > 0.0 && self.min_scale <= 1.0) {
            return Err(error::config(format!(
                "min_scale must lie in (0, 1], got {}",
                self.min_scale
            )));
        }
        if !(self.max_scale >= self.min_scale && self.max_scale <= 1.0) {
            return Err(error::config(format!(
                "max_scale must lie in [min_scale, 1], got {} (min_scale {})",
                self.max_scale, self.min_scale
            )));
        }
        if !self.cov_reg.is_finite() || self.cov_reg <= 0.0 {
            return Err(error::config(format!(
                "cov_reg must be positive, got {}",
                self.cov_reg
            )));
        }
        Ok(())
    }
}

/// Per-call diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeashStats {
    /// Divergence estimate before any damping.
    pub divergence: f64,
    /// Damping scale applied; 1.0 means the step passed through.
    pub scale: f64,
}

impl LeashStats {
    /// Stats for a step that was not compared or not damped.
    pub fn passthrough(divergence: f64) -> Self {
        Self {
            divergence,
            scale: 1.0,
        }
    }

    pub fn is_damped(&self) -> bool {
        self.scale < 1.0
    }
}

/// Gaussian-proxy drift leash. Stateless: the caller threads the previous
/// snapshot from one call to the next.
#[derive(Debug, Clone, Default)]
pub struct GaussianDriftLeash {
    config: GaussianLeashConfig,
}

impl GaussianDriftLeash {
    pub fn new(config: GaussianLeashConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GaussianLeashConfig {
        &self.config
    }

    /// Leash a snapshot of shape `[batch, dim]` or `[dim]`.
    ///
    /// With no (or an empty) previous snapshot the current one is returned
    /// unchanged. The output always has the shape of `current` as given.
    pub fn apply(
        &self,
        current: ArrayViewD<'_, f64>,
        previous: Option<ArrayViewD<'_, f64>>,
    ) -> Result<(ArrayD<f64>, LeashStats)> {
        let shape = current.raw_dim();
        let current = as_batch(current)?;

        let (out, stats) = match previous {
            Some(prev) if !prev.is_empty() => self.leash(current, as_batch(prev)?)?,
            _ => (current.to_owned(), LeashStats::passthrough(0.0)),
        };
        let out = out.into_shape(shape).map_err(reshape_err)?;
        Ok((out, stats))
    }

    /// Typed 2-D entry point: same contract as [`apply`](Self::apply) for
    /// callers that already hold `[batch, dim]` arrays.
    pub fn apply_batch(
        &self,
        current: ArrayView2<'_, f64>,
        previous: Option<ArrayView2<'_, f64>>,
    ) -> Result<(Array2<f64>, LeashStats)> {
        match previous {
            Some(prev) if !prev.is_empty() => self.leash(current, prev),
            _ => Ok((current.to_owned(), LeashStats::passthrough(0.0))),
        }
    }

    /// Divergence estimate between two snapshots, without damping.
    pub fn estimate(
        &self,
        current: ArrayView2<'_, f64>,
        previous: ArrayView2<'_, f64>,
    ) -> Result<f64> {
        check_comparable(&current, &previous)?;
        let trace = covariance_trace(current, self.config.cov_reg);
        let delta = (&current - &previous)
            .mean_axis(Axis(0))
            .ok_or_else(|| error::shape("cannot compare an empty batch"))?;
        let dim = delta.len() as f64;

        let sigma2 = trace / dim;
        let inv_sigma = 1.0 / (sigma2 + self.config.cov_reg);
        let quad = delta.mapv(|d| d * d).sum() * inv_sigma;
        let divergence = 0.5 * quad;
        log::trace!(
            "gaussian proxy: trace={trace:.6e} sigma2={sigma2:.6e} divergence={divergence:.6e}"
        );
        Ok(divergence)
    }

    fn leash(
        &self,
        current: ArrayView2<'_, f64>,
        previous: ArrayView2<'_, f64>,
    ) -> Result<(Array2<f64>, LeashStats)> {
        let divergence = self.estimate(current, previous)?;
        if divergence <= self.config.budget {
            return Ok((current.to_owned(), LeashStats::passthrough(divergence)));
        }

        let raw_scale = (self.config.budget / divergence.max(MIN_DIVERGENCE)).sqrt();
        let scale = raw_scale.clamp(self.config.min_scale, self.config.max_scale);
        log::debug!(
            "drift leash engaged: divergence={divergence:.6} budget={} scale={scale:.4} (raw {raw_scale:.4})",
            self.config.budget
        );

        let out = &previous + &((&current - &previous) * scale);
        Ok((out, LeashStats { divergence, scale }))
    }
}

/// Promote `[dim]` to `[1, dim]`; pass `[batch, dim]` through; reject other ranks.
fn as_batch(h: ArrayViewD<'_, f64>) -> Result<ArrayView2<'_, f64>> {
    match h.ndim() {
        1 => {
            let row = h
                .into_dimensionality::<Ix1>()
                .map_err(|e| error::shape(e.to_string()))?;
            Ok(row.insert_axis(Axis(0)))
        }
        2 => h
            .into_dimensionality::<Ix2>()
            .map_err(|e| error::shape(e.to_string())),
        n => Err(error::shape(format!(
            "expected shape [batch, dim] or [dim], got rank {n} shape {:?}",
            h.shape()
        ))),
    }
}

fn check_comparable(current: &ArrayView2<'_, f64>, previous: &ArrayView2<'_, f64>) -> Result<()> {
    if current.shape() != previous.shape() {
        return Err(error::shape(format!(
            "current and previous must have the same shape, got {:?} and {:?}",
            current.shape(),
            previous.shape()
        )));
    }
    if current.is_empty() {
        return Err(error::shape(format!(
            "cannot compare empty batches of shape {:?}",
            current.shape()
        )));
    }
    Ok(())
}

fn reshape_err(e: ndarray::ShapeError) -> crate::LeashError {
    error::shape(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array2, Array3, array};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn leash_with_budget(budget: f64) -> GaussianDriftLeash {
        GaussianDriftLeash::new(GaussianLeashConfig {
            budget,
            ..Default::default()
        })
        .unwrap()
    }

    fn uniform_batch(rng: &mut StdRng, rows: usize, cols: usize, spread: f64) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |_| rng.random_range(-spread..spread))
    }

    fn norm(a: &Array2<f64>) -> f64 {
        a.mapv(|x| x * x).sum().sqrt()
    }

    #[test]
    fn first_step_passthrough() {
        let leash = leash_with_budget(0.012);
        let h = Array2::<f64>::zeros((4, 16)).into_dyn();
        let (out, stats) = leash.apply(h.view(), None).unwrap();
        assert_eq!(out, h);
        assert_eq!(stats.divergence, 0.0);
        assert_eq!(stats.scale, 1.0);
    }

    #[test]
    fn empty_previous_counts_as_absent() {
        let leash = leash_with_budget(0.012);
        let h = array![[1.0, 2.0]].into_dyn();
        let empty = Array2::<f64>::zeros((0, 2)).into_dyn();
        let (out, stats) = leash.apply(h.view(), Some(empty.view())).unwrap();
        assert_eq!(out, h);
        assert_eq!(stats, LeashStats::passthrough(0.0));
    }

    #[test]
    fn damps_large_constant_step_to_min_scale() {
        let leash = leash_with_budget(0.001);
        let current = Array2::from_elem((4, 32), 5.0);
        let previous = Array2::<f64>::zeros((4, 32));
        let (out, stats) = leash
            .apply_batch(current.view(), Some(previous.view()))
            .unwrap();
        assert_eq!(stats.scale, 0.10);
        assert!(stats.is_damped());
        assert!(stats.divergence > 0.001);
        let out_norm = norm(&out);
        assert!(out_norm > 0.0);
        assert!(out_norm < norm(&current));
        assert!((out[[0, 0]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn damps_large_random_step_within_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        let leash = leash_with_budget(0.001);
        let previous = Array2::<f64>::zeros((4, 32));
        let current = uniform_batch(&mut rng, 4, 32, 8.0);
        let (out, stats) = leash
            .apply(current.view().into_dyn(), Some(previous.view().into_dyn()))
            .unwrap();
        assert_eq!(out.shape(), current.shape());
        let cfg = leash.config();
        assert!(cfg.min_scale <= stats.scale && stats.scale <= cfg.max_scale);
        let out = out.into_dimensionality::<Ix2>().unwrap();
        assert!(norm(&(&out - &previous)) <= norm(&(&current - &previous)) + 1e-9);
    }

    #[test]
    fn no_damping_when_within_budget() {
        let leash = leash_with_budget(10.0);
        let previous = Array2::<f64>::zeros((4, 32));
        // Rows alternate ±0.1 around a 0.01 offset: mean shift 0.01, variance 0.01.
        let current = Array2::from_shape_fn((4, 32), |(i, _)| {
            if i % 2 == 0 { 0.11 } else { -0.09 }
        });
        let (out, stats) = leash
            .apply_batch(current.view(), Some(previous.view()))
            .unwrap();
        assert_eq!(stats.scale, 1.0);
        assert!(!stats.is_damped());
        assert!(stats.divergence <= 10.0);
        assert_eq!(out, current);
    }

    #[test]
    fn divergence_matches_closed_form() {
        let leash = GaussianDriftLeash::default();
        let previous = array![[0.0, 0.0], [0.0, 0.0]];
        let current = array![[1.0, 3.0], [-1.0, 1.0]];
        // trace = 1 + 1 = 2, sigma2 = 1, delta = [0, 2]
        let expected = 0.5 * 4.0 / (1.0 + 1e-4);
        let kl = leash.estimate(current.view(), previous.view()).unwrap();
        assert!((kl - expected).abs() < 1e-12);
    }

    #[test]
    fn divergence_is_zero_for_identical_snapshots() {
        let leash = GaussianDriftLeash::default();
        let h = array![[0.3, -1.0, 2.0], [0.1, 0.0, 4.0]];
        assert_eq!(leash.estimate(h.view(), h.view()).unwrap(), 0.0);
    }

    #[test]
    fn unclamped_scale_shrinks_divergence_to_budget() {
        let cfg = GaussianLeashConfig {
            budget: 0.5,
            min_scale: 0.01,
            ..Default::default()
        };
        let leash = GaussianDriftLeash::new(cfg).unwrap();
        let previous = array![[0.0, 0.0], [0.0, 0.0]];
        let current = array![[1.0, 3.0], [-1.0, 1.0]];
        let (out, stats) = leash
            .apply_batch(current.view(), Some(previous.view()))
            .unwrap();
        assert!(stats.scale > cfg.min_scale && stats.scale < 1.0);
        // Divergence is quadratic in the mean shift: scaling by s scales it by s².
        assert!((stats.divergence * stats.scale.powi(2) - cfg.budget).abs() < 1e-12);
        let shifted_mean = (out[[0, 1]] + out[[1, 1]]) / 2.0;
        assert!((shifted_mean - 2.0 * stats.scale).abs() < 1e-12);
    }

    #[test]
    fn vector_input_is_a_batch_of_one() {
        let leash = leash_with_budget(0.001);
        let current = Array::from(vec![1.0, 2.0, 3.0]).into_dyn();
        let previous = Array::from(vec![0.0, 0.0, 0.0]).into_dyn();
        let (out, stats) = leash.apply(current.view(), Some(previous.view())).unwrap();
        assert_eq!(out.shape(), &[3]);
        assert!(stats.is_damped());
        let out = out.into_dimensionality::<Ix1>().unwrap();
        assert!((out[2] - 3.0 * stats.scale).abs() < 1e-12);
    }

    #[test]
    fn vector_against_row_batch_is_comparable() {
        let leash = GaussianDriftLeash::default();
        let current = Array::from(vec![0.0, 0.0]).into_dyn();
        let previous = array![[0.0, 0.0]].into_dyn();
        let (_, stats) = leash.apply(current.view(), Some(previous.view())).unwrap();
        assert_eq!(stats.divergence, 0.0);
    }

    #[test]
    fn rank_three_is_rejected() {
        let leash = GaussianDriftLeash::default();
        let cube = Array3::<f64>::zeros((2, 2, 2)).into_dyn();
        let err = leash.apply(cube.view(), None).unwrap_err();
        assert!(matches!(err, crate::LeashError::ShapeMismatch(_)));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let leash = GaussianDriftLeash::default();
        let current = Array2::<f64>::zeros((4, 8)).into_dyn();
        let previous = Array2::<f64>::zeros((2, 8)).into_dyn();
        let err = leash
            .apply(current.view(), Some(previous.view()))
            .unwrap_err();
        assert!(matches!(err, crate::LeashError::ShapeMismatch(_)));
    }

    #[test]
    fn empty_feature_dim_cannot_be_compared() {
        let leash = GaussianDriftLeash::default();
        let current = Array2::<f64>::zeros((3, 0));
        let previous = Array2::<f64>::zeros((3, 0));
        let err = leash.estimate(current.view(), previous.view()).unwrap_err();
        assert!(matches!(err, crate::LeashError::ShapeMismatch(_)));
    }

    #[test]
    fn config_validation() {
        let bad = [
            GaussianLeashConfig {
                budget: 0.0,
                ..Default::default()
            },
            GaussianLeashConfig {
                min_scale: 0.0,
                ..Default::default()
            },
            GaussianLeashConfig {
                min_scale: 1.5,
                ..Default::default()
            },
            GaussianLeashConfig {
                min_scale: 0.5,
                max_scale: 0.4,
                ..Default::default()
            },
            GaussianLeashConfig {
                max_scale: 1.2,
                ..Default::default()
            },
            GaussianLeashConfig {
                cov_reg: -1e-4,
                ..Default::default()
            },
        ];
        for cfg in bad {
            let err = GaussianDriftLeash::new(cfg).unwrap_err();
            assert!(matches!(err, crate::LeashError::InvalidConfiguration(_)));
        }
        assert!(GaussianDriftLeash::new(GaussianLeashConfig::default()).is_ok());
    }

    #[test]
    fn config_round_trips_through_json() {
        let json = r#"{"budget":0.05,"min_scale":0.2,"max_scale":1.0,"cov_reg":0.001}"#;
        let cfg: GaussianLeashConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.budget, 0.05);
        assert!(GaussianDriftLeash::new(cfg).is_ok());
    }
}
