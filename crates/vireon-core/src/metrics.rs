//! Perception, reality-bandwidth, and effective-time estimators.
//!
//! These produce the proxy series the leashes consume:
//!
//! - **P** (perception gain): how strongly current proxies read against a
//!   baseline where P = 1.
//! - **R** (reality bandwidth): how much structure the environment carries,
//!   either supplied directly or derived from the entropy of a signal.
//! - **T** (effective time): `dT/dτ = R(τ)·P(τ)`, integrated discretely.

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};
use crate::numeric::mean;

/// Default guard against division by zero in the estimators.
pub const DEFAULT_EPS: f64 = 1e-9;

/// Perception gain: `mean(current_i / (baseline_i + eps))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerceptionEstimator {
    pub eps: f64,
}

impl Default for PerceptionEstimator {
    fn default() -> Self {
        Self { eps: DEFAULT_EPS }
    }
}

impl PerceptionEstimator {
    pub fn compute(&self, baseline: &[f64], current: &[f64]) -> Result<f64> {
        if baseline.len() != current.len() {
            return Err(error::shape(format!(
                "baseline has {} proxies, current has {}",
                baseline.len(),
                current.len()
            )));
        }
        let ratios: Vec<f64> = current
            .iter()
            .zip(baseline)
            .map(|(&x, &b)| x / (b + self.eps))
            .collect();
        mean(&ratios).ok_or_else(|| error::input("perception needs at least one proxy"))
    }
}

/// Where the reality bandwidth comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RealityInput<'a> {
    /// Caller already knows R.
    Given(f64),
    /// Estimate R as one minus the normalized entropy of an environment signal.
    Signal(&'a [f64]),
}

/// Reality bandwidth estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealityEstimator {
    pub eps: f64,
}

impl Default for RealityEstimator {
    fn default() -> Self {
        Self { eps: DEFAULT_EPS }
    }
}

impl RealityEstimator {
    pub fn compute(&self, input: RealityInput<'_>) -> Result<f64> {
        match input {
            RealityInput::Given(r) => Ok(r),
            RealityInput::Signal(signal) => self.from_signal(signal),
        }
    }

    /// `1 - H(p) / H_max`, where `p` is the min-shifted signal normalized to
    /// sum 1. A flat or perfectly concentrated signal scores near 1; an evenly
    /// spread one scores near 0.
    fn from_signal(&self, signal: &[f64]) -> Result<f64> {
        if signal.is_empty() {
            return Err(error::input("reality estimate needs a non-empty signal"));
        }
        let eps = self.eps;
        let min = signal.iter().copied().fold(f64::INFINITY, f64::min);
        let shifted: Vec<f64> = signal.iter().map(|&s| s - min).collect();
        let total: f64 = shifted.iter().sum();
        let h: f64 = -shifted
            .iter()
            .map(|&s| {
                let p = s / (total + eps);
                p * (p + eps).ln()
            })
            .sum::<f64>();
        let h_max = (signal.len() as f64 + eps).ln();
        Ok(1.0 - h / (h_max + eps))
    }
}

/// Discrete effective time `T = Σ R_t · P_t · dt`.
pub fn effective_time(reality: &[f64], perception: &[f64], dt: f64) -> Result<f64> {
    if reality.len() != perception.len() {
        return Err(error::shape(format!(
            "R has {} points, P has {}",
            reality.len(),
            perception.len()
        )));
    }
    let integral: f64 = reality.iter().zip(perception).map(|(r, p)| r * p).sum();
    Ok(integral * dt)
}
