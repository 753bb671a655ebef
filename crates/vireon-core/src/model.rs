//! Minimal reality/perception toy simulator.
//!
//! The environment carries structure `R_t ∈ [0, 1]`; the agent has a perception
//! gain `P_t ≥ 0`. A training lever `u` pushes P up, a restoring force pulls it
//! back toward 1, and divergence cost accumulates with `(P_t - 1)²`:
//!
//! ```text
//! P_{t+1} = max(0, P_t + u - γ·(P_t - 1))
//! D_{t+1} = D_t + α·(P_t - 1)²
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{self, Result};

/// Mean of the noisy reality signal.
const NOISY_REALITY_MEAN: f64 = 0.7;
/// Standard deviation of the noisy reality signal.
const NOISY_REALITY_STD: f64 = 0.1;

/// How the environment structure evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealityMode {
    /// `R_t = 1` throughout.
    #[default]
    Constant,
    /// `R_t ~ N(0.7, 0.1)` clipped to `[0, 1]`.
    Noisy,
}

impl std::fmt::Display for RealityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Noisy => write!(f, "noisy"),
        }
    }
}

/// One simulated run. All three series have the requested length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrpTrajectory {
    pub reality: Vec<f64>,
    pub perception: Vec<f64>,
    pub divergence: Vec<f64>,
}

impl TrpTrajectory {
    pub fn len(&self) -> usize {
        self.perception.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perception.is_empty()
    }
}

/// Toy model with its own seeded random stream; successive runs continue it.
#[derive(Debug, Clone)]
pub struct TrpToyModel {
    gamma: f64,
    alpha: f64,
    rng: StdRng,
}

impl TrpToyModel {
    pub const DEFAULT_GAMMA: f64 = 0.05;
    pub const DEFAULT_ALPHA: f64 = 0.02;

    pub fn new(gamma: f64, alpha: f64, seed: u64) -> Self {
        Self {
            gamma,
            alpha,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Model with the default restoring force and divergence cost.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Self::DEFAULT_GAMMA, Self::DEFAULT_ALPHA, seed)
    }

    /// Simulate `steps` points under lever `u`.
    pub fn run(&mut self, steps: usize, u: f64, mode: RealityMode) -> Result<TrpTrajectory> {
        if steps < 2 {
            return Err(error::input(format!(
                "simulation needs at least 2 steps, got {steps}"
            )));
        }
        let noise = Normal::new(NOISY_REALITY_MEAN, NOISY_REALITY_STD)
            .map_err(|e| error::input(e.to_string()))?;

        let mut perception = vec![1.0; steps];
        let mut divergence = vec![0.0; steps];
        let mut reality = vec![0.0; steps];

        for t in 0..steps - 1 {
            reality[t] = match mode {
                RealityMode::Constant => 1.0,
                RealityMode::Noisy => noise.inverse_cdf(self.rng.random::<f64>()).clamp(0.0, 1.0),
            };
            let p = perception[t];
            perception[t + 1] = (p + u - self.gamma * (p - 1.0)).max(0.0);
            divergence[t + 1] = divergence[t] + self.alpha * (p - 1.0).powi(2);
        }
        reality[steps - 1] = reality[steps - 2];

        log::debug!(
            "toy run: steps={steps} u={u} mode={mode} final P={:.4} final D={:.4}",
            perception[steps - 1],
            divergence[steps - 1]
        );
        Ok(TrpTrajectory {
            reality,
            perception,
            divergence,
        })
    }
}
