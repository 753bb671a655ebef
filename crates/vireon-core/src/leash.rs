//! Discrete-distribution KL leash with run-length alert zones.
//!
//! A state proxy vector (any non-negative readings) is clipped to a small floor
//! and normalized into a probability distribution. The leash measures
//!
//! ```text
//! D_KL(p || q) = Σ p_i · ln((p_i + ε) / (q_i + ε))
//! ```
//!
//! between the current distribution `p` and a stable baseline `q`. The floor
//! `ε` is applied twice, once while clipping and once inside the log ratio,
//! which keeps degenerate (all-zero) inputs finite.
//!
//! A series of divergences is then mapped to a [`Zone`]:
//!
//! 1. any point at or above `2 × critical` is a spike → CRITICAL
//! 2. `critical_window` consecutive points at or above `critical` → CRITICAL
//! 3. `warning_window` consecutive points at or above `warning` → WARNING
//! 4. otherwise STABLE

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};
use crate::numeric::to_distribution;

/// Floor applied to every distribution entry.
pub const DEFAULT_FLOOR: f64 = 1e-9;
/// Consecutive points needed for a WARNING run.
pub const DEFAULT_WARNING_WINDOW: usize = 2;
/// Consecutive points needed for a CRITICAL run.
pub const DEFAULT_CRITICAL_WINDOW: usize = 3;
/// A single point at or above `SPIKE_FACTOR × critical` is CRITICAL on its own.
pub const SPIKE_FACTOR: f64 = 2.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Alert level for a divergence series, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    Stable,
    Warning,
    Critical,
}

impl Zone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule decided the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneTrigger {
    /// A single point reached `SPIKE_FACTOR × critical`.
    Spike,
    /// A run of `critical_window` points at or above `critical`.
    CriticalRun,
    /// A run of `warning_window` points at or above `warning`.
    WarningRun,
    /// No rule fired.
    None,
}

/// Zone plus the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneAssessment {
    pub zone: Zone,
    pub trigger: ZoneTrigger,
    /// Largest value in the series (0.0 when empty).
    pub peak: f64,
    /// Longest run of points at or above the warning threshold.
    pub longest_warning_run: usize,
    /// Longest run of points at or above the critical threshold.
    pub longest_critical_run: usize,
    /// Number of points assessed.
    pub points: usize,
}

/// Tunables for [`DistributionLeash`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionLeashConfig {
    /// Floor used for clipping and inside the log ratio.
    pub floor: f64,
    /// Consecutive points at or above the warning threshold for WARNING.
    pub warning_window: usize,
    /// Consecutive points at or above the critical threshold for CRITICAL.
    pub critical_window: usize,
}

impl Default for DistributionLeashConfig {
    fn default() -> Self {
        Self {
            floor: DEFAULT_FLOOR,
            warning_window: DEFAULT_WARNING_WINDOW,
            critical_window: DEFAULT_CRITICAL_WINDOW,
        }
    }
}

impl DistributionLeashConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.floor.is_finite() || self.floor <= 0.0 {
            return Err(error::config(format!(
                "floor must be a positive finite number, got {}",
                self.floor
            )));
        }
        if self.warning_window == 0 {
            return Err(error::config("warning_window must be at least 1"));
        }
        if self.critical_window == 0 {
            return Err(error::config("critical_window must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Leash
// ---------------------------------------------------------------------------

/// KL divergence between proxy vectors and zone classification of the result.
#[derive(Debug, Clone, Default)]
pub struct DistributionLeash {
    config: DistributionLeashConfig,
}

impl DistributionLeash {
    /// Build a leash, rejecting an invalid configuration up front.
    pub fn new(config: DistributionLeashConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DistributionLeashConfig {
        &self.config
    }

    /// KL divergence of `current` from `baseline`, both read as distributions.
    pub fn divergence(&self, current: &[f64], baseline: &[f64]) -> Result<f64> {
        if current.len() != baseline.len() {
            return Err(error::shape(format!(
                "current has {} entries, baseline has {}",
                current.len(),
                baseline.len()
            )));
        }
        let eps = self.config.floor;
        let p = to_distribution(current, eps);
        let q = to_distribution(baseline, eps);
        let kl = p
            .iter()
            .zip(&q)
            .map(|(&pi, &qi)| pi * ((pi + eps) / (qi + eps)).ln())
            .sum();
        Ok(kl)
    }

    /// Divergence of every snapshot in `series` from one baseline.
    pub fn divergence_series<S: AsRef<[f64]>>(
        &self,
        series: &[S],
        baseline: &[f64],
    ) -> Result<Vec<f64>> {
        series
            .iter()
            .map(|current| self.divergence(current.as_ref(), baseline))
            .collect()
    }

    /// Zone of a divergence series. An empty series is [`Zone::Stable`].
    pub fn classify(&self, series: &[f64], warning: f64, critical: f64) -> Zone {
        self.assess(series, warning, critical).zone
    }

    /// Zone of a divergence series with the diagnostics that produced it.
    pub fn assess(&self, series: &[f64], warning: f64, critical: f64) -> ZoneAssessment {
        let peak = series.iter().copied().fold(0.0_f64, f64::max);
        let longest_warning_run = longest_run(series, warning);
        let longest_critical_run = longest_run(series, critical);

        let (zone, trigger) = if series.iter().any(|&x| x >= SPIKE_FACTOR * critical) {
            (Zone::Critical, ZoneTrigger::Spike)
        } else if has_run(series, critical, self.config.critical_window) {
            (Zone::Critical, ZoneTrigger::CriticalRun)
        } else if has_run(series, warning, self.config.warning_window) {
            (Zone::Warning, ZoneTrigger::WarningRun)
        } else {
            (Zone::Stable, ZoneTrigger::None)
        };

        if zone != Zone::Stable {
            log::debug!(
                "divergence series ({} points) classified {zone} via {trigger:?}, peak={peak:.6}",
                series.len()
            );
        }

        ZoneAssessment {
            zone,
            trigger,
            peak,
            longest_warning_run,
            longest_critical_run,
            points: series.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run-length helpers
// ---------------------------------------------------------------------------

/// True when some window of `window` consecutive points is entirely at or
/// above `threshold`, using a fixed-size sliding sum of 0/1 indicators.
pub fn has_run(series: &[f64], threshold: f64, window: usize) -> bool {
    if window == 0 || series.len() < window {
        return false;
    }
    let hits: Vec<usize> = series
        .iter()
        .map(|&x| usize::from(x >= threshold))
        .collect();
    let mut sum: usize = hits[..window].iter().sum();
    if sum >= window {
        return true;
    }
    for i in window..hits.len() {
        sum = sum + hits[i] - hits[i - window];
        if sum >= window {
            return true;
        }
    }
    false
}

/// Length of the longest stretch of consecutive points at or above `threshold`.
pub fn longest_run(series: &[f64], threshold: f64) -> usize {
    let mut best = 0;
    let mut current = 0;
    for &x in series {
        if x >= threshold {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}
