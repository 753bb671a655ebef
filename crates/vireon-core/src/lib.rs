//! # vireon-core
//!
//! **Keep state transitions on a leash.**
//!
//! `vireon-core` bounds how far a system may drift between consecutive state
//! snapshots and classifies how a divergence series is trending.
//!
//! ## Quick Start
//!
//! ```
//! use ndarray::Array2;
//! use vireon_core::{DistributionLeash, GaussianDriftLeash, GaussianLeashConfig, Zone};
//!
//! // Discrete proxies: KL divergence against a stable baseline, then zones.
//! let leash = DistributionLeash::default();
//! let kl = leash.divergence(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
//! assert!(kl.abs() < 1e-9);
//! assert_eq!(leash.classify(&[0.1, 0.2, 0.2, 0.2], 0.15, 0.5), Zone::Warning);
//!
//! // Vector snapshots: damp a step that blows the divergence budget.
//! let drift = GaussianDriftLeash::new(GaussianLeashConfig {
//!     budget: 0.001,
//!     ..Default::default()
//! })
//! .unwrap();
//! let previous = Array2::<f64>::zeros((4, 32));
//! let current = Array2::<f64>::from_elem((4, 32), 5.0);
//! let (out, stats) = drift
//!     .apply_batch(current.view(), Some(previous.view()))
//!     .unwrap();
//! assert_eq!(stats.scale, 0.10);
//! assert_eq!(out[[0, 0]], 0.5);
//! ```
//!
//! ## Architecture
//!
//! Proxies → [`DistributionLeash`] → divergence series → [`Zone`]
//!
//! Snapshots → [`GaussianDriftLeash`] → damped snapshot + [`LeashStats`]
//!
//! The two leashes are independent. Both are pure functions of their inputs and
//! an immutable, pre-validated configuration, so they can be shared freely
//! across threads. The estimators, control generators, and toy simulator supply
//! the series the leashes are usually fed with.

pub mod controls;
pub mod error;
pub mod leash;
pub mod metrics;
pub mod model;
pub mod numeric;
pub mod quantum;

pub use controls::{poissonize, shuffle_proxies};
pub use error::{LeashError, Result};
pub use leash::{DistributionLeash, DistributionLeashConfig, Zone, ZoneAssessment, ZoneTrigger};
pub use metrics::{PerceptionEstimator, RealityEstimator, RealityInput, effective_time};
pub use model::{RealityMode, TrpToyModel, TrpTrajectory};
pub use numeric::{covariance_trace, to_distribution};
pub use quantum::{GaussianDriftLeash, GaussianLeashConfig, LeashStats};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
