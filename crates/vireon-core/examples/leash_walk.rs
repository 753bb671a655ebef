//! Gaussian leash over a random walk.
//!
//! Generates a sequence of `[batch, dim]` snapshots with occasional large
//! jumps, threads each leashed output into the next step, and prints the
//! divergence, damping scale, and the zone of the resulting divergence series.
//!
//! Run: `cargo run --example leash_walk`

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vireon_core::{DistributionLeash, GaussianDriftLeash, GaussianLeashConfig};

fn main() {
    let leash = GaussianDriftLeash::new(GaussianLeashConfig {
        budget: 0.5,
        ..Default::default()
    })
    .expect("default-derived config is valid");
    let mut rng = StdRng::seed_from_u64(7);

    let mut previous: Option<Array2<f64>> = None;
    let mut divergences = Vec::new();
    for step in 0..20 {
        let jump = if step % 7 == 6 { 3.0 } else { 0.1 };
        let base = previous.clone().unwrap_or_else(|| Array2::zeros((4, 8)));
        let current = &base + &Array2::from_shape_fn((4, 8), |_| rng.random_range(-jump..jump));

        let (out, stats) = leash
            .apply_batch(current.view(), previous.as_ref().map(|p| p.view()))
            .expect("snapshots share a shape");
        println!(
            "step {step:>2}: divergence {:>10.4}  scale {:.3}{}",
            stats.divergence,
            stats.scale,
            if stats.is_damped() { "  (damped)" } else { "" }
        );
        divergences.push(stats.divergence);
        previous = Some(out);
    }

    let zone = DistributionLeash::default().classify(&divergences, 0.25, 0.5);
    println!("\nZone of divergence series: {zone}");
}
