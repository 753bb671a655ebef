//! `vireon leash`: drive the Gaussian drift leash over a seeded random walk.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use vireon_core::{DistributionLeash, GaussianDriftLeash, GaussianLeashConfig, LeashStats, Zone};

pub struct LeashCommandConfig<'a> {
    pub steps: usize,
    pub batch: usize,
    pub dim: usize,
    pub step_size: f64,
    pub jump_every: usize,
    pub jump_size: f64,
    pub seed: u64,
    pub leash: GaussianLeashConfig,
    pub warning: f64,
    pub critical: f64,
    pub output_path: Option<&'a str>,
}

#[derive(Serialize)]
struct LeashReport {
    config: GaussianLeashConfig,
    steps: Vec<LeashStats>,
    damped_steps: usize,
    zone: Zone,
}

pub fn run(cfg: LeashCommandConfig<'_>) {
    let leash = super::or_exit(GaussianDriftLeash::new(cfg.leash));
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    println!(
        "Gaussian leash over {} snapshots of [{}, {}] (budget {}, scale [{}, {}])\n",
        cfg.steps, cfg.batch, cfg.dim, cfg.leash.budget, cfg.leash.min_scale, cfg.leash.max_scale
    );
    println!("  {:>5} {:>14} {:>8}", "Step", "Divergence", "Scale");
    println!("  {}", "-".repeat(30));

    let mut previous: Option<Array2<f64>> = None;
    let mut history = Vec::with_capacity(cfg.steps);
    for step in 0..cfg.steps {
        let is_jump = cfg.jump_every > 0 && step % cfg.jump_every == cfg.jump_every - 1;
        let spread = if is_jump { cfg.jump_size } else { cfg.step_size };
        let current = next_snapshot(&mut rng, previous.as_ref(), cfg.batch, cfg.dim, spread);

        let (out, stats) =
            super::or_exit(leash.apply_batch(current.view(), previous.as_ref().map(|p| p.view())));
        println!(
            "  {step:>5} {:>14.6} {:>8.4}{}",
            stats.divergence,
            stats.scale,
            if stats.is_damped() { "  damped" } else { "" }
        );
        history.push(stats);
        previous = Some(out);
    }

    let divergences: Vec<f64> = history.iter().map(|s| s.divergence).collect();
    let zone = DistributionLeash::default().classify(&divergences, cfg.warning, cfg.critical);
    let damped_steps = history.iter().filter(|s| s.is_damped()).count();
    println!("\n  Damped steps: {damped_steps}/{}", cfg.steps);
    println!("  Zone of divergence series: {zone}");

    super::write_json(
        cfg.output_path,
        &LeashReport {
            config: cfg.leash,
            steps: history,
            damped_steps,
            zone,
        },
    );
}

/// Previous snapshot (zeros at the start) plus uniform noise in `[-spread, spread)`.
fn next_snapshot(
    rng: &mut StdRng,
    previous: Option<&Array2<f64>>,
    batch: usize,
    dim: usize,
    spread: f64,
) -> Array2<f64> {
    let noise = Array2::from_shape_fn((batch, dim), |_| {
        if spread > 0.0 {
            rng.random_range(-spread..spread)
        } else {
            0.0
        }
    });
    match previous {
        Some(prev) => prev + &noise,
        None => noise,
    }
}
