use serde::Serialize;
use vireon_core::{TrpToyModel, effective_time};

pub struct ToyCommandConfig<'a> {
    pub steps: usize,
    pub u: f64,
    pub gamma: f64,
    pub alpha: f64,
    pub seed: u64,
    pub reality: &'a str,
    pub output_path: Option<&'a str>,
}

#[derive(Serialize)]
struct ToyReport {
    steps: usize,
    u: f64,
    gamma: f64,
    alpha: f64,
    seed: u64,
    reality_mode: String,
    final_perception: f64,
    final_divergence: f64,
    effective_time: f64,
    baseline_time: f64,
}

pub fn run(cfg: ToyCommandConfig<'_>) {
    let mode = super::parse_reality_mode(cfg.reality);
    let mut model = TrpToyModel::new(cfg.gamma, cfg.alpha, cfg.seed);
    let run = super::or_exit(model.run(cfg.steps, cfg.u, mode));

    let t = super::or_exit(effective_time(&run.reality, &run.perception, 1.0));
    let baseline: f64 = run.reality.iter().sum();
    let last = run.len() - 1;

    println!("Toy model ({} steps, u={}, reality: {mode})\n", cfg.steps, cfg.u);
    println!("  Final P:                       {:.6}", run.perception[last]);
    println!("  Final divergence D:            {:.6}", run.divergence[last]);
    println!("  Effective time T:              {t:.6}");
    println!("  Baseline (P=1) time would be:  {baseline:.6}");

    super::write_json(
        cfg.output_path,
        &ToyReport {
            steps: cfg.steps,
            u: cfg.u,
            gamma: cfg.gamma,
            alpha: cfg.alpha,
            seed: cfg.seed,
            reality_mode: mode.to_string(),
            final_perception: run.perception[last],
            final_divergence: run.divergence[last],
            effective_time: t,
            baseline_time: baseline,
        },
    );
}
