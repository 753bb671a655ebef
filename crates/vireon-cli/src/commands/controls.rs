use serde::Serialize;
use vireon_core::numeric::mean;
use vireon_core::{RealityMode, TrpToyModel, effective_time, poissonize, shuffle_proxies};

#[derive(Serialize)]
struct ControlRow {
    label: &'static str,
    effective_time: f64,
    mean_perception: f64,
}

pub fn run(steps: usize, u: f64, seed: u64, output_path: Option<&str>) {
    let mut model = TrpToyModel::with_seed(seed);
    let run = super::or_exit(model.run(steps, u, RealityMode::Constant));

    // Control 1: shuffled P destroys temporal structure.
    let shuffled = shuffle_proxies(&run.perception, seed.wrapping_add(1));
    // Control 2: Poisson P keeps only the mean.
    let pois = super::or_exit(poissonize(&run.perception, seed.wrapping_add(2)));

    let rows: Vec<ControlRow> = [
        ("real", run.perception.as_slice()),
        ("shuffled-P", shuffled.as_slice()),
        ("poisson-P", pois.as_slice()),
    ]
    .into_iter()
    .map(|(label, p)| ControlRow {
        label,
        effective_time: super::or_exit(effective_time(&run.reality, p, 1.0)),
        mean_perception: mean(p).unwrap_or(0.0),
    })
    .collect();

    println!("Control runs ({steps} steps, u={u}, seed={seed})\n");
    println!("  {:<12} {:>14} {:>10}", "Series", "T", "mean P");
    println!("  {}", "-".repeat(38));
    for row in &rows {
        println!(
            "  {:<12} {:>14.4} {:>10.3}",
            row.label, row.effective_time, row.mean_perception
        );
    }

    super::write_json(output_path, &rows);
}
