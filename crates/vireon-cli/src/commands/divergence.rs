use serde::Serialize;
use vireon_core::{DistributionLeash, DistributionLeashConfig};

#[derive(Serialize)]
struct DivergenceReport {
    current: Vec<f64>,
    baseline: Vec<f64>,
    floor: f64,
    divergence: f64,
}

pub fn run(current: &str, baseline: &str, floor: f64, output_path: Option<&str>) {
    let current = super::series_or_exit("current", current);
    let baseline = super::series_or_exit("baseline", baseline);
    let leash = super::or_exit(DistributionLeash::new(DistributionLeashConfig {
        floor,
        ..Default::default()
    }));
    let divergence = super::or_exit(leash.divergence(&current, &baseline));

    println!("D_KL(current || baseline) = {divergence:.9}");

    super::write_json(
        output_path,
        &DivergenceReport {
            current,
            baseline,
            floor,
            divergence,
        },
    );
}
