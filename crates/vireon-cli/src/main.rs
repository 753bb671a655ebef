//! CLI for vireon: keep state transitions on a leash.

mod commands;

use clap::{Parser, Subcommand};
use vireon_core::GaussianLeashConfig;

#[derive(Parser)]
#[command(name = "vireon")]
#[command(about = "Bounded drift leash: KL budgets, damping, and alert zones")]
#[command(version = vireon_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reality/perception toy model and report effective time
    Toy {
        /// Number of simulated steps
        #[arg(long, default_value = "300")]
        steps: usize,

        /// Training lever applied to perception each step
        #[arg(long, default_value = "0.02")]
        u: f64,

        /// Restoring force pulling perception back toward 1
        #[arg(long, default_value = "0.05")]
        gamma: f64,

        /// Divergence cost per unit squared perception offset
        #[arg(long, default_value = "0.02")]
        alpha: f64,

        /// Random seed
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Environment structure: constant (R=1) or noisy (R~N(0.7, 0.1))
        #[arg(long, default_value = "constant", value_parser = ["constant", "noisy"])]
        reality: String,

        /// Write the run summary as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Compare effective time against shuffled-P and Poisson-P controls
    Controls {
        /// Number of simulated steps
        #[arg(long, default_value = "300")]
        steps: usize,

        /// Training lever applied to perception each step
        #[arg(long, default_value = "0.02")]
        u: f64,

        /// Random seed (controls use seed+1 and seed+2)
        #[arg(long, default_value = "2")]
        seed: u64,

        /// Write the control table as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// KL divergence between two proxy vectors
    Divergence {
        /// Current proxies, comma-separated
        #[arg(long, allow_hyphen_values = true)]
        current: String,

        /// Baseline proxies, comma-separated
        #[arg(long, allow_hyphen_values = true)]
        baseline: String,

        /// Clipping floor applied before normalization and inside the log ratio
        #[arg(long, default_value = "1e-9")]
        floor: f64,

        /// Write the result as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Classify a divergence series into STABLE / WARNING / CRITICAL
    Zone {
        /// Divergence series, comma-separated
        #[arg(long)]
        series: String,

        /// Warning threshold
        #[arg(long)]
        warning: f64,

        /// Critical threshold (a single point at 2x is critical on its own)
        #[arg(long)]
        critical: f64,

        /// Consecutive points at or above warning needed for WARNING
        #[arg(long, default_value = "2")]
        warning_window: usize,

        /// Consecutive points at or above critical needed for CRITICAL
        #[arg(long, default_value = "3")]
        critical_window: usize,

        /// Write the assessment as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Drive the Gaussian drift leash over a seeded random walk of snapshots
    Leash {
        /// Number of snapshots
        #[arg(long, default_value = "30")]
        steps: usize,

        /// Rows per snapshot
        #[arg(long, default_value = "4")]
        batch: usize,

        /// Features per row
        #[arg(long, default_value = "32")]
        dim: usize,

        /// Uniform noise half-width for ordinary steps
        #[arg(long, default_value = "0.05")]
        step_size: f64,

        /// Inject a large jump every N steps (0 = never)
        #[arg(long, default_value = "10")]
        jump_every: usize,

        /// Uniform noise half-width for jump steps
        #[arg(long, default_value = "5.0")]
        jump_size: f64,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Per-step divergence budget
        #[arg(long, default_value = "0.012")]
        budget: f64,

        /// Lower bound on the damping scale
        #[arg(long, default_value = "0.10")]
        min_scale: f64,

        /// Upper bound on the damping scale
        #[arg(long, default_value = "1.0")]
        max_scale: f64,

        /// Covariance trace floor
        #[arg(long, default_value = "1e-4")]
        cov_reg: f64,

        /// Warning threshold for the divergence series zone
        #[arg(long, default_value = "1.0")]
        warning: f64,

        /// Critical threshold for the divergence series zone
        #[arg(long, default_value = "10.0")]
        critical: f64,

        /// Write per-step stats as JSON
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Toy {
            steps,
            u,
            gamma,
            alpha,
            seed,
            reality,
            output,
        } => commands::toy::run(commands::toy::ToyCommandConfig {
            steps,
            u,
            gamma,
            alpha,
            seed,
            reality: &reality,
            output_path: output.as_deref(),
        }),
        Commands::Controls {
            steps,
            u,
            seed,
            output,
        } => commands::controls::run(steps, u, seed, output.as_deref()),
        Commands::Divergence {
            current,
            baseline,
            floor,
            output,
        } => commands::divergence::run(&current, &baseline, floor, output.as_deref()),
        Commands::Zone {
            series,
            warning,
            critical,
            warning_window,
            critical_window,
            output,
        } => commands::zone::run(commands::zone::ZoneCommandConfig {
            series: &series,
            warning,
            critical,
            warning_window,
            critical_window,
            output_path: output.as_deref(),
        }),
        Commands::Leash {
            steps,
            batch,
            dim,
            step_size,
            jump_every,
            jump_size,
            seed,
            budget,
            min_scale,
            max_scale,
            cov_reg,
            warning,
            critical,
            output,
        } => commands::leash::run(commands::leash::LeashCommandConfig {
            steps,
            batch,
            dim,
            step_size,
            jump_every,
            jump_size,
            seed,
            leash: GaussianLeashConfig {
                budget,
                min_scale,
                max_scale,
                cov_reg,
            },
            warning,
            critical,
            output_path: output.as_deref(),
        }),
    }
}
