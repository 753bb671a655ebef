use vireon_core::{DistributionLeash, DistributionLeashConfig, ZoneTrigger};

pub struct ZoneCommandConfig<'a> {
    pub series: &'a str,
    pub warning: f64,
    pub critical: f64,
    pub warning_window: usize,
    pub critical_window: usize,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: ZoneCommandConfig<'_>) {
    let series = super::series_or_exit("series", cfg.series);
    let leash = super::or_exit(DistributionLeash::new(DistributionLeashConfig {
        warning_window: cfg.warning_window,
        critical_window: cfg.critical_window,
        ..Default::default()
    }));
    let assessment = leash.assess(&series, cfg.warning, cfg.critical);

    let reason = match assessment.trigger {
        ZoneTrigger::Spike => format!("a point reached 2 x critical ({})", 2.0 * cfg.critical),
        ZoneTrigger::CriticalRun => format!(
            "{} consecutive points at or above critical ({})",
            cfg.critical_window, cfg.critical
        ),
        ZoneTrigger::WarningRun => format!(
            "{} consecutive points at or above warning ({})",
            cfg.warning_window, cfg.warning
        ),
        ZoneTrigger::None => "no threshold rule fired".to_string(),
    };

    println!("Zone: {}", assessment.zone);
    println!("  Reason:               {reason}");
    println!("  Points:               {}", assessment.points);
    println!("  Peak:                 {:.6}", assessment.peak);
    println!("  Longest warning run:  {}", assessment.longest_warning_run);
    println!("  Longest critical run: {}", assessment.longest_critical_run);

    super::write_json(cfg.output_path, &assessment);
}
