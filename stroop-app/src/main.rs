mod app;
mod bridge;
mod dialog;

use anyhow::Context;
use dialog::TerminalDialog;
use std::path::Path;
use stroop_experiment::{ExperimentError, SessionPlan, StroopConfig};
use tracing::{Level, info, warn};

const CONFIG_FILE: &str = "stroop.json";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let config = StroopConfig::load_or_default(Path::new(CONFIG_FILE))
        .with_context(|| format!("loading {CONFIG_FILE}"))?;
    info!(
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        practice = config.practice_trials,
        main = config.main_trials,
        "stroop starting"
    );

    let started_at = chrono::Local::now().naive_local();
    let Some(plan) = SessionPlan::prepare(&config, &mut TerminalDialog::stdio(), started_at)?
    else {
        info!("no participant entered, exiting");
        return Ok(());
    };

    match app::run(config, plan) {
        Ok(report) => {
            info!(
                csv = %report.csv_path.display(),
                summary = %report.summary_path.display(),
                "results saved. Thank you!"
            );
            Ok(())
        }
        Err(e) => match e.downcast_ref::<ExperimentError>() {
            Some(ExperimentError::Aborted(reason)) => {
                warn!(%reason, "session aborted, no results written");
                Ok(())
            }
            _ => Err(e),
        },
    }
}
