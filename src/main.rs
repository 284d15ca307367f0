//! App Size Analysis - How declared app size relates to install counts
//!
//! Loads an app metadata CSV, cleans the Size and Installs columns, bins apps
//! by size and reports per-bin averages, a Pearson correlation and two charts.

mod charts;
mod config;
mod data;
mod pipeline;
mod report;
mod stats;

use clap::Parser;
use config::{AnalysisConfig, Cli};

fn main() -> anyhow::Result<()> {
    let config = AnalysisConfig::from(Cli::parse());
    config::init_logging(&config);

    pipeline::run(&config, std::io::stdout().lock())?;
    Ok(())
}
