//! Analysis Configuration Module
//! Command line parsing and the run settings consumed by the pipeline.

use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Default dataset file name, looked up in the working directory.
pub const DEFAULT_INPUT: &str = "googleplaystore.csv";
/// Default number of rows shown in schema/sample previews.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Analyze how declared app size relates to install counts.
#[derive(Parser, Debug)]
#[command(name = "app-size-analysis", version, about)]
pub struct Cli {
    /// CSV file with at least the Category, Size and Installs columns
    #[arg(default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Keep chart images in this directory instead of a temporary one
    #[arg(long)]
    pub chart_dir: Option<PathBuf>,

    /// Skip chart rendering entirely
    #[arg(long)]
    pub no_plot: bool,

    /// Render charts but do not open them in the system viewer
    #[arg(long)]
    pub no_open: bool,

    /// Also print the summary as JSON after the text report
    #[arg(long)]
    pub json: bool,

    /// Number of rows shown in the before/after previews
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Settings for a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    /// `None` renders into a temporary directory.
    pub chart_dir: Option<PathBuf>,
    pub plot: bool,
    pub open_charts: bool,
    pub json: bool,
    pub preview_rows: usize,
    pub verbose: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            chart_dir: None,
            plot: true,
            open_charts: true,
            json: false,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            verbose: 0,
        }
    }
}

impl From<Cli> for AnalysisConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            chart_dir: cli.chart_dir,
            plot: !cli.no_plot,
            open_charts: !cli.no_open,
            json: cli.json,
            preview_rows: cli.preview_rows,
            verbose: cli.verbose,
        }
    }
}

impl AnalysisConfig {
    /// Log filter directive for the configured verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Initialize tracing. `RUST_LOG` takes precedence over `-v`.
pub fn init_logging(config: &AnalysisConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2)
        .with_line_number(config.verbose >= 3)
        .init();

    debug!("Logging initialized at verbosity {}", config.verbose);
}
