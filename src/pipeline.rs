//! Analysis Pipeline
//! load -> clean -> bin -> aggregate -> correlate -> report -> plot, in one pass.

use crate::charts::{ChartDir, ChartRenderer, PlotError};
use crate::config::AnalysisConfig;
use crate::data::{with_size_bins, AppLoader, CleaningReport, DataCleaner};
use crate::report::Reporter;
use crate::stats::{size_installs_correlation, BinAggregator, BinSummary, CorrelationReport};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything a run produced, also used for the JSON summary.
#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub input: PathBuf,
    pub cleaning: CleaningReport,
    pub bins: Vec<BinSummary>,
    pub correlation: Option<CorrelationReport>,
    pub correlation_error: Option<String>,
    pub charts: Vec<PathBuf>,
}

/// Run the full analysis, writing the text report to `out`.
///
/// Only loading and internal table errors abort the run; correlation and
/// plotting failures are reported and skipped.
pub fn run<W: Write>(config: &AnalysisConfig, out: W) -> Result<AnalysisSummary> {
    let mut reporter = Reporter::new(out, config.preview_rows);

    let raw = AppLoader::new()
        .load_csv(&config.input)
        .with_context(|| format!("Failed to load {}", config.input.display()))?;
    reporter.loaded(&config.input, &raw)?;

    let (cleaned, cleaning) = DataCleaner::clean(&raw).context("Failed to clean app records")?;
    let binned = with_size_bins(&cleaned).context("Failed to assign size bins")?;

    reporter.cleaning(&cleaning)?;
    reporter.preview("Before cleaning", &raw)?;
    reporter.preview("After cleaning", &binned)?;

    let grouped = BinAggregator::installs_by_bin(&binned).context("Failed to aggregate by bin")?;
    reporter.aggregation(&grouped)?;

    let correlation = size_installs_correlation(&binned);
    if let Err(e) = &correlation {
        warn!("Correlation skipped: {}", e);
    }
    reporter.correlation(&correlation)?;

    let bins = BinAggregator::bin_summaries(&binned).context("Failed to summarize bins")?;
    reporter.bin_table(&bins)?;

    let charts = if config.plot {
        plot_charts(config, &bins, &mut reporter)?
    } else {
        reporter.notice("Plotting disabled, skipping charts")?;
        Vec::new()
    };

    let (correlation, correlation_error) = match correlation {
        Ok(report) => (Some(report), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let summary = AnalysisSummary {
        input: config.input.clone(),
        cleaning,
        bins,
        correlation,
        correlation_error,
        charts,
    };

    if config.json {
        reporter.json(&summary)?;
    }

    info!(
        rows = summary.cleaning.rows_retained,
        bins = summary.bins.len(),
        "Analysis complete"
    );
    Ok(summary)
}

/// Render each chart on its own and return the ones left on disk.
///
/// A chart with nothing to draw is skipped with its own notice; the others
/// are still written. Charts in a temporary directory survive only when they
/// were handed to the viewer.
fn plot_charts<W: Write>(
    config: &AnalysisConfig,
    bins: &[BinSummary],
    reporter: &mut Reporter<W>,
) -> Result<Vec<PathBuf>> {
    let chart_dir = match ChartDir::new(config.chart_dir.as_deref()) {
        Ok(dir) => dir,
        Err(e) => {
            warn!("Plotting unavailable: {}", e);
            reporter.notice(&format!("Plotting unavailable, skipping charts: {}", e))?;
            return Ok(Vec::new());
        }
    };

    let mut written = Vec::new();
    for outcome in ChartRenderer::render_all(bins, chart_dir.path()) {
        let title = outcome.kind.title();
        match outcome.result {
            Ok(path) => written.push(path),
            Err(e @ PlotError::InvalidData(_)) => {
                warn!("Skipped {} chart: {}", title, e);
                reporter.notice(&format!("Skipped {} chart, nothing to plot: {}", title, e))?;
            }
            Err(e) => {
                warn!("Plotting unavailable for {} chart: {}", title, e);
                reporter.notice(&format!("Plotting unavailable for {} chart: {}", title, e))?;
            }
        }
    }
    if written.is_empty() {
        return Ok(written);
    }

    if !config.open_charts {
        if chart_dir.is_temporary() {
            reporter.notice("Charts rendered but not kept; pass --chart-dir to keep them")?;
            return Ok(Vec::new());
        }
        reporter.notice(&format!("Charts written to {}", chart_dir.path().display()))?;
        return Ok(written);
    }

    match ChartRenderer::open_all(&written) {
        Ok(()) => {
            let dir = chart_dir.keep();
            reporter.notice(&format!("Charts opened from {}", dir.display()))?;
            Ok(written)
        }
        Err(e) => {
            warn!("Chart viewer unavailable: {}", e);
            reporter.notice(&format!("Could not open charts: {}", e))?;
            if chart_dir.is_temporary() {
                return Ok(Vec::new());
            }
            Ok(written)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE_CSV: &str = "\
App,Category,Rating,Size,Installs
Alpha,TOOLS,4.1,19M,\"10,000+\"
Beta,GAME,3.9,512k,500+
Gamma,GAME,4.5,Varies with device,\"1,000+\"
Delta,,4.0,3M,100+
Epsilon,ART,4.2,8M,300+
Zeta,ART,4.4,120M,\"5,000,000+\"
Eta,FAMILY,4.0,75M,Free
";

    fn config_for(dir: &tempfile::TempDir, contents: &str) -> AnalysisConfig {
        let input = dir.path().join("apps.csv");
        fs::write(&input, contents).unwrap();
        AnalysisConfig {
            input,
            chart_dir: Some(dir.path().join("charts")),
            plot: false,
            open_charts: false,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn end_to_end_summary() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir, SAMPLE_CSV);

        let mut out = Vec::new();
        let summary = run(&config, &mut out).unwrap();

        assert_eq!(summary.cleaning.rows_loaded, 7);
        assert_eq!(summary.cleaning.dropped_missing, 1);
        assert_eq!(summary.cleaning.dropped_unparseable, 2);
        assert_eq!(summary.cleaning.rows_retained, 4);

        let labels: Vec<&str> = summary.bins.iter().map(|b| b.bin.as_str()).collect();
        assert_eq!(labels, ["0-10 MB", "10-50 MB", "100+ MB"]);

        let small = &summary.bins[0];
        assert_eq!(small.app_count, 2);
        assert!((small.average_installs - 400.0).abs() < 1e-9);

        let medium = &summary.bins[1];
        assert_eq!(medium.app_count, 1);
        assert!((medium.average_installs - 10_000.0).abs() < 1e-9);
        assert!((medium.average_size_mb - 19.0).abs() < 1e-9);

        assert!(summary.correlation.is_some());
        assert!(summary.charts.is_empty());

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Loaded 7 rows"), "{text}");
        assert!(text.contains("Correlation between Size_MB and Installs_clean"));
        assert!(text.contains("Plotting disabled"));
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            input: dir.path().join("absent.csv"),
            plot: false,
            ..AnalysisConfig::default()
        };

        let mut out = Vec::new();
        assert!(run(&config, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn zero_variance_does_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(
            &dir,
            "Category,Size,Installs\nTOOLS,5M,100+\nGAME,5M,500+\nART,5M,900+\n",
        );

        let mut out = Vec::new();
        let summary = run(&config, &mut out).unwrap();

        assert!(summary.correlation.is_none());
        assert!(summary.correlation_error.is_some());
        assert_eq!(summary.bins.len(), 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Could not compute correlation"));
    }

    #[test]
    fn unwritable_chart_dir_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let config = AnalysisConfig {
            chart_dir: Some(blocker.join("charts")),
            plot: true,
            ..config_for(&dir, SAMPLE_CSV)
        };

        let mut out = Vec::new();
        let summary = run(&config, &mut out).unwrap();

        assert!(summary.charts.is_empty());
        assert_eq!(summary.bins.len(), 3);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Plotting unavailable, skipping charts"), "{text}");
    }

    #[test]
    fn scatter_without_positive_installs_gets_its_own_notice() {
        let dir = tempfile::tempdir().unwrap();
        let chart_dir = dir.path().join("charts");
        let config = AnalysisConfig {
            chart_dir: Some(chart_dir.clone()),
            plot: true,
            ..config_for(&dir, "Category,Size,Installs
TOOLS,5M,0+
GAME,20M,0+
")
        };

        let mut out = Vec::new();
        let summary = run(&config, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Skipped size vs installs chart"), "{text}");
        assert!(!text.contains("Plotting unavailable, skipping charts"), "{text}");
        assert!(!text.contains("Plotting unavailable for size vs installs"), "{text}");

        let scatter = chart_dir.join("size_vs_installs.png");
        assert!(!summary.charts.contains(&scatter));
        assert!(!scatter.exists());
        assert!(summary.charts.iter().all(|p| p.exists()));
    }

    #[test]
    fn temporary_charts_are_not_kept_without_a_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            chart_dir: None,
            plot: true,
            ..config_for(&dir, SAMPLE_CSV)
        };

        let mut out = Vec::new();
        let summary = run(&config, &mut out).unwrap();

        assert!(summary.charts.is_empty());
        assert!(!dir.path().join("charts").exists());
    }

    #[test]
    fn signed_and_infinite_sizes_never_form_an_unknown_bin() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(
            &dir,
            "Category,Size,Installs
TOOLS,-5M,100+
GAME,infM,500+
ART,1e3M,10+
ART,8M,900+
GAME,30M,50+
",
        );

        let mut out = Vec::new();
        let summary = run(&config, &mut out).unwrap();

        assert_eq!(summary.cleaning.dropped_unparseable, 3);
        assert_eq!(summary.cleaning.rows_retained, 2);
        let labels: Vec<&str> = summary.bins.iter().map(|b| b.bin.as_str()).collect();
        assert_eq!(labels, ["0-10 MB", "10-50 MB"]);
    }

    #[test]
    fn json_summary_is_printed() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            json: true,
            ..config_for(&dir, SAMPLE_CSV)
        };

        let mut out = Vec::new();
        run(&config, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let start = text.rfind("\n{").unwrap() + 1;
        let value: serde_json::Value = serde_json::from_str(&text[start..]).unwrap();
        assert_eq!(value["cleaning"]["rows_retained"], 4);
        assert_eq!(value["bins"].as_array().unwrap().len(), 3);
    }
}
