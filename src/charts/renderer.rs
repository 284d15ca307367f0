//! Chart Renderer
//! Writes each chart into a chart directory and hands the results to the system viewer.
//!
//! Layout:
//! 1. `installs_by_size_bin.png`: bar chart of average installs per bin
//! 2. `size_vs_installs.png`: log-log scatter, marker area tracks app count
//!
//! Without an explicit directory the images go to a temporary directory that
//! is only kept when a viewer was handed the files.

use crate::charts::{ChartPlotter, PlotError};
use crate::stats::BinSummary;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Default chart dimensions in pixels.
pub const CHART_SIZE: (u32, u32) = (1200, 800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    InstallsBar,
    SizeScatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::InstallsBar, ChartKind::SizeScatter];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::InstallsBar => "installs_by_size_bin.png",
            ChartKind::SizeScatter => "size_vs_installs.png",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::InstallsBar => "installs by size bin",
            ChartKind::SizeScatter => "size vs installs",
        }
    }
}

/// Result of rendering one chart.
#[derive(Debug)]
pub struct ChartOutcome {
    pub kind: ChartKind,
    pub result: Result<PathBuf, PlotError>,
}

/// Where chart images are written.
pub enum ChartDir {
    /// A directory the user asked for; created if needed and never removed.
    Explicit(PathBuf),
    /// Removed on drop unless [`ChartDir::keep`] is called.
    Temporary(TempDir),
}

impl ChartDir {
    pub fn new(explicit: Option<&Path>) -> io::Result<Self> {
        match explicit {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                Ok(ChartDir::Explicit(dir.to_path_buf()))
            }
            None => tempfile::Builder::new()
                .prefix("app-size-analysis-")
                .tempdir()
                .map(ChartDir::Temporary),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ChartDir::Explicit(dir) => dir,
            ChartDir::Temporary(dir) => dir.path(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, ChartDir::Temporary(_))
    }

    /// Stop a temporary directory from being removed, so a viewer can still read it.
    pub fn keep(self) -> PathBuf {
        match self {
            ChartDir::Explicit(dir) => dir,
            ChartDir::Temporary(dir) => dir.keep(),
        }
    }
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render one chart into `chart_dir`.
    pub fn render(
        kind: ChartKind,
        summaries: &[BinSummary],
        chart_dir: &Path,
    ) -> Result<PathBuf, PlotError> {
        let path = chart_dir.join(kind.file_name());
        match kind {
            ChartKind::InstallsBar => {
                ChartPlotter::draw_installs_bar_chart(summaries, &path, CHART_SIZE)?
            }
            ChartKind::SizeScatter => {
                ChartPlotter::draw_size_installs_scatter(summaries, &path, CHART_SIZE)?
            }
        }
        debug!(path = %path.display(), "Rendered {} chart", kind.title());
        Ok(path)
    }

    /// Render every chart independently; one failing does not stop the others.
    pub fn render_all(summaries: &[BinSummary], chart_dir: &Path) -> Vec<ChartOutcome> {
        let outcomes: Vec<ChartOutcome> = ChartKind::ALL
            .into_iter()
            .map(|kind| ChartOutcome {
                kind,
                result: Self::render(kind, summaries, chart_dir),
            })
            .collect();

        let written = outcomes.iter().filter(|o| o.result.is_ok()).count();
        info!(dir = %chart_dir.display(), written, "Charts rendered");
        outcomes
    }

    /// Open each chart with the system default viewer.
    pub fn open_all(paths: &[PathBuf]) -> io::Result<()> {
        for path in paths {
            open::that(path)?;
        }
        Ok(())
    }
}
