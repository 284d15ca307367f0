//! Console Reporter Module
//! Renders each pipeline stage's results as plain text.

use crate::data::{describe_schema, CleaningReport};
use crate::stats::{BinSummary, CorrelationError, CorrelationReport};
use polars::prelude::DataFrame;
use std::io::{self, Write};
use std::path::Path;

/// Writes the analysis report to any output stream.
pub struct Reporter<W: Write> {
    out: W,
    preview_rows: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, preview_rows: usize) -> Self {
        Self { out, preview_rows }
    }

    pub fn loaded(&mut self, path: &Path, df: &DataFrame) -> io::Result<()> {
        writeln!(
            self.out,
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        )
    }

    pub fn cleaning(&mut self, report: &CleaningReport) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Dropped {} rows with missing Category, Size or Installs",
            report.dropped_missing
        )?;
        writeln!(
            self.out,
            "Dropped {} rows with unparseable Size or Installs",
            report.dropped_unparseable
        )?;
        writeln!(
            self.out,
            "Retained {} of {} rows",
            report.rows_retained, report.rows_loaded
        )
    }

    /// Schema listing followed by the first few rows.
    pub fn preview(&mut self, title: &str, df: &DataFrame) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "== {} ==", title)?;
        writeln!(self.out, "Schema:")?;
        for (name, dtype) in describe_schema(df) {
            writeln!(self.out, "  {:<20} {}", name, dtype)?;
        }
        writeln!(self.out, "{}", df.head(Some(self.preview_rows)))
    }

    pub fn aggregation(&mut self, grouped: &DataFrame) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Average installs by size bin:")?;
        writeln!(self.out, "{}", grouped)
    }

    pub fn correlation(
        &mut self,
        result: &Result<CorrelationReport, CorrelationError>,
    ) -> io::Result<()> {
        writeln!(self.out)?;
        match result {
            Ok(report) => {
                writeln!(
                    self.out,
                    "Correlation between Size_MB and Installs_clean: {:.4}",
                    report.coefficient
                )?;
                if let (Some(t), Some(p)) = (report.t_statistic, report.p_value) {
                    writeln!(
                        self.out,
                        "  n = {}, t = {:.4}, p = {:.4}{}",
                        report.sample_size,
                        t,
                        p,
                        if report.is_significant {
                            " (significant)"
                        } else {
                            ""
                        }
                    )?;
                }
                Ok(())
            }
            Err(e) => writeln!(self.out, "Could not compute correlation: {}", e),
        }
    }

    /// Per-bin summary as a plain fixed-width table.
    pub fn bin_table(&mut self, summaries: &[BinSummary]) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{:<12} {:>18} {:>18} {:>10} {:>16}",
            "Size_Bin", "Average Installs", "Median Installs", "App Count", "Average Size MB"
        )?;
        for s in summaries {
            writeln!(
                self.out,
                "{:<12} {:>18.2} {:>18.2} {:>10} {:>16.2}",
                s.bin, s.average_installs, s.median_installs, s.app_count, s.average_size_mb
            )?;
        }
        Ok(())
    }

    pub fn notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", message)
    }

    pub fn json<T: serde::Serialize>(&mut self, value: &T) -> io::Result<()> {
        writeln!(self.out)?;
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)
    }
}
