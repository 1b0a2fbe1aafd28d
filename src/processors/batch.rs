use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::error::Result;
use crate::models::SourceFileRecord;
use crate::utils::paths::OutputLayout;

/// How the per-gate wind input is chosen from the catalogued files.
///
/// The historical batch script gated the fallback on the wrong column: it
/// substituted the radial path only when the *radial* column itself was NULL,
/// clobbering a present whole-wind file in the process. That behavior is kept
/// available as `RadialGated` rather than silently corrected; `PreferWhole`
/// is the documented intent and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindPolicy {
    /// Use the whole-wind file when present, otherwise the radial file.
    PreferWhole,
    /// Replicate the historical gate on the radial column.
    RadialGated,
}

impl Default for WindPolicy {
    fn default() -> Self {
        Self::PreferWhole
    }
}

impl WindPolicy {
    /// Resolve which file feeds the per-gate wind input, if any.
    pub fn resolve<'a>(&self, record: &'a SourceFileRecord) -> Option<&'a str> {
        match self {
            Self::PreferWhole => record
                .whole_wind_file
                .as_deref()
                .or(record.radial_wind_file.as_deref()),
            // the fallback fires when the radial column is NULL, replacing
            // whatever was selected with that same NULL
            Self::RadialGated => {
                if record.radial_wind_file.is_none() {
                    None
                } else {
                    record.whole_wind_file.as_deref()
                }
            }
        }
    }
}

/// One resolved conversion work item handed to a converter.
#[derive(Debug)]
pub struct ConversionJob<'a> {
    pub site: &'a str,
    pub date: NaiveDate,
    pub scan_file: &'a str,
    /// Per-gate measurement input resolved by the wind policy.
    pub rws_file: Option<&'a str>,
    /// Summarized wind profile, passed through unchanged.
    pub wind_file: Option<&'a str>,
    pub output: PathBuf,
}

/// Seam between the batch driver and the conversion adapter.
pub trait Converter {
    fn convert(&self, job: &ConversionJob<'_>) -> Result<()>;
}

/// Outcome counts for one batch run. Per-item failures never fail the run;
/// the process exits non-zero only on a top-level fault.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        format!(
            "Batch complete: {} attempted, {} converted, {} skipped, {} failed",
            self.attempted, self.converted, self.skipped, self.failed
        )
    }
}

/// Iterates catalog results grouped by date and site, resolves inputs,
/// creates output directories, and isolates per-item failures.
pub struct BatchDriver {
    layout: OutputLayout,
    policy: WindPolicy,
}

impl BatchDriver {
    pub fn new(layout: OutputLayout, policy: WindPolicy) -> Self {
        Self { layout, policy }
    }

    /// Process every record, in ascending date order, each exactly once.
    ///
    /// Console contract: one `<site>, <date>` line per item, plus one
    /// `<site>, <date>: <error>` line per non-skip failure. Loader signals
    /// in the silent-skip set produce no console output at all.
    pub fn run(
        &self,
        records: &[SourceFileRecord],
        converter: &dyn Converter,
    ) -> Result<BatchReport> {
        self.run_with_console(records, converter, &mut io::stdout())
    }

    fn run_with_console(
        &self,
        records: &[SourceFileRecord],
        converter: &dyn Converter,
        console: &mut dyn Write,
    ) -> Result<BatchReport> {
        let mut by_date: BTreeMap<NaiveDate, Vec<&SourceFileRecord>> = BTreeMap::new();
        for record in records {
            by_date.entry(record.date).or_default().push(record);
        }

        let mut report = BatchReport::default();
        for (date, day_records) in by_date {
            for record in day_records {
                writeln!(console, "{}, {}", record.site, date)?;
                report.attempted += 1;

                // the writer opens the file directly, so the tree must exist first
                self.layout.ensure_lidar_dir(&record.site, date)?;
                let job = ConversionJob {
                    site: &record.site,
                    date,
                    scan_file: &record.scan_file,
                    rws_file: self.policy.resolve(record),
                    wind_file: record.wind_file.as_deref(),
                    output: self.layout.lidar_file(&record.site, date),
                };

                match converter.convert(&job) {
                    Ok(()) => report.converted += 1,
                    Err(e) if e.is_silent_skip() => {
                        tracing::debug!(site = %record.site, %date, error = %e, "skipping");
                        report.skipped += 1;
                    }
                    Err(e) => {
                        writeln!(console, "{}, {}: {}", record.site, date, e)?;
                        report.failed += 1;
                    }
                }
            }
        }

        Ok(report)
    }
}
