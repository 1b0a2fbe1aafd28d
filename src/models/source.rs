use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One catalogued instrument day still awaiting conversion.
///
/// Produced by the catalog query, one row per (site, date) pairing that has
/// no matching output record. Read-only for the lifetime of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileRecord {
    pub site: String,
    pub date: NaiveDate,
    /// Scan-pattern CSV paired with the radial measurements.
    pub scan_file: String,
    /// Merged multi-beam "whole" wind product, when the instrument produced one.
    pub whole_wind_file: Option<String>,
    /// Summarized wind CSV, passed through to the loader unchanged.
    pub wind_file: Option<String>,
    /// Per-beam radial velocity export, the fallback wind input.
    pub radial_wind_file: Option<String>,
}

impl SourceFileRecord {
    pub fn new(
        site: impl Into<String>,
        date: NaiveDate,
        scan_file: impl Into<String>,
        whole_wind_file: Option<String>,
        wind_file: Option<String>,
        radial_wind_file: Option<String>,
    ) -> Self {
        Self {
            site: site.into(),
            date,
            scan_file: scan_file.into(),
            whole_wind_file,
            wind_file,
            radial_wind_file,
        }
    }
}
