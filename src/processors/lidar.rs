use std::path::Path;

use crate::error::{ConversionError, Result};
use crate::processors::batch::{ConversionJob, Converter};
use crate::processors::cf;
use crate::readers::lidar_from_csv;
use crate::utils::constants::{DROP_VARS, MASKED_VARS, STATUS_VAR};
use crate::writers::NetcdfWriter;

/// Normalizes one lidar day into a CF-compliant netCDF file.
///
/// Loads the CSV triplet, masks the carrier-to-noise ratio and derived
/// radial wind speed wherever the status flag marks a sample invalid, drops
/// auxiliary variables, normalizes metadata, and writes the result in one
/// shot. Recoverable loader signals (no scans, multiple scans) are not
/// caught here; the batch driver classifies them.
#[derive(Debug, Default)]
pub struct LidarProcessor {
    writer: NetcdfWriter,
}

impl LidarProcessor {
    pub fn new() -> Self {
        Self {
            writer: NetcdfWriter::new(),
        }
    }

    pub fn process(
        &self,
        rws_file: &Path,
        scan_file: &Path,
        wind_file: Option<&Path>,
        site: &str,
        output: &Path,
    ) -> Result<()> {
        let mut lidar = lidar_from_csv(rws_file, scan_file, wind_file)?;

        // invalidate flagged samples when the whole product carries the flag
        lidar.mask_where_flag(&MASKED_VARS, STATUS_VAR)?;
        lidar.drop_vars(&DROP_VARS);

        lidar.set_attr("site", site);
        cf::make_cf_compliant(&mut lidar);

        self.writer.write(&lidar, output)
    }
}

impl Converter for LidarProcessor {
    fn convert(&self, job: &ConversionJob<'_>) -> Result<()> {
        let rws = job.rws_file.ok_or_else(|| {
            ConversionError::MissingData(format!(
                "no wind input for {} on {}",
                job.site, job.date
            ))
        })?;
        self.process(
            Path::new(rws),
            Path::new(job.scan_file),
            job.wind_file.map(Path::new),
            job.site,
            &job.output,
        )
    }
}
