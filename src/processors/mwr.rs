use std::path::Path;

use crate::error::{ConversionError, Result};
use crate::models::{Dataset, Variable};
use crate::processors::cf;
use crate::readers::mwr_from_csv;
use crate::utils::constants::{SCALE_HEIGHT_KM, SEA_LEVEL_HPA, ZENITH_VIEW};
use crate::writers::NetcdfWriter;

const GRAVITY: f64 = 9.80665;
const DRY_LAPSE_K_PER_KM: f64 = 9.8;

/// Converts one microwave-radiometer level-2 export.
///
/// Keeps only the zenith-pointing retrieval, derives a barometric pressure
/// coordinate from range, attaches a convective-instability index, and
/// writes a CF-compliant file. Defined independently of the batch loop; it
/// is reachable through its own CLI operation.
#[derive(Debug)]
pub struct MwrProcessor {
    resample_minutes: u32,
    writer: NetcdfWriter,
}

impl MwrProcessor {
    pub fn new(resample_minutes: u32) -> Self {
        Self {
            resample_minutes,
            writer: NetcdfWriter::new(),
        }
    }

    pub fn process(&self, lv2_file: &Path, site: &str, output: &Path) -> Result<()> {
        let mut views = mwr_from_csv(lv2_file, self.resample_minutes)?;
        let mut mwr = views.remove(ZENITH_VIEW).ok_or_else(|| {
            ConversionError::MissingData(format!(
                "no '{}' view in {}",
                ZENITH_VIEW,
                lv2_file.display()
            ))
        })?;

        // pressure levels from the fixed barometric profile
        let range = mwr
            .coord("range")
            .ok_or_else(|| ConversionError::MissingData("range coordinate".to_string()))?;
        let hpascals: Vec<f64> = range
            .values
            .iter()
            .map(|km| SEA_LEVEL_HPA * (-km / SCALE_HEIGHT_KM).exp())
            .collect();
        mwr.add_coord(
            "hpascals",
            Variable::new(&["range"], hpascals)
                .with_attr("units", "hPa")
                .with_attr("long_name", "barometric pressure"),
        )?;

        let cape = estimate_cape(&mwr)?;
        mwr.add_var("cape", cape)?;

        mwr.set_attr("site", site);
        cf::make_cf_compliant(&mut mwr);

        self.writer.write(&mwr, output)
    }
}

/// Coarse parcel-buoyancy CAPE estimate from the retrieved temperature
/// profile: lift a surface parcel dry-adiabatically and integrate the
/// positive buoyancy over height.
fn estimate_cape(mwr: &Dataset) -> Result<Variable> {
    let temperature = mwr
        .var("Temperature")
        .ok_or_else(|| ConversionError::MissingData("Temperature profile".to_string()))?;
    let range_km = &mwr
        .coord("range")
        .ok_or_else(|| ConversionError::MissingData("range coordinate".to_string()))?
        .values;

    let n_range = range_km.len();
    let n_time = temperature.values.len() / n_range.max(1);
    let mut cape = vec![f64::NAN; n_time];

    for t in 0..n_time {
        let profile = &temperature.values[t * n_range..(t + 1) * n_range];
        let surface = profile[0];
        if surface.is_nan() {
            continue;
        }
        let mut joules_per_kg = 0.0;
        for k in 1..n_range {
            let env = profile[k];
            if env.is_nan() {
                continue;
            }
            let parcel = surface - DRY_LAPSE_K_PER_KM * (range_km[k] - range_km[0]);
            let buoyancy = (parcel - env) / env;
            if buoyancy > 0.0 {
                let dz_m = (range_km[k] - range_km[k - 1]) * 1000.0;
                joules_per_kg += GRAVITY * buoyancy * dz_m;
            }
        }
        cape[t] = joules_per_kg;
    }

    Ok(Variable::new(&["time"], cape))
}
