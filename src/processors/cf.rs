//! Climate and Forecast (CF) metadata normalization.
//!
//! Maps raw instrument column names onto CF-style variable names and attaches
//! standard_name/units attributes so the output files are self-describing.

use crate::models::Dataset;
use crate::utils::constants::{CF_CONVENTIONS, TIME_UNITS};

struct CfMeta {
    cf_name: &'static str,
    standard_name: Option<&'static str>,
    long_name: &'static str,
    units: &'static str,
}

fn cf_meta(raw: &str) -> Option<CfMeta> {
    let meta = match raw {
        "CNR" => CfMeta {
            cf_name: "cnr",
            standard_name: None,
            long_name: "carrier-to-noise ratio",
            units: "dB",
        },
        "DRWS" => CfMeta {
            cf_name: "radial_wind_speed",
            standard_name: Some("radial_velocity_of_scatterers_away_from_instrument"),
            long_name: "derived radial wind speed",
            units: "m s-1",
        },
        "WindSpeed" => CfMeta {
            cf_name: "wind_speed",
            standard_name: Some("wind_speed"),
            long_name: "horizontal wind speed",
            units: "m s-1",
        },
        "WindDirection" => CfMeta {
            cf_name: "wind_direction",
            standard_name: Some("wind_from_direction"),
            long_name: "wind direction",
            units: "degree",
        },
        "Temperature" => CfMeta {
            cf_name: "air_temperature",
            standard_name: Some("air_temperature"),
            long_name: "air temperature",
            units: "K",
        },
        "VaporDensity" => CfMeta {
            cf_name: "water_vapor_density",
            standard_name: Some("mass_concentration_of_water_vapor_in_air"),
            long_name: "water vapor density",
            units: "g m-3",
        },
        "Liquid" => CfMeta {
            cf_name: "liquid_water_density",
            standard_name: None,
            long_name: "liquid water density",
            units: "g m-3",
        },
        "cape" => CfMeta {
            cf_name: "cape",
            standard_name: Some("atmosphere_convective_available_potential_energy"),
            long_name: "convective available potential energy",
            units: "J kg-1",
        },
        _ => return None,
    };
    Some(meta)
}

/// Normalize variable names and metadata in place. Variables without a known
/// mapping are passed through untouched.
pub fn make_cf_compliant(dataset: &mut Dataset) {
    dataset.set_attr("Conventions", CF_CONVENTIONS);

    for raw in dataset.var_names() {
        if let Some(meta) = cf_meta(&raw) {
            dataset.rename_var(&raw, meta.cf_name);
            if let Some(standard) = meta.standard_name {
                dataset.set_var_attr(meta.cf_name, "standard_name", standard);
            }
            dataset.set_var_attr(meta.cf_name, "long_name", meta.long_name);
            dataset.set_var_attr(meta.cf_name, "units", meta.units);
        }
    }

    for coord in ["time", "time_wind"] {
        dataset.set_coord_attr_if_missing(coord, "units", TIME_UNITS);
        dataset.set_coord_attr_if_missing(coord, "calendar", "standard");
    }
    dataset.set_coord_attr_if_missing("height", "standard_name", "height");
    dataset.set_coord_attr_if_missing("range", "long_name", "distance from instrument");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Variable;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_variables_renamed_with_metadata() {
        let mut ds = Dataset::new();
        ds.add_dim("time", 1).unwrap();
        ds.add_coord("time", Variable::new(&["time"], vec![0.0]))
            .unwrap();
        ds.add_var("CNR", Variable::new(&["time"], vec![-12.0]))
            .unwrap();
        ds.add_var("DRWS", Variable::new(&["time"], vec![3.0]))
            .unwrap();

        make_cf_compliant(&mut ds);

        assert!(!ds.has_var("CNR"));
        let cnr = ds.var("cnr").unwrap();
        assert_eq!(cnr.attrs.get("units").unwrap(), "dB");
        let rws = ds.var("radial_wind_speed").unwrap();
        assert_eq!(
            rws.attrs.get("standard_name").unwrap(),
            "radial_velocity_of_scatterers_away_from_instrument"
        );
        assert_eq!(ds.attr("Conventions"), Some("CF-1.8"));
        assert_eq!(
            ds.coord("time").unwrap().attrs.get("units").unwrap(),
            "seconds since 1970-01-01 00:00:00"
        );
    }

    #[test]
    fn test_unknown_variables_untouched() {
        let mut ds = Dataset::new();
        ds.add_dim("time", 1).unwrap();
        ds.add_var("Backscatter", Variable::new(&["time"], vec![1.0]))
            .unwrap();

        make_cf_compliant(&mut ds);

        assert!(ds.has_var("Backscatter"));
        assert!(ds.var("Backscatter").unwrap().attrs.is_empty());
    }
}
