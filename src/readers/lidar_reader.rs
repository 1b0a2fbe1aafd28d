use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::Path;

use crate::error::{ConversionError, Result};
use crate::models::{Dataset, Variable};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Measurement columns recognized in radial/whole wind exports. Files may
/// carry any subset; only the columns present become dataset variables.
const MEASUREMENT_COLS: [&str; 6] = ["CNR", "RWS", "DRWS", "Status", "Error", "Confidence"];

/// One scan configuration from the scan-pattern CSV.
#[derive(Debug, Deserialize)]
struct ScanConfig {
    #[serde(rename = "ConfigId")]
    config_id: u32,
    #[serde(rename = "ScanType")]
    scan_type: String,
    #[serde(rename = "Elevation")]
    elevation: f64,
    #[serde(rename = "GateLength")]
    gate_length: f64,
    #[serde(rename = "RangeGates")]
    range_gates: usize,
}

/// Load a lidar CSV triplet into a structured dataset.
///
/// `rws_file` is the per-gate measurement export (whole or radial product,
/// they share a schema), `scan_file` the geometric scan pattern required to
/// interpret it, and `wind_file` an optional summarized wind profile that is
/// merged in on its own dimensions.
///
/// A scan file describing zero configurations signals `NoScans` and more
/// than one signals `MultipleScans`; both are recoverable conditions the
/// caller is expected to classify.
pub fn lidar_from_csv(
    rws_file: &Path,
    scan_file: &Path,
    wind_file: Option<&Path>,
) -> Result<Dataset> {
    let scan = read_scan_config(scan_file)?;
    let mut dataset = read_radial_grid(rws_file, &scan)?;

    dataset.set_attr("scan_type", &scan.scan_type);
    dataset.set_attr("scan_configuration_id", &scan.config_id.to_string());
    dataset.set_attr("elevation_deg", &format!("{:.1}", scan.elevation));

    if let Some(wind) = wind_file {
        merge_wind_profile(&mut dataset, wind)?;
    }

    Ok(dataset)
}

/// Read the scan-pattern file and insist on exactly one configuration.
fn read_scan_config(path: &Path) -> Result<ScanConfig> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut configs = Vec::new();
    for row in reader.deserialize::<ScanConfig>() {
        configs.push(row?);
    }

    if configs.is_empty() {
        return Err(ConversionError::NoScans(path.display().to_string()));
    }
    if configs.len() > 1 {
        return Err(ConversionError::MultipleScans(path.display().to_string()));
    }
    Ok(configs.remove(0))
}

/// Pivot the long-format radial export into time x range grids.
fn read_radial_grid(path: &Path, scan: &ScanConfig) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let time_col = require_column(&headers, "Timestamp", path)?;
    let gate_col = require_column(&headers, "RangeGate", path)?;
    let measurement_cols: Vec<(String, usize)> = MEASUREMENT_COLS
        .iter()
        .filter_map(|name| column_index(&headers, name).map(|i| (name.to_string(), i)))
        .collect();

    // first pass: collect rows, then pivot onto the sorted time axis
    let mut rows: Vec<(i64, usize, Vec<Option<f64>>)> = Vec::new();
    let mut times: Vec<i64> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let stamp = NaiveDateTime::parse_from_str(&record[time_col], TIMESTAMP_FORMAT)?;
        let gate: usize = record[gate_col].parse().map_err(|_| {
            ConversionError::InvalidFormat(format!(
                "bad range gate '{}' in {}",
                &record[gate_col],
                path.display()
            ))
        })?;
        if gate >= scan.range_gates {
            return Err(ConversionError::InvalidFormat(format!(
                "range gate {} outside scan pattern ({} gates) in {}",
                gate,
                scan.range_gates,
                path.display()
            )));
        }
        let values = measurement_cols
            .iter()
            .map(|(_, idx)| parse_optional(&record[*idx]))
            .collect();
        let epoch = stamp.and_utc().timestamp();
        times.push(epoch);
        rows.push((epoch, gate, values));
    }

    if rows.is_empty() {
        return Err(ConversionError::InvalidFormat(format!(
            "no radial samples in {}",
            path.display()
        )));
    }

    times.sort_unstable();
    times.dedup();
    let n_time = times.len();
    let n_range = scan.range_gates;

    let mut dataset = Dataset::new();
    dataset.add_dim("time", n_time)?;
    dataset.add_dim("range", n_range)?;
    dataset.add_coord(
        "time",
        Variable::new(&["time"], times.iter().map(|t| *t as f64).collect()),
    )?;
    // gate-center distances from the instrument
    let ranges = (0..n_range)
        .map(|i| (i as f64 + 0.5) * scan.gate_length)
        .collect();
    dataset.add_coord("range", Variable::new(&["range"], ranges).with_attr("units", "m"))?;

    let mut grids = vec![vec![f64::NAN; n_time * n_range]; measurement_cols.len()];
    for (epoch, gate, values) in rows {
        let t = times.binary_search(&epoch).expect("time collected above");
        for (grid, value) in grids.iter_mut().zip(&values) {
            if let Some(v) = value {
                grid[t * n_range + gate] = *v;
            }
        }
    }
    for ((name, _), grid) in measurement_cols.iter().zip(grids) {
        dataset.add_var(name, Variable::new(&["time", "range"], grid))?;
    }

    Ok(dataset)
}

/// Merge the summarized wind profile on its own time/height dimensions.
fn merge_wind_profile(dataset: &mut Dataset, path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let time_col = require_column(&headers, "Timestamp", path)?;
    let height_col = require_column(&headers, "Height", path)?;
    let speed_col = require_column(&headers, "WindSpeed", path)?;
    let dir_col = require_column(&headers, "WindDirection", path)?;

    let mut rows: Vec<(i64, f64, Option<f64>, Option<f64>)> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let stamp = NaiveDateTime::parse_from_str(&record[time_col], TIMESTAMP_FORMAT)?;
        // heights index a dimension, so NaN/inf cells are malformed input
        let height = parse_finite(&record[height_col]).ok_or_else(|| {
            ConversionError::InvalidFormat(format!(
                "bad height '{}' in {}",
                &record[height_col],
                path.display()
            ))
        })?;
        rows.push((
            stamp.and_utc().timestamp(),
            height,
            parse_optional(&record[speed_col]),
            parse_optional(&record[dir_col]),
        ));
    }

    if rows.is_empty() {
        return Ok(());
    }

    let mut times: Vec<i64> = rows.iter().map(|r| r.0).collect();
    times.sort_unstable();
    times.dedup();
    let mut heights: Vec<f64> = rows.iter().map(|r| r.1).collect();
    heights.sort_by(|a, b| a.partial_cmp(b).expect("finite heights"));
    heights.dedup();

    let (n_time, n_height) = (times.len(), heights.len());
    dataset.add_dim("time_wind", n_time)?;
    dataset.add_dim("height", n_height)?;
    dataset.add_coord(
        "time_wind",
        Variable::new(&["time_wind"], times.iter().map(|t| *t as f64).collect()),
    )?;
    dataset.add_coord(
        "height",
        Variable::new(&["height"], heights.clone()).with_attr("units", "m"),
    )?;

    let mut speed = vec![f64::NAN; n_time * n_height];
    let mut direction = vec![f64::NAN; n_time * n_height];
    for (epoch, height, ws, wd) in rows {
        let t = times.binary_search(&epoch).expect("time collected above");
        let h = heights
            .iter()
            .position(|v| *v == height)
            .expect("height collected above");
        if let Some(v) = ws {
            speed[t * n_height + h] = v;
        }
        if let Some(v) = wd {
            direction[t * n_height + h] = v;
        }
    }
    dataset.add_var("WindSpeed", Variable::new(&["time_wind", "height"], speed))?;
    dataset.add_var(
        "WindDirection",
        Variable::new(&["time_wind", "height"], direction),
    )?;

    Ok(())
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn require_column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    column_index(headers, name).ok_or_else(|| {
        ConversionError::MissingData(format!("column '{}' in {}", name, path.display()))
    })
}

/// Empty and unparseable cells become gaps rather than hard errors.
fn parse_optional(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

fn parse_finite(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
