use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConversionError, Result};
use crate::models::{Dataset, Variable};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct Lv2Row {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Processor")]
    processor: String,
    #[serde(rename = "RangeKm")]
    range_km: f64,
    #[serde(rename = "Temperature")]
    temperature: Option<f64>,
    #[serde(rename = "VaporDensity")]
    vapor_density: Option<f64>,
    #[serde(rename = "Liquid")]
    liquid: Option<f64>,
}

/// Load a microwave-radiometer level-2 export, bucket-averaged onto a fixed
/// resampling interval, split into one dataset per retrieval view
/// ("Zenith", off-axis angles, ...).
pub fn mwr_from_csv(
    lv2_file: &Path,
    resample_minutes: u32,
) -> Result<BTreeMap<String, Dataset>> {
    let bucket_secs = i64::from(resample_minutes.max(1)) * 60;

    let mut reader = csv::Reader::from_path(lv2_file)?;
    let mut by_view: BTreeMap<String, Vec<(i64, f64, Lv2Row)>> = BTreeMap::new();
    for row in reader.deserialize::<Lv2Row>() {
        let row = row?;
        // ranges index a dimension, so NaN/inf cells are malformed input
        if !row.range_km.is_finite() {
            return Err(ConversionError::InvalidFormat(format!(
                "non-finite range '{}' in {}",
                row.range_km,
                lv2_file.display()
            )));
        }
        let stamp = NaiveDateTime::parse_from_str(&row.timestamp, TIMESTAMP_FORMAT)?;
        let epoch = stamp.and_utc().timestamp();
        let bucket = epoch - epoch.rem_euclid(bucket_secs);
        by_view
            .entry(row.processor.clone())
            .or_default()
            .push((bucket, row.range_km, row));
    }

    if by_view.is_empty() {
        return Err(ConversionError::InvalidFormat(format!(
            "no level-2 samples in {}",
            lv2_file.display()
        )));
    }

    by_view
        .into_iter()
        .map(|(view, rows)| Ok((view, build_view_dataset(rows)?)))
        .collect()
}

/// Average one view's samples onto the bucketed time axis.
fn build_view_dataset(rows: Vec<(i64, f64, Lv2Row)>) -> Result<Dataset> {
    let mut times: Vec<i64> = rows.iter().map(|r| r.0).collect();
    times.sort_unstable();
    times.dedup();
    let mut ranges: Vec<f64> = rows.iter().map(|r| r.1).collect();
    ranges.sort_by(|a, b| a.partial_cmp(b).expect("finite ranges"));
    ranges.dedup();

    let (n_time, n_range) = (times.len(), ranges.len());
    let mut sums = [
        vec![0.0; n_time * n_range],
        vec![0.0; n_time * n_range],
        vec![0.0; n_time * n_range],
    ];
    let mut counts = [
        vec![0u32; n_time * n_range],
        vec![0u32; n_time * n_range],
        vec![0u32; n_time * n_range],
    ];

    for (bucket, range_km, row) in rows {
        let t = times.binary_search(&bucket).expect("bucket collected above");
        let r = ranges
            .iter()
            .position(|v| *v == range_km)
            .expect("range collected above");
        let cell = t * n_range + r;
        for (slot, value) in [row.temperature, row.vapor_density, row.liquid]
            .into_iter()
            .enumerate()
        {
            if let Some(v) = value {
                sums[slot][cell] += v;
                counts[slot][cell] += 1;
            }
        }
    }

    let mut dataset = Dataset::new();
    dataset.add_dim("time", n_time)?;
    dataset.add_dim("range", n_range)?;
    dataset.add_coord(
        "time",
        Variable::new(&["time"], times.iter().map(|t| *t as f64).collect()),
    )?;
    dataset.add_coord(
        "range",
        Variable::new(&["range"], ranges).with_attr("units", "km"),
    )?;

    for (name, (sum, count)) in ["Temperature", "VaporDensity", "Liquid"]
        .iter()
        .zip(sums.into_iter().zip(counts))
    {
        let values = sum
            .into_iter()
            .zip(count)
            .map(|(s, c)| if c > 0 { s / f64::from(c) } else { f64::NAN })
            .collect();
        dataset.add_var(name, Variable::new(&["time", "range"], values))?;
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_lv2(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("lv2.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_views_split_and_resampled() {
        let tmp = TempDir::new().unwrap();
        // two samples inside the same 5-minute bucket, one outside
        let lv2 = write_lv2(
            &tmp,
            "Timestamp,Processor,RangeKm,Temperature,VaporDensity,Liquid\n\
             2024-01-02 00:01:00,Zenith,0.0,280.0,6.0,0.1\n\
             2024-01-02 00:03:00,Zenith,0.0,282.0,6.4,0.1\n\
             2024-01-02 00:07:00,Zenith,0.0,281.0,6.2,0.2\n\
             2024-01-02 00:01:00,Angle20N,0.0,279.0,6.0,0.1\n",
        );

        let views = mwr_from_csv(&lv2, 5).unwrap();
        assert_eq!(
            views.keys().cloned().collect::<Vec<_>>(),
            vec!["Angle20N".to_string(), "Zenith".to_string()]
        );

        let zenith = &views["Zenith"];
        assert_eq!(zenith.dim_len("time"), Some(2));
        let temp = &zenith.var("Temperature").unwrap().values;
        assert_eq!(temp[0], 281.0); // mean of 280 and 282
        assert_eq!(temp[1], 281.0);
    }

    #[test]
    fn test_missing_cells_are_gaps() {
        let tmp = TempDir::new().unwrap();
        let lv2 = write_lv2(
            &tmp,
            "Timestamp,Processor,RangeKm,Temperature,VaporDensity,Liquid\n\
             2024-01-02 00:01:00,Zenith,0.0,280.0,,\n\
             2024-01-02 00:01:00,Zenith,0.5,,6.0,0.1\n",
        );

        let views = mwr_from_csv(&lv2, 5).unwrap();
        let zenith = &views["Zenith"];
        let temp = &zenith.var("Temperature").unwrap().values;
        assert_eq!(temp[0], 280.0);
        assert!(temp[1].is_nan());
        let vapor = &zenith.var("VaporDensity").unwrap().values;
        assert!(vapor[0].is_nan());
        assert_eq!(vapor[1], 6.0);
    }

    #[test]
    fn test_non_finite_range_rejected() {
        let tmp = TempDir::new().unwrap();
        // "NaN" parses as a valid f64 but cannot index the range dimension
        let lv2 = write_lv2(
            &tmp,
            "Timestamp,Processor,RangeKm,Temperature,VaporDensity,Liquid\n\
             2024-01-02 00:01:00,Zenith,0.0,280.0,6.0,0.1\n\
             2024-01-02 00:01:00,Zenith,NaN,281.0,6.1,0.1\n",
        );

        let err = mwr_from_csv(&lv2, 5).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidFormat(_)));
        assert!(!err.is_silent_skip());
    }

    #[test]
    fn test_empty_file_rejected() {
        let tmp = TempDir::new().unwrap();
        let lv2 = write_lv2(
            &tmp,
            "Timestamp,Processor,RangeKm,Temperature,VaporDensity,Liquid\n",
        );
        let err = mwr_from_csv(&lv2, 5).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidFormat(_)));
    }
}
