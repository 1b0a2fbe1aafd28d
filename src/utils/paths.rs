use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::constants::LIDAR_NETCDF_DIR;

/// Derives the nested `site/year/month` output layout under the data root.
///
/// Path construction is pure; only `ensure_lidar_dir` touches the filesystem,
/// using `create_dir_all` so a directory that already exists is tolerated and
/// concurrent creation cannot race.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    data_root: PathBuf,
}

impl OutputLayout {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// `<root>/lidar_netcdf/<site>/<year>/<month>/` for a site and date.
    /// The site name is used literally as a directory name.
    pub fn lidar_dir(&self, site: &str, date: NaiveDate) -> PathBuf {
        self.data_root
            .join(LIDAR_NETCDF_DIR)
            .join(site)
            .join(date.year().to_string())
            .join(format!("{:02}", date.month()))
    }

    /// Full output path `<dir>/<YYYYMMDD>_<site>_lidar.nc`.
    pub fn lidar_file(&self, site: &str, date: NaiveDate) -> PathBuf {
        self.lidar_dir(site, date)
            .join(format!("{}_{}_lidar.nc", date.format("%Y%m%d"), site))
    }

    /// Fixed radiometer output pattern `<root>/<site>_mwr.nc`.
    pub fn mwr_file(&self, site: &str) -> PathBuf {
        self.data_root.join(format!("{}_mwr.nc", site))
    }

    /// Create the lidar output directory for a site and date, including any
    /// missing parents, and return it.
    pub fn ensure_lidar_dir(&self, site: &str, date: NaiveDate) -> Result<PathBuf> {
        let dir = self.lidar_dir(site, date);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_lidar_file_is_pure() {
        let layout = OutputLayout::new("/data");
        let a = layout.lidar_file("S1", date(2024, 1, 2));
        let b = layout.lidar_file("S1", date(2024, 1, 2));
        assert_eq!(a, b);
        assert_eq!(
            a,
            PathBuf::from("/data/lidar_netcdf/S1/2024/01/20240102_S1_lidar.nc")
        );
    }

    #[test]
    fn test_month_is_zero_padded() {
        let layout = OutputLayout::new("/data");
        let dir = layout.lidar_dir("ALBANY", date(2016, 4, 12));
        assert_eq!(dir, PathBuf::from("/data/lidar_netcdf/ALBANY/2016/04"));
    }

    #[test]
    fn test_mwr_file_pattern() {
        let layout = OutputLayout::new("/data");
        assert_eq!(layout.mwr_file("S1"), PathBuf::from("/data/S1_mwr.nc"));
    }

    #[test]
    fn test_ensure_lidar_dir_creates_and_tolerates_existing() {
        let tmp = TempDir::new().unwrap();
        let layout = OutputLayout::new(tmp.path());

        let dir = layout.ensure_lidar_dir("S1", date(2024, 1, 2)).unwrap();
        assert!(dir.is_dir());
        assert!(dir.ends_with("lidar_netcdf/S1/2024/01"));

        // second call against the existing tree succeeds
        let again = layout.ensure_lidar_dir("S1", date(2024, 1, 2)).unwrap();
        assert_eq!(dir, again);
    }
}
