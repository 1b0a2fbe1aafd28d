use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::processors::WindPolicy;
use crate::utils::constants::{DEFAULT_CATALOG_DSN, DEFAULT_DATA_ROOT, DEFAULT_RESAMPLE_MINUTES};

/// Runtime configuration, replacing the hard-coded constants of the original
/// batch script. Layering: built-in defaults, then an optional TOML file,
/// then `LIDAR_ARCHIVER_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Base directory for both the output tree and the radiometer files.
    pub data_root: PathBuf,

    /// Aggregation interval for radiometer level-2 data.
    #[validate(range(min = 1, max = 1440))]
    pub resample_minutes: u32,

    /// Catalog connection string.
    #[validate(length(min = 1))]
    pub catalog_dsn: String,

    /// Wind-input selection policy for the batch driver.
    #[serde(default)]
    pub wind_policy: WindPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            resample_minutes: DEFAULT_RESAMPLE_MINUTES,
            catalog_dsn: DEFAULT_CATALOG_DSN.to_string(),
            wind_policy: WindPolicy::default(),
        }
    }
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("data_root", DEFAULT_DATA_ROOT)?
            .set_default("resample_minutes", i64::from(DEFAULT_RESAMPLE_MINUTES))?
            .set_default("catalog_dsn", DEFAULT_CATALOG_DSN)?
            .set_default("wind_policy", "prefer-whole")?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        builder = builder.add_source(Environment::with_prefix("LIDAR_ARCHIVER"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
