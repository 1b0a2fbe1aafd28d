/// Directory under the data root holding converted lidar files
pub const LIDAR_NETCDF_DIR: &str = "lidar_netcdf";

/// Settings defaults
pub const DEFAULT_DATA_ROOT: &str = "/farm1/mesonet/data";
pub const DEFAULT_CATALOG_DSN: &str = "postgresql:///files";
pub const DEFAULT_RESAMPLE_MINUTES: u32 = 5;

/// Quality flag variable gating the lidar measurement mask
pub const STATUS_VAR: &str = "Status";

/// Measurement variables masked wherever the status flag is invalid
pub const MASKED_VARS: [&str; 2] = ["CNR", "DRWS"];

/// Auxiliary variables removed before writing, when present
pub const DROP_VARS: [&str; 4] = ["Status", "Error", "Confidence", "RWS"];

/// Radiometer view retained for level-2 processing
pub const ZENITH_VIEW: &str = "Zenith";

/// Barometric pressure profile applied to the radiometer range coordinate
pub const SEA_LEVEL_HPA: f64 = 1013.25;
pub const SCALE_HEIGHT_KM: f64 = 7.0;

/// Time coordinate encoding for output files
pub const TIME_UNITS: &str = "seconds since 1970-01-01 00:00:00";

/// Metadata conventions version stamped on every output file
pub const CF_CONVENTIONS: &str = "CF-1.8";
