pub mod batch;
pub mod cf;
pub mod lidar;
pub mod mwr;

pub use batch::{BatchDriver, BatchReport, ConversionJob, Converter, WindPolicy};
pub use lidar::LidarProcessor;
pub use mwr::MwrProcessor;
