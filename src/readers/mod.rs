pub mod lidar_reader;
pub mod mwr_reader;

pub use lidar_reader::lidar_from_csv;
pub use mwr_reader::mwr_from_csv;
