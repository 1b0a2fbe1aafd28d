pub mod constants;
pub mod paths;
pub mod progress;

pub use constants::*;
pub use paths::OutputLayout;
pub use progress::ProgressReporter;
