pub mod dataset;
pub mod source;

pub use dataset::{Dataset, Variable};
pub use source::SourceFileRecord;
