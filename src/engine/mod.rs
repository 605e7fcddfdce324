pub mod types;
pub mod source;
pub mod estimator;

pub use types::*;
pub use source::*;
pub use estimator::*;
