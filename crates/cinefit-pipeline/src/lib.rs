pub mod config;
pub mod estimator;
pub mod predictor;
pub mod registry;
pub mod trainer;

pub use config::*;
pub use estimator::*;
pub use predictor::*;
pub use registry::*;
pub use trainer::*;
