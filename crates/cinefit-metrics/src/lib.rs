pub mod regression;
pub mod evaluator;

pub use regression::*;
pub use evaluator::*;
