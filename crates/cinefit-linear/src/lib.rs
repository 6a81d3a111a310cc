pub mod regression;
pub mod lasso;

pub use regression::*;
pub use lasso::*;
