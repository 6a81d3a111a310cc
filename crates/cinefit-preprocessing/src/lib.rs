pub mod encoder;
pub mod imputer;
pub mod outliers;
pub mod preprocessor;
pub mod scaler;
pub mod split;

pub use encoder::*;
pub use imputer::*;
pub use outliers::*;
pub use preprocessor::*;
pub use scaler::*;
pub use split::*;
