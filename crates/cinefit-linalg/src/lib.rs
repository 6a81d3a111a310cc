pub mod decomposition;
pub mod solve;
pub mod svd;

pub use decomposition::*;
pub use solve::*;
pub use svd::*;
