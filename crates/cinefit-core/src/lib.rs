pub mod error;
pub mod matrix;

pub use error::{CineError, CineResult};
pub use matrix::Matrix;
