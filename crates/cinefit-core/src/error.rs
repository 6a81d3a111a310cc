use thiserror::Error;

/// Error type shared by every cinefit crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CineError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Unseen category {category:?} in column '{column}'")]
    UnseenCategory { column: String, category: String },

    #[error("Model not trained yet")]
    NotTrained,

    #[error("Singular matrix: cannot solve system")]
    SingularMatrix,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CineError {
    /// True when the failure means "call again later", as opposed to bad input.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, CineError::NotTrained)
    }
}

impl From<std::io::Error> for CineError {
    fn from(e: std::io::Error) -> Self {
        CineError::Io(e.to_string())
    }
}

pub type CineResult<T> = Result<T, CineError>;
