use std::fmt;

use serde::{Deserialize, Serialize};

/// How missing numeric cells are filled.
///
/// Unrecognized names parse to `Unsupported`, which imputation treats as a
/// no-op (the data passes through unchanged).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImputeStrategy {
    Mean,
    Median,
    Unsupported(String),
}

impl Default for ImputeStrategy {
    fn default() -> Self {
        ImputeStrategy::Mean
    }
}

impl From<&str> for ImputeStrategy {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "mean" => ImputeStrategy::Mean,
            "median" => ImputeStrategy::Median,
            _ => ImputeStrategy::Unsupported(name.to_string()),
        }
    }
}

impl From<String> for ImputeStrategy {
    fn from(name: String) -> Self {
        ImputeStrategy::from(name.as_str())
    }
}

impl From<ImputeStrategy> for String {
    fn from(s: ImputeStrategy) -> Self {
        s.to_string()
    }
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputeStrategy::Mean => f.write_str("mean"),
            ImputeStrategy::Median => f.write_str("median"),
            ImputeStrategy::Unsupported(name) => f.write_str(name),
        }
    }
}
