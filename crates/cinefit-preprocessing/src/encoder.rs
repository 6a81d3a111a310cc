use std::collections::HashMap;

use cinefit_core::{CineError, CineResult};
use serde::{Deserialize, Serialize};

/// Encode categorical string labels as integer codes.
///
/// Codes are ranks in the sorted set of labels seen at fit time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub column: String,
    pub classes: Vec<String>,
    class_to_idx: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        LabelEncoder {
            column: column.into(),
            ..LabelEncoder::default()
        }
    }

    /// Fit the encoder on string labels.
    pub fn fit(&mut self, labels: &[String]) {
        let mut unique: Vec<String> = labels.to_vec();
        unique.sort();
        unique.dedup();
        self.class_to_idx = unique.iter().enumerate().map(|(i, c)| (c.clone(), i)).collect();
        self.classes = unique;
    }

    /// Map labels to codes; any label absent at fit time is an error.
    pub fn transform(&self, labels: &[String]) -> CineResult<Vec<usize>> {
        labels
            .iter()
            .map(|l| {
                self.class_to_idx.get(l).copied().ok_or_else(|| CineError::UnseenCategory {
                    column: self.column.clone(),
                    category: l.clone(),
                })
            })
            .collect()
    }

    pub fn fit_transform(&mut self, labels: &[String]) -> CineResult<Vec<usize>> {
        self.fit(labels);
        self.transform(labels)
    }

    /// Inverse transform: code → label.
    pub fn inverse_transform(&self, codes: &[usize]) -> CineResult<Vec<String>> {
        codes
            .iter()
            .map(|&c| {
                self.classes.get(c).cloned().ok_or_else(|| {
                    CineError::InvalidOperation(format!(
                        "code {} out of range for column '{}' ({} classes)",
                        c,
                        self.column,
                        self.classes.len()
                    ))
                })
            })
            .collect()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}
