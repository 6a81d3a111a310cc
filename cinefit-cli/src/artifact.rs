use cinefit::data::Dataset;
use cinefit::pipeline::{Predictor, TrainedModel};
use cinefit::preprocessing::{ImputeStrategy, LabelEncoder, Preprocessor, StandardScaler};
use cinefit::{CineResult, Matrix};
use serde::{Deserialize, Serialize};

/// Everything needed to turn a raw CSV into predictions: the selected model
/// plus the preprocessing state it was trained behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub target: String,
    /// Feature columns in training order.
    pub features: Vec<String>,
    pub impute: ImputeStrategy,
    pub encoders: Vec<LabelEncoder>,
    pub scaler: StandardScaler,
    pub model: TrainedModel,
}

impl ModelArtifact {
    pub fn new(
        target: &str,
        features: Vec<String>,
        impute: ImputeStrategy,
        preprocessor: &Preprocessor,
        model: TrainedModel,
    ) -> Self {
        let mut encoders: Vec<LabelEncoder> = preprocessor.encoders().cloned().collect();
        encoders.sort_by(|a, b| a.column.cmp(&b.column));
        ModelArtifact {
            target: target.to_string(),
            features,
            impute,
            encoders,
            scaler: preprocessor.scaler().clone(),
            model,
        }
    }

    /// Apply the stored preprocessing to fresh data and build the feature matrix.
    ///
    /// The target column is ignored when present. Categories not seen during
    /// training fail with `UnseenCategory`.
    pub fn prepare(&self, dataset: &Dataset) -> CineResult<Matrix> {
        let mut pre = Preprocessor::with_encoders(self.encoders.iter().cloned());
        let ds = pre.impute_missing(dataset, &self.impute)?;
        let categorical: Vec<&str> = self.encoders.iter().map(|e| e.column.as_str()).collect();
        let ds = pre.encode_categorical(&ds, &categorical)?;
        let ds = self.scaler.transform(&ds)?;
        let names: Vec<&str> = self.features.iter().map(String::as_str).collect();
        ds.to_matrix(&names)
    }

    pub fn predictor(&self) -> Predictor {
        Predictor::new(self.model.clone())
    }
}
