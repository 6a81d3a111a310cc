use std::collections::BTreeMap;

use cinefit_core::{CineError, CineResult, Matrix};
use cinefit_metrics::{MetricsCalculator, MetricsRecord};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TrainerConfig;
use crate::registry::{ModelKind, Regressor, TrainedModel};

/// Metrics for every evaluated model, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationResult {
    entries: Vec<(ModelKind, MetricsRecord)>,
}

impl EvaluationResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, kind: ModelKind) -> Option<&MetricsRecord> {
        self.entries.iter().find(|(k, _)| *k == kind).map(|(_, m)| m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelKind, &MetricsRecord)> {
        self.entries.iter().map(|(k, m)| (*k, m))
    }

    /// Plain nested record: model name to metric name to value.
    pub fn to_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.entries
            .iter()
            .map(|(k, m)| (k.name().to_string(), m.to_map()))
            .collect()
    }
}

/// Best model seen so far, across every evaluation pass of a trainer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionState {
    best: Option<(ModelKind, f64)>,
}

impl SelectionState {
    /// Offer a candidate score. Returns true when it becomes the new best.
    ///
    /// Only a strictly greater R² replaces the current best, so a NaN score
    /// never wins against an existing best and a NaN best is never replaced.
    pub fn consider(&mut self, kind: ModelKind, r2: f64) -> bool {
        let replace = match self.best {
            None => true,
            Some((_, best)) => r2 > best,
        };
        if replace {
            self.best = Some((kind, r2));
        }
        replace
    }

    pub fn best_name(&self) -> Option<ModelKind> {
        self.best.map(|(k, _)| k)
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best.map(|(_, s)| s)
    }
}

/// Fits the registered models, scores them and keeps track of the best one.
#[derive(Debug, Default)]
pub struct Trainer {
    pub config: TrainerConfig,
    models: Vec<TrainedModel>,
    selection: SelectionState,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Trainer {
            config,
            models: Vec::new(),
            selection: SelectionState::default(),
        }
    }

    /// Fit every registered model on the same data.
    ///
    /// The first fit error aborts the batch and leaves the trainer empty.
    /// The selection survives retraining: the best name and score from earlier
    /// passes are kept, and `best()` then returns the refitted model of that kind.
    pub fn train_all(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()> {
        self.models.clear();
        info!(rows = x.rows(), features = x.cols(), parallel = self.config.parallel, "training models");

        let config = &self.config;
        let fit_one = |kind: ModelKind| -> CineResult<TrainedModel> {
            let model = TrainedModel::fit(Regressor::build(kind, config), x, y)?;
            debug!(model = %kind, "fitted");
            Ok(model)
        };

        let models = if config.parallel {
            ModelKind::ALL.as_slice().par_iter().map(|&k| fit_one(k)).collect::<CineResult<Vec<_>>>()?
        } else {
            ModelKind::ALL.iter().map(|&k| fit_one(k)).collect::<CineResult<Vec<_>>>()?
        };

        self.models = models;
        info!(models = self.models.len(), "training complete");
        Ok(())
    }

    /// Score every fitted model on `(x, y)` and select the best by R².
    ///
    /// Scores are offered to the selection kept from earlier passes, so the
    /// best score never decreases. A failing pass leaves the selection untouched.
    pub fn evaluate_all(&mut self, x: &Matrix, y: &[f64]) -> CineResult<EvaluationResult> {
        if self.models.is_empty() {
            return Err(CineError::NotTrained);
        }

        let mut calculator = MetricsCalculator::new();
        let mut selection = self.selection;
        let mut result = EvaluationResult::default();

        for model in &self.models {
            let pred = model.predict(x)?;
            let metrics = calculator.evaluate(y, &pred)?;
            info!(model = model.name(), r2 = metrics.r2, rmse = metrics.rmse, mae = metrics.mae, "evaluated");
            if selection.consider(model.kind(), metrics.r2) {
                info!(model = model.name(), r2 = metrics.r2, "new best model");
            }
            result.entries.push((model.kind(), metrics));
        }

        self.selection = selection;
        Ok(result)
    }

    /// Predict with the selected model.
    pub fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        self.best().ok_or(CineError::NotTrained)?.predict(x)
    }

    /// The selected model, once `evaluate_all` has run.
    pub fn best(&self) -> Option<&TrainedModel> {
        let kind = self.selection.best_name()?;
        self.model(kind)
    }

    pub fn model(&self, kind: ModelKind) -> Option<&TrainedModel> {
        self.models.iter().find(|m| m.kind() == kind)
    }

    pub fn models(&self) -> &[TrainedModel] {
        &self.models
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }
}
