use std::path::Path;

use cinefit_core::{CineError, CineResult, Matrix};
use cinefit_io::{load_model, save_model};

use crate::registry::TrainedModel;
use crate::trainer::Trainer;

/// Serves predictions from a single fitted model, either the trainer's
/// selected best or one loaded from disk.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: TrainedModel,
}

impl Predictor {
    pub fn new(model: TrainedModel) -> Self {
        Predictor { model }
    }

    /// Take a copy of the trainer's selected model.
    pub fn from_trainer(trainer: &Trainer) -> CineResult<Self> {
        let model = trainer.best().ok_or(CineError::NotTrained)?;
        Ok(Predictor::new(model.clone()))
    }

    pub fn load(path: impl AsRef<Path>) -> CineResult<Self> {
        Ok(Predictor::new(load_model(path)?))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> CineResult<()> {
        save_model(&self.model, path)
    }

    pub fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        self.model.predict(x)
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainerConfig;
    use approx::assert_abs_diff_eq;

    fn trained() -> (Trainer, Matrix, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..25).map(|i| vec![i as f64, ((i * 5) % 7) as f64]).collect();
        let y: Vec<f64> = rows.iter().map(|r| r[0] - 2.0 * r[1] + 0.3).collect();
        let x = Matrix::from_rows(&rows).unwrap();

        let mut config = TrainerConfig::default();
        config.random_forest.n_estimators = 5;
        config.gradient_boosting.n_estimators = 5;
        let mut trainer = Trainer::new(config);
        trainer.train_all(&x, &y).unwrap();
        trainer.evaluate_all(&x, &y).unwrap();
        (trainer, x, y)
    }

    #[test]
    fn test_requires_selection() {
        let err = Predictor::from_trainer(&Trainer::default()).unwrap_err();
        assert!(err.is_not_ready());
    }

    #[test]
    fn test_save_load_predicts_same() {
        let (trainer, x, _) = trained();
        let predictor = Predictor::from_trainer(&trainer).unwrap();
        assert_eq!(predictor.model_name(), "linear");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        predictor.save(&path).unwrap();
        let loaded = Predictor::load(&path).unwrap();

        assert_eq!(loaded.model_name(), predictor.model_name());
        let a = predictor.predict(&x).unwrap();
        let b = loaded.predict(&x).unwrap();
        for (p, q) in a.iter().zip(&b) {
            assert_abs_diff_eq!(*p, *q, epsilon = 1e-9);
        }
    }
}
