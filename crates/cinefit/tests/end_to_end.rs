use std::fs;

use cinefit::data::{Column, DataStore, Dataset};
use cinefit::pipeline::{ModelKind, Predictor, Trainer, TrainerConfig};
use cinefit::preprocessing::{train_test_indices, ImputeStrategy, OutlierMethod, Preprocessor};
use cinefit::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GENRES: [&str; 5] = ["Action", "Comedy", "Drama", "Horror", "Sci-Fi"];

fn movies(n: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(7);
    let mut budget = Vec::with_capacity(n);
    let mut year = Vec::with_capacity(n);
    let mut genre = Vec::with_capacity(n);
    let mut rating = Vec::with_capacity(n);

    for i in 0..n {
        let b: f64 = rng.gen_range(1.0..200.0);
        let y: f64 = rng.gen_range(1980..2024) as f64;
        let g = i % GENRES.len();
        let r = 4.0 + 0.01 * b + 0.03 * (y - 1980.0) + 0.4 * g as f64 + rng.gen_range(-0.3..0.3);

        budget.push(if i % 17 == 3 { None } else { Some(b) });
        year.push(Some(y));
        genre.push(Some(GENRES[g].to_string()));
        rating.push(Some(r));
    }

    Dataset::new(vec![
        Column::numeric("budget", budget),
        Column::numeric("year", year),
        Column::categorical("genre", genre),
        Column::numeric("rating", rating),
    ])
    .unwrap()
}

fn small_config() -> TrainerConfig {
    let mut config = TrainerConfig::default();
    config.random_forest.n_estimators = 20;
    config.gradient_boosting.n_estimators = 30;
    config
}

/// Impute, encode, scale features and split; returns (x_train, x_test, y_train, y_test).
fn prepare(dataset: &Dataset, pre: &mut Preprocessor) -> (Matrix, Matrix, Vec<f64>, Vec<f64>) {
    let ds = pre.impute_missing(dataset, &ImputeStrategy::Mean).unwrap();
    let ds = pre.encode_categorical(&ds, &["genre"]).unwrap();
    let (features, target) = ds.split_features_target("rating").unwrap();
    let features = pre.scale_features(&features).unwrap();

    let x = features.feature_matrix().unwrap();
    let y = target.to_dense().unwrap();
    let (train, test) = train_test_indices(x.rows(), 0.2, Some(42));
    let y_train = train.iter().map(|&i| y[i]).collect();
    let y_test = test.iter().map(|&i| y[i]).collect();
    (x.select_rows(&train), x.select_rows(&test), y_train, y_test)
}

#[test]
fn test_movie_ratings_end_to_end() {
    let dataset = movies(100);
    assert_eq!(dataset.total_missing(), 6);

    let mut pre = Preprocessor::new();
    let (x_train, x_test, y_train, y_test) = prepare(&dataset, &mut pre);
    assert_eq!(pre.encoder("genre").unwrap().n_classes(), 5);
    assert_eq!((x_train.rows(), x_test.rows()), (80, 20));
    assert_eq!(x_train.cols(), 3);

    let mut trainer = Trainer::new(small_config());
    trainer.train_all(&x_train, &y_train).unwrap();
    let result = trainer.evaluate_all(&x_test, &y_test).unwrap();

    assert_eq!(result.len(), 5);
    for kind in ModelKind::ALL {
        let metrics = result.get(kind).unwrap();
        assert!(metrics.r2 <= 1.0, "{} r2 = {}", kind, metrics.r2);
        assert!(metrics.rmse >= 0.0 && metrics.mae >= 0.0);
    }

    let held_out = x_test.select_rows(&[0]);
    let pred = trainer.predict(&held_out).unwrap();
    assert_eq!(pred.len(), 1);
    assert!(pred[0].is_finite());

    let best = trainer.selection();
    let best_r2 = best.best_score().unwrap();
    assert!(result.iter().all(|(_, m)| m.r2 <= best_r2));
}

#[test]
fn test_csv_to_saved_model() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = String::from("budget,year,genre,rating\n");
    let dataset = movies(60);
    for row in 0..dataset.n_rows() {
        let cell = |name: &str| -> String {
            let column = dataset.require(name).unwrap();
            match column.as_numeric() {
                Some(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
                None => column.as_categorical().unwrap()[row].clone().unwrap_or_default(),
            }
        };
        body.push_str(&format!("{},{},{},{}\n", cell("budget"), cell("year"), cell("genre"), cell("rating")));
    }
    fs::write(dir.path().join(DataStore::DEFAULT_FILE), body).unwrap();

    let loaded = DataStore::new(dir.path()).load(DataStore::DEFAULT_FILE).unwrap();
    assert_eq!(loaded.shape(), (60, 4));
    assert_eq!(loaded.describe().missing_values()["budget"], 4);

    let mut pre = Preprocessor::new();
    let cleaned = pre.impute_missing(&loaded, &ImputeStrategy::Median).unwrap();
    let cleaned = pre.remove_outliers(&cleaned, &["budget", "rating"], OutlierMethod::Iqr).unwrap();
    assert!(cleaned.n_rows() <= loaded.n_rows());

    let (x_train, x_test, y_train, y_test) = prepare(&cleaned, &mut pre);
    let mut trainer = Trainer::new(small_config());
    trainer.train_all(&x_train, &y_train).unwrap();
    trainer.evaluate_all(&x_test, &y_test).unwrap();

    let path = dir.path().join("models").join("best.json");
    let predictor = Predictor::from_trainer(&trainer).unwrap();
    predictor.save(&path).unwrap();
    let restored = Predictor::load(&path).unwrap();
    assert_eq!(restored.model_name(), predictor.model_name());
    assert_eq!(restored.predict(&x_test).unwrap().len(), x_test.rows());
}
