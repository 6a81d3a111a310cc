//! cinefit CLI
//!
//! Train movie-rating regressors from a CSV file, inspect datasets and serve
//! predictions from a saved model.

mod artifact;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use cinefit::data::load_csv;
use cinefit::io::{load_model, save_model, write_predictions};
use cinefit::metrics::MetricsCalculator;
use cinefit::pipeline::{PipelineConfig, Trainer};
use cinefit::preprocessing::{train_test_indices, ImputeStrategy, OutlierMethod, Preprocessor};

use crate::artifact::ModelArtifact;

#[derive(Parser)]
#[command(name = "cinefit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Movie rating regression: train, compare and predict", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show shape, column kinds, missing values and numeric summaries
    Info {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Train every registered model and keep the best by R²
    Train {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long)]
        target: Option<String>,

        /// Categorical columns to label-encode
        #[arg(long, value_delimiter = ',')]
        categorical: Vec<String>,

        /// Columns to filter with the IQR rule, in order
        #[arg(long, value_delimiter = ',')]
        outliers: Vec<String>,

        /// Imputation strategy (mean, median)
        #[arg(long)]
        impute: Option<String>,

        /// Fraction of rows held out for evaluation
        #[arg(long)]
        test_ratio: Option<f64>,

        /// JSON pipeline config; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to save the selected model
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Predict with a saved model
    Predict {
        /// Saved model file
        #[arg(short, long)]
        model: PathBuf,

        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Output predictions CSV (printed when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinefit=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { data } => cmd_info(&data)?,
        Commands::Train {
            data,
            target,
            categorical,
            outliers,
            impute,
            test_ratio,
            config,
            output,
        } => {
            let mut pipeline = match &config {
                Some(path) => PipelineConfig::from_json_file(path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            if let Some(t) = target {
                pipeline.target = t;
            }
            if !categorical.is_empty() {
                pipeline.categorical = categorical;
            }
            if !outliers.is_empty() {
                pipeline.outlier_columns = outliers;
            }
            if let Some(i) = impute {
                pipeline.impute = i;
            }
            if let Some(r) = test_ratio {
                pipeline.test_ratio = r;
            }
            cmd_train(&data, &pipeline, output.as_deref())?;
        }
        Commands::Predict { model, data, output } => {
            cmd_predict(&model, &data, output.as_deref())?;
        }
    }

    Ok(())
}

fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    let ds = load_csv(data_path).with_context(|| format!("loading {}", data_path.display()))?;
    println!("{}", ds.describe());
    Ok(())
}

fn cmd_train(data_path: &Path, config: &PipelineConfig, output: Option<&Path>) -> anyhow::Result<()> {
    if !(0.0..1.0).contains(&config.test_ratio) {
        bail!("--test-ratio must be in [0, 1), got {}", config.test_ratio);
    }
    let start = Instant::now();
    let raw = load_csv(data_path).with_context(|| format!("loading {}", data_path.display()))?;

    let impute = ImputeStrategy::from(config.impute.as_str());
    let categorical: Vec<&str> = config.categorical.iter().map(String::as_str).collect();
    let outlier_cols: Vec<&str> = config.outlier_columns.iter().map(String::as_str).collect();

    let mut pre = Preprocessor::new();
    let mut ds = pre.impute_missing(&raw, &impute)?;
    if !outlier_cols.is_empty() {
        ds = pre.remove_outliers(&ds, &outlier_cols, OutlierMethod::Iqr)?;
    }
    let ds = pre.encode_categorical(&ds, &categorical)?;

    let (features, target) = ds.split_features_target(&config.target)?;
    let y = target
        .to_dense()
        .with_context(|| format!("target column '{}' must be numeric and complete", config.target))?;
    let features = pre.scale_features(&features)?;
    let x = features
        .feature_matrix()
        .context("every feature must be numeric; list text columns with --categorical")?;

    let (train, test) = train_test_indices(x.rows(), config.test_ratio, config.seed);
    if test.is_empty() || train.is_empty() {
        bail!(
            "{} rows with test ratio {} leaves an empty train or test set",
            x.rows(),
            config.test_ratio
        );
    }
    let (x_train, x_test) = (x.select_rows(&train), x.select_rows(&test));
    let y_train: Vec<f64> = train.iter().map(|&i| y[i]).collect();
    let y_test: Vec<f64> = test.iter().map(|&i| y[i]).collect();
    info!(train = train.len(), test = test.len(), "split data");

    let mut trainer = Trainer::new(config.trainer.clone());
    trainer.train_all(&x_train, &y_train)?;
    let result = trainer.evaluate_all(&x_test, &y_test)?;

    println!();
    println!("{:<10} {:>10} {:>10} {:>10}", "model", "R2", "RMSE", "MAE");
    for (kind, m) in result.iter() {
        println!("{:<10} {:>10.4} {:>10.4} {:>10.4}", kind.name(), m.r2, m.rmse, m.mae);
    }

    let best = trainer.best().context("no model was selected")?;
    let mut calculator = MetricsCalculator::new();
    calculator.evaluate(&y_test, &best.predict(&x_test)?)?;
    println!();
    println!("Best model: {}", best.name());
    print!("{}", calculator.render_report());

    if let Some(path) = output {
        let names = features.column_names().iter().map(|s| s.to_string()).collect();
        let artifact = ModelArtifact::new(&config.target, names, impute, &pre, best.clone());
        save_model(&artifact, path).with_context(|| format!("saving model to {}", path.display()))?;
        println!("Saved {} model to {}", best.name(), path.display());
    }

    info!(elapsed = ?start.elapsed(), "train finished");
    Ok(())
}

fn cmd_predict(model_path: &Path, data_path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let artifact: ModelArtifact = load_model(model_path)
        .with_context(|| format!("loading model {}", model_path.display()))?;
    let ds = load_csv(data_path).with_context(|| format!("loading {}", data_path.display()))?;

    let x = artifact.prepare(&ds)?;
    let predictor = artifact.predictor();
    let predictions = predictor.predict(&x)?;
    info!(model = predictor.model_name(), rows = predictions.len(), "predicted");

    let header = format!("predicted_{}", artifact.target);
    match output {
        Some(path) => {
            write_predictions(path, &header, &predictions)?;
            println!("Wrote {} predictions to {}", predictions.len(), path.display());
        }
        None => {
            println!("{}", header);
            for p in &predictions {
                println!("{:.4}", p);
            }
        }
    }
    Ok(())
}
