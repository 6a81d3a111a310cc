use std::path::{Path, PathBuf};

use cinefit_core::{CineError, CineResult};
use tracing::info;

use crate::column::Column;
use crate::dataset::Dataset;

/// Cell spellings treated as missing values.
const MISSING_TOKENS: &[&str] = &["", "na", "nan", "n/a", "null", "none"];

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.iter().any(|t| cell.eq_ignore_ascii_case(t))
}

/// Loads delimited-text datasets from a base data directory.
#[derive(Debug, Clone)]
pub struct DataStore {
    data_dir: PathBuf,
}

impl Default for DataStore {
    fn default() -> Self {
        DataStore::new("data/raw")
    }
}

impl DataStore {
    pub const DEFAULT_FILE: &'static str = "movies.csv";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        DataStore {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load `source` relative to the data directory.
    pub fn load(&self, source: &str) -> CineResult<Dataset> {
        load_csv(self.data_dir.join(source))
    }

    /// Load `filename` from an explicit directory, ignoring the store's own.
    pub fn load_from_dir(dir: impl AsRef<Path>, filename: &str) -> CineResult<Dataset> {
        load_csv(dir.as_ref().join(filename))
    }
}

/// Read a CSV file with a header row into a [`Dataset`].
///
/// A column is numeric when every non-missing cell parses as `f64`,
/// categorical otherwise. Column order follows the header.
pub fn load_csv(path: impl AsRef<Path>) -> CineResult<Dataset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CineError::NotFound(format!("File not found: {}", path.display())));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| CineError::Io(e.to_string()))?;
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| CineError::Parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record.map_err(|e| CineError::Parse(e.to_string()))?;
        for (cells, field) in raw.iter_mut().zip(record.iter()) {
            cells.push(if is_missing(field) { None } else { Some(field.to_string()) });
        }
    }

    let columns = headers.into_iter().zip(raw).map(|(name, cells)| infer_column(name, cells)).collect();
    let dataset = Dataset::new(columns)?;
    if dataset.n_rows() == 0 {
        return Err(CineError::Schema(format!("{} contains no data rows", path.display())));
    }

    info!(
        path = %path.display(),
        rows = dataset.n_rows(),
        cols = dataset.n_cols(),
        columns = ?dataset.column_names(),
        "loaded dataset"
    );
    Ok(dataset)
}

fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|c| match c {
            None => Some(None),
            Some(s) => s.parse::<f64>().ok().map(Some),
        })
        .collect();
    match parsed {
        Some(values) => Column::numeric(name, values),
        None => Column::categorical(name, cells),
    }
}
