use cinefit_core::{CineError, CineResult};
use cinefit_data::{ColumnData, Dataset};
use std::path::Path;

fn csv_err(e: csv::Error) -> CineError {
    CineError::Io(e.to_string())
}

/// Write a dataset to CSV with a header row. Missing cells are written empty.
pub fn write_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> CineResult<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref()).map_err(csv_err)?;
    wtr.write_record(dataset.column_names()).map_err(csv_err)?;

    for row in 0..dataset.n_rows() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|c| match c.data() {
                ColumnData::Numeric(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
                ColumnData::Categorical(v) => v[row].clone().unwrap_or_default(),
            })
            .collect();
        wtr.write_record(&record).map_err(csv_err)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write one prediction per row under a single `header` column.
pub fn write_predictions(path: impl AsRef<Path>, header: &str, predictions: &[f64]) -> CineResult<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref()).map_err(csv_err)?;
    wtr.write_record([header]).map_err(csv_err)?;
    for p in predictions {
        wtr.write_record([p.to_string()]).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinefit_data::{load_csv, Column};
    use std::fs;

    #[test]
    fn test_write_dataset_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let ds = Dataset::new(vec![
            Column::numeric("budget", vec![Some(1.5), None]),
            Column::categorical("genre", vec![Some("Drama".into()), Some("Comedy".into())]),
        ])
        .unwrap();

        write_dataset(&path, &ds).unwrap();
        let back = load_csv(&path).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn test_write_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pred.csv");
        write_predictions(&path, "predicted_rating", &[7.5, 6.25]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "predicted_rating\n7.5\n6.25\n");
    }
}
