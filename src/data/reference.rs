//! Labeled reference dataset

use std::path::Path;

use csv::ReaderBuilder;

use super::table::FeatureTable;
use super::parse_cell;
use crate::{Error, Result};

/// The original labeled training table `{features..., target}`
///
/// Serves both as the drift baseline and as the ground-truth part of every
/// retraining set.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDataset {
    features: FeatureTable,
    target: Vec<f64>,
    target_column: String,
}

impl ReferenceDataset {
    /// Assemble from an already-split feature table and target column
    pub fn new(features: FeatureTable, target: Vec<f64>, target_column: &str) -> Result<Self> {
        if features.n_rows() != target.len() {
            return Err(Error::InvalidData(format!(
                "{} feature rows but {} target values",
                features.n_rows(),
                target.len()
            )));
        }
        if let Some(idx) = target.iter().position(|t| !t.is_finite()) {
            return Err(Error::InvalidData(format!(
                "reference target '{target_column}' is missing at row {idx}"
            )));
        }
        Ok(Self { features, target, target_column: target_column.to_string() })
    }

    /// Load a CSV file with a header row
    ///
    /// Every column except `target_column` is a feature.
    pub fn load_csv(path: impl AsRef<Path>, target_column: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InsufficientData(format!(
                "reference dataset not found: {}",
                path.display()
            )));
        }

        let mut reader = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let target_idx = headers.iter().position(|h| h == target_column).ok_or_else(|| {
            Error::InvalidData(format!(
                "reference dataset {} has no target column '{target_column}'",
                path.display()
            ))
        })?;

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_idx)
            .map(|(_, h)| h.clone())
            .collect();

        let mut rows = Vec::new();
        let mut target = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            let mut row = Vec::with_capacity(columns.len());
            for (col_idx, raw) in record.iter().enumerate() {
                let value = parse_cell(raw, &headers[col_idx], row_idx)?;
                if col_idx == target_idx {
                    target.push(value);
                } else {
                    row.push(value);
                }
            }
            rows.push(row);
        }

        let dataset = Self::new(FeatureTable::new(columns, rows)?, target, target_column)?;
        if dataset.is_empty() {
            return Err(Error::InsufficientData(format!(
                "reference dataset {} has no rows",
                path.display()
            )));
        }
        Ok(dataset)
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Feature column names (target excluded)
    pub fn feature_names(&self) -> &[String] {
        self.features.columns()
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_splits_target() {
        let file = write_csv("crim,age,medv\n0.1,65.2,24.0\n0.2,,21.6\n");
        let ds = ReferenceDataset::load_csv(file.path(), "medv").unwrap();

        assert_eq!(ds.feature_names(), &["crim".to_string(), "age".to_string()][..]);
        assert_eq!(ds.target(), &[24.0, 21.6]);
        assert_eq!(ds.len(), 2);
        assert!(ds.features().rows()[1][1].is_nan());
    }

    #[test]
    fn test_load_csv_missing_target_column() {
        let file = write_csv("crim,age\n0.1,65.2\n");
        let err = ReferenceDataset::load_csv(file.path(), "medv").unwrap_err();
        assert!(err.to_string().contains("medv"));
    }

    #[test]
    fn test_load_csv_empty_is_insufficient() {
        let file = write_csv("crim,age,medv\n");
        let err = ReferenceDataset::load_csv(file.path(), "medv").unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = ReferenceDataset::load_csv("/nonexistent/ref.csv", "medv").unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn test_missing_target_value_rejected() {
        let file = write_csv("crim,medv\n0.1,\n");
        let err = ReferenceDataset::load_csv(file.path(), "medv").unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
