//! Window of served feature vectors

use chrono::{DateTime, Utc};

use super::reference::ReferenceDataset;
use super::schema::{check_schema, RESERVED_LOG_COLUMNS};
use super::table::FeatureTable;
use crate::storage::prediction_log::PredictionRecord;
use crate::{Error, Result};

/// Rectangular table of the features of a window of prediction records
///
/// Derived from the log at read time and never persisted on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSnapshot {
    features: FeatureTable,
    predictions: Vec<f64>,
    timestamps: Vec<DateTime<Utc>>,
}

impl FeatureSnapshot {
    /// Build from records; all records must share the same feature names
    pub fn from_records(records: &[PredictionRecord]) -> Result<Self> {
        let Some(first) = records.first() else {
            return Ok(Self {
                features: FeatureTable::empty(Vec::new()),
                predictions: Vec::new(),
                timestamps: Vec::new(),
            });
        };

        let columns: Vec<String> = first.features.keys().cloned().collect();
        let mut rows = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if record.features.len() != columns.len()
                || !columns.iter().all(|c| record.features.contains_key(c))
            {
                return Err(Error::InvalidData(format!(
                    "prediction record {idx} has a different feature set than record 0"
                )));
            }
            rows.push(columns.iter().map(|c| record.features[c]).collect());
        }

        Ok(Self {
            features: FeatureTable::new(columns, rows)?,
            predictions: records.iter().map(|r| r.prediction).collect(),
            timestamps: records.iter().map(|r| r.timestamp).collect(),
        })
    }

    /// Wrap a bare feature table (no served predictions attached)
    pub fn from_table(features: FeatureTable) -> Self {
        Self { features, predictions: Vec::new(), timestamps: Vec::new() }
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    /// Served predictions, empty when built from a bare table
    pub fn predictions(&self) -> &[f64] {
        &self.predictions
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.features.n_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Strip non-feature columns and align to the reference column order
    ///
    /// Log bookkeeping columns and the reference target column are removed
    /// before the schema guard runs; any remaining difference is a
    /// [`Error::SchemaMismatch`].
    pub fn aligned_to(&self, reference: &ReferenceDataset) -> Result<FeatureTable> {
        let mut strip: Vec<&str> = RESERVED_LOG_COLUMNS.to_vec();
        strip.push(reference.target_column());
        let stripped = self.features.without(&strip);

        check_schema(reference.feature_names(), stripped.columns())?;
        stripped.select(reference.feature_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureTable;
    use std::collections::BTreeMap;

    fn record(pairs: &[(&str, f64)], prediction: f64) -> PredictionRecord {
        let features: BTreeMap<String, f64> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect();
        PredictionRecord::new(features, prediction)
    }

    fn reference() -> ReferenceDataset {
        let table = FeatureTable::new(
            vec!["rm".to_string(), "age".to_string()],
            vec![vec![6.0, 50.0], vec![7.0, 60.0]],
        )
        .unwrap();
        ReferenceDataset::new(table, vec![20.0, 25.0], "medv").unwrap()
    }

    #[test]
    fn test_from_records() {
        let snap =
            FeatureSnapshot::from_records(&[record(&[("age", 1.0), ("rm", 2.0)], 10.0)]).unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.predictions(), &[10.0]);
        assert_eq!(snap.features().columns(), &["age".to_string(), "rm".to_string()][..]);
    }

    #[test]
    fn test_from_records_rejects_ragged_feature_sets() {
        let err = FeatureSnapshot::from_records(&[
            record(&[("age", 1.0), ("rm", 2.0)], 10.0),
            record(&[("age", 1.0)], 10.0),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_aligned_to_reorders_and_strips_target() {
        let snap = FeatureSnapshot::from_records(&[record(
            &[("age", 1.0), ("medv", 99.0), ("rm", 2.0)],
            10.0,
        )])
        .unwrap();
        let aligned = snap.aligned_to(&reference()).unwrap();
        assert_eq!(aligned.columns(), &["rm".to_string(), "age".to_string()][..]);
        assert_eq!(aligned.rows()[0], vec![2.0, 1.0]);
    }

    #[test]
    fn test_aligned_to_missing_feature() {
        let snap = FeatureSnapshot::from_records(&[record(&[("rm", 2.0)], 10.0)]).unwrap();
        assert!(matches!(snap.aligned_to(&reference()), Err(Error::SchemaMismatch { .. })));
    }
}
