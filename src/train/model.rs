//! Serialized model payload

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::gbm::{GradientBoostingRegressor, Regressor};
use super::prep::MeanImputer;
use crate::data::{check_schema, FeatureTable};
use crate::storage::ModelArtifact;
use crate::{Error, Result};

/// What the serving layer needs to reproduce a prediction: column order,
/// the imputation means learned at fit time, and the fitted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    feature_names: Vec<String>,
    imputer: MeanImputer,
    regressor: GradientBoostingRegressor,
}

impl TrainedModel {
    pub(crate) fn new(imputer: MeanImputer, regressor: GradientBoostingRegressor) -> Self {
        Self { feature_names: imputer.columns().to_vec(), imputer, regressor }
    }

    /// Decode the payload of a stored artifact
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self> {
        Self::from_payload(&artifact.payload)
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }

    pub fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn imputer(&self) -> &MeanImputer {
        &self.imputer
    }

    /// Predict every row of `table`; column order does not matter
    pub fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>> {
        check_schema(&self.feature_names, table.columns())?;
        let aligned = table.select(&self.feature_names)?;
        Ok(self.regressor.predict(&self.imputer.transform(aligned.rows())))
    }

    /// Predict a single named feature vector; absent or NaN values are imputed
    pub fn predict_one(&self, features: &BTreeMap<String, f64>) -> Result<f64> {
        let unexpected: Vec<String> =
            features.keys().filter(|k| !self.feature_names.contains(k)).cloned().collect();
        if !unexpected.is_empty() {
            return Err(Error::SchemaMismatch { missing: Vec::new(), unexpected });
        }
        let row: Vec<f64> = self
            .feature_names
            .iter()
            .map(|name| features.get(name).copied().unwrap_or(f64::NAN))
            .collect();
        Ok(self.regressor.predict(&[self.imputer.transform_row(&row)])[0])
    }
}
