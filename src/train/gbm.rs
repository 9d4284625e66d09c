//! Gradient-boosted regression trees

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};
use crate::{Error, Result};

/// Black-box regression capability used by the trainer
pub trait Regressor {
    /// Fit on a dense feature matrix (no missing values) and targets
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    /// Predict one value per row
    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64>;

    /// Hyperparameters, string-encoded for artifacts and tracking
    fn params(&self) -> BTreeMap<String, String>;
}

/// Boosting hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self { n_estimators: 100, learning_rate: 0.1, max_depth: 3, min_samples_split: 2 }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::Config("n_estimators must be at least 1".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::Config(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(Error::Config("min_samples_split must be at least 2".into()));
        }
        Ok(())
    }
}

/// Squared-error gradient boosting: each tree fits the residuals of the
/// ensemble so far, shrunk by the learning rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    params: BoostingParams,
    init: f64,
    trees: Vec<RegressionTree>,
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(BoostingParams::default())
    }
}

impl GradientBoostingRegressor {
    pub fn new(params: BoostingParams) -> Self {
        Self { params, init: 0.0, trees: Vec::new() }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.init
            + self.params.learning_rate
                * self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>()
    }
}

impl Regressor for GradientBoostingRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.params.validate()?;
        if x.is_empty() {
            return Err(Error::TrainingFailure("cannot fit on zero rows".into()));
        }
        if x.len() != y.len() {
            return Err(Error::TrainingFailure(format!(
                "{} feature rows but {} targets",
                x.len(),
                y.len()
            )));
        }
        if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
            return Err(Error::TrainingFailure("training matrix contains non-finite values".into()));
        }

        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
        };
        let indices: Vec<usize> = (0..x.len()).collect();
        self.init = y.iter().sum::<f64>() / y.len() as f64;
        self.trees = Vec::with_capacity(self.params.n_estimators);

        let mut fitted = vec![self.init; y.len()];
        for _ in 0..self.params.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(t, f)| t - f).collect();
            let tree = RegressionTree::fit(x, &residuals, &indices, tree_params);
            for (f, row) in fitted.iter_mut().zip(x) {
                *f += self.params.learning_rate * tree.predict_row(row);
            }
            self.trees.push(tree);
        }
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    fn params(&self) -> BTreeMap<String, String> {
        [
            ("model_type", "GradientBoostingRegressor".to_string()),
            ("n_estimators", self.params.n_estimators.to_string()),
            ("learning_rate", self.params.learning_rate.to_string()),
            ("max_depth", self.params.max_depth.to_string()),
            ("min_samples_split", self.params.min_samples_split.to_string()),
            ("loss", "squared_error".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}
