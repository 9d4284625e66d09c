//! Training-set preparation: synthetic targets, imputation, split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::FeatureTable;
use crate::{Error, Result};

/// Targets for unlabeled window rows, sampled with replacement from the
/// reference targets
///
/// This is an approximation: the window has no ground truth, so the model only
/// learns the new feature distribution against the old target distribution.
pub fn synthetic_targets(reference_targets: &[f64], n: usize, seed: u64) -> Result<Vec<f64>> {
    if reference_targets.is_empty() {
        return Err(Error::TrainingFailure("reference dataset has no targets to sample".into()));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..n)
        .map(|_| reference_targets[rng.random_range(0..reference_targets.len())])
        .collect())
}

/// Per-column mean imputation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanImputer {
    columns: Vec<String>,
    means: Vec<f64>,
}

impl MeanImputer {
    /// Learn column means over the finite cells of `table`
    ///
    /// A column without a single finite value cannot be imputed.
    pub fn fit(table: &FeatureTable) -> Result<Self> {
        let mut sums = vec![0.0; table.n_columns()];
        let mut counts = vec![0usize; table.n_columns()];
        for row in table.rows() {
            for (j, v) in row.iter().enumerate() {
                if v.is_finite() {
                    sums[j] += v;
                    counts[j] += 1;
                }
            }
        }

        let mut means = Vec::with_capacity(sums.len());
        for (j, (sum, count)) in sums.iter().zip(&counts).enumerate() {
            if *count == 0 {
                return Err(Error::TrainingFailure(format!(
                    "column '{}' has no values to impute from",
                    table.columns()[j]
                )));
            }
            means.push(sum / *count as f64);
        }
        Ok(Self { columns: table.columns().to_vec(), means })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Replace every non-finite cell of a row with its column mean
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.means)
            .map(|(v, mean)| if v.is_finite() { *v } else { *mean })
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

/// Shuffled train/validation index split
///
/// The validation side gets `ceil(n * test_fraction)` rows, at least one and
/// never all of them.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if n < 2 {
        return Err(Error::TrainingFailure(format!("need at least 2 rows to split, got {n}")));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(Error::Config(format!("test_fraction must be in (0, 1), got {test_fraction}")));
    }
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);
    let train = indices.split_off(n_test);
    Ok((train, indices))
}
