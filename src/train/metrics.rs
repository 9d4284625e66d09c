//! Regression metrics: RMSE, R², MAE

/// Trait for evaluation metrics
pub trait Metric {
    /// Compute the metric given predictions and targets of equal length
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64;

    /// Name of the metric
    fn name(&self) -> &'static str;

    /// Whether higher values are better (true) or lower (false)
    fn higher_is_better(&self) -> bool {
        true
    }
}

/// R² (coefficient of determination) for regression
///
/// R² = 1 - SS_res / SS_tot
///
/// R² = 1.0 is perfect prediction, 0.0 means predicting the mean. Constant
/// targets give 1.0 when predicted exactly and 0.0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct R2Score;

impl Metric for R2Score {
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let ss_tot: f64 = targets.iter().map(|t| (t - mean).powi(2)).sum();
        let ss_res: f64 = predictions.iter().zip(targets).map(|(p, t)| (t - p).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    fn name(&self) -> &'static str {
        "r2"
    }
}

/// Root Mean Squared Error (RMSE) metric
///
/// RMSE = sqrt(mean((y - y_pred)²))
#[derive(Debug, Clone, Copy, Default)]
pub struct RMSE;

impl Metric for RMSE {
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let mse = predictions.iter().zip(targets).map(|(p, t)| (t - p).powi(2)).sum::<f64>()
            / targets.len() as f64;
        mse.sqrt()
    }

    fn name(&self) -> &'static str {
        "rmse"
    }

    fn higher_is_better(&self) -> bool {
        false
    }
}

/// Mean Absolute Error (MAE) metric
#[derive(Debug, Clone, Copy, Default)]
pub struct MAE;

impl Metric for MAE {
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        predictions.iter().zip(targets).map(|(p, t)| (t - p).abs()).sum::<f64>()
            / targets.len() as f64
    }

    fn name(&self) -> &'static str {
        "mae"
    }

    fn higher_is_better(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_r2_perfect() {
        assert_relative_eq!(R2Score.compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 1.0);
    }

    #[test]
    fn test_r2_mean_prediction_is_zero() {
        assert_relative_eq!(R2Score.compute(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_r2_constant_target() {
        assert_eq!(R2Score.compute(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(R2Score.compute(&[4.0, 5.0], &[5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_rmse() {
        assert_relative_eq!(RMSE.compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_relative_eq!(RMSE.compute(&[0.0, 0.0], &[3.0, 4.0]), 12.5f64.sqrt());
        assert!(!RMSE.higher_is_better());
    }

    #[test]
    fn test_mae() {
        assert_relative_eq!(MAE.compute(&[1.0, 2.0, 3.0], &[1.5, 2.5, 3.5]), 0.5);
    }
}
