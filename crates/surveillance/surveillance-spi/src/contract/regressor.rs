//! Trait for tabular regression models

use crate::error::TrainingError;

/// Common trait for the per-disease regression models
///
/// Follows a fit-predict pattern over a dense feature matrix: each row
/// of `features` is one observation, columns are in a fixed order chosen
/// by the caller.
///
/// # Example
///
/// ```rust,ignore
/// use surveillance_spi::Regressor;
///
/// fn fit_and_score<R: Regressor>(model: &mut R, x: &[Vec<f64>], y: &[f64], query: &[f64]) -> f64 {
///     model.fit(x, y).unwrap();
///     model.predict_one(query).unwrap()
/// }
/// ```
pub trait Regressor: Send + Sync {
    /// Fit the model to a feature matrix and its target column
    fn fit(&mut self, features: &[Vec<f64>], target: &[f64]) -> Result<(), TrainingError>;

    /// Predict the target for a single feature row
    fn predict_one(&self, row: &[f64]) -> Result<f64, TrainingError>;

    /// Predict the target for many rows
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, TrainingError> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Per-column importances, normalized to sum to one
    fn feature_importances(&self) -> Result<Vec<f64>, TrainingError>;

    /// Check if the model has been fitted
    fn is_fitted(&self) -> bool;
}
