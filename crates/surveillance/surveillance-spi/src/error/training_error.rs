//! Training error types

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while fitting or querying a per-disease regression model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainingError {
    /// The category has no historical rows
    #[error("No training rows available")]
    EmptyTrainingSet,

    /// Every target value is identical, nothing to learn
    #[error("Target is constant ({value}) across {rows} rows")]
    ConstantTarget { value: f64, rows: usize },

    /// A feature column contains NaN or infinity
    #[error("Feature '{feature}' has a non-finite value at row {row}")]
    NonFiniteFeature { feature: String, row: usize },

    /// No split on any feature reduces impurity
    #[error("No feature produces an informative split")]
    NoInformativeFeatures,

    /// Row width does not match the fitted feature count
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Feature matrix and target have different lengths
    #[error("Feature matrix has {rows} rows but target has {targets} values")]
    LengthMismatch { rows: usize, targets: usize },

    /// Invalid model hyperparameter
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The week after the last observation is outside the supported calendar
    #[error("No week follows {week} in the supported calendar")]
    WeekOutOfRange { week: NaiveDate },

    /// Model has not been fitted yet
    #[error("Model must be fitted before prediction")]
    NotFitted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_target_message() {
        let error = TrainingError::ConstantTarget {
            value: 0.0,
            rows: 52,
        };
        assert_eq!(error.to_string(), "Target is constant (0) across 52 rows");
    }

    #[test]
    fn test_non_finite_feature_message() {
        let error = TrainingError::NonFiniteFeature {
            feature: "mean_temperature".to_string(),
            row: 7,
        };
        assert_eq!(
            error.to_string(),
            "Feature 'mean_temperature' has a non-finite value at row 7"
        );
    }

    #[test]
    fn test_dimension_mismatch_fields() {
        let error = TrainingError::DimensionMismatch {
            expected: 4,
            actual: 3,
        };
        if let TrainingError::DimensionMismatch { expected, actual } = error {
            assert_eq!(expected, 4);
            assert_eq!(actual, 3);
        } else {
            panic!("Expected DimensionMismatch variant");
        }
    }

    #[test]
    fn test_not_fitted_message() {
        assert_eq!(
            TrainingError::NotFitted.to_string(),
            "Model must be fitted before prediction"
        );
    }

    #[test]
    fn test_week_out_of_range_message() {
        let error = TrainingError::WeekOutOfRange {
            week: NaiveDate::MAX,
        };
        assert!(error.to_string().starts_with("No week follows"));
    }

    #[test]
    fn test_error_can_be_boxed() {
        let boxed: Box<dyn std::error::Error + Send + Sync> =
            Box::new(TrainingError::EmptyTrainingSet);
        assert_eq!(boxed.to_string(), "No training rows available");
    }
}
