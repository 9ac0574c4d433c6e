//! Umbrella error for the surveillance stack

use thiserror::Error;

use super::{ConfigurationError, TrainingError};
use crate::model::DiseaseCategory;

/// Errors that can occur anywhere between registry construction and forecasting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurveillanceError {
    /// Invalid configuration, detected before generation starts
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Training failed for one disease category
    #[error("Training failed for {disease}: {source}")]
    Training {
        disease: DiseaseCategory,
        #[source]
        source: TrainingError,
    },
}

impl SurveillanceError {
    /// Attach a disease category to a training failure
    pub fn training(disease: DiseaseCategory, source: TrainingError) -> Self {
        SurveillanceError::Training { disease, source }
    }
}
