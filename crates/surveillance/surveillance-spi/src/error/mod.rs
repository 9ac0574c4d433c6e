//! Error module containing error types and result aliases

mod configuration_error;
mod surveillance_error;
mod training_error;

pub use configuration_error::ConfigurationError;
pub use surveillance_error::SurveillanceError;
pub use training_error::TrainingError;

/// Result type for surveillance operations
pub type Result<T> = std::result::Result<T, SurveillanceError>;
