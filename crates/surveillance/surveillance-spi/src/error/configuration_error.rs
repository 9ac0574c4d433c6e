//! Configuration error types

use thiserror::Error;

/// Invalid generation or training parameters, surfaced before any work starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The simulation horizon has no weeks
    #[error("Horizon must contain at least one week")]
    ZeroHorizon,

    /// The clinic registry has no clinics
    #[error("Clinic registry is empty")]
    EmptyRegistry,

    /// No disease category was selected
    #[error("At least one disease category is required")]
    NoDiseases,

    /// Two clinics share the same name
    #[error("Duplicate clinic '{0}'")]
    DuplicateClinic(String),

    /// A disease name did not match any known category
    #[error("Unknown disease category '{0}'")]
    UnknownDisease(String),

    /// A selected disease has no profile in the profile table
    #[error("No profile configured for disease '{0}'")]
    MissingProfile(String),

    /// A bounded range has min > max or non-finite bounds
    #[error("Invalid range '{name}': [{min}, {max}]")]
    InvalidRange { name: String, min: f64, max: f64 },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl ConfigurationError {
    /// Shorthand for [`ConfigurationError::InvalidParameter`]
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
