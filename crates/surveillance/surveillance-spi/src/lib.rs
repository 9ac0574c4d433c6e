//! Surveillance Service Provider Interface
//!
//! Defines the data model, error types and extension traits shared by the
//! clinic registry, the weekly case simulator and the forecasting engine.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{CaseModel, Regressor, WeekContext};
pub use error::{ConfigurationError, Result, SurveillanceError, TrainingError};
pub use model::{
    CategoryForecast, CategoryOutcome, ClimateResponse, Clinic, ClinicSite, DiseaseCategory,
    DiseaseProfile, Feature, FeatureImportance, FeatureImportanceEntry, FeatureValues,
    ForecastRecord, HistoricalTable, SeasonWindow, TrainingDiagnostics, WeeklyObservation,
};
