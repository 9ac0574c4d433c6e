//! Surveillance Core
//!
//! Core implementations: clinic registry, weekly case simulator with
//! seasonal and climate forcing, simulation cache, random-forest
//! forecasting engine and the end-to-end pipeline.

pub mod cache;
pub mod calendar;
pub mod engine;
pub mod features;
pub mod forest;
pub mod metrics;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod seasonal;
pub mod simulator;

// Re-export SPI traits for implementations
pub use surveillance_spi::{
    CaseModel, ConfigurationError, Regressor, Result, SurveillanceError, TrainingError,
};

// Re-export main types
pub use cache::{SimulationCache, SimulationKey};
pub use engine::ForecastEngine;
pub use forest::RandomForestRegressor;
pub use pipeline::{RiskSummary, SimulationRun, SurveillancePipeline, SurveillanceRun};
pub use registry::ClinicRegistry;
pub use report::ForecastReport;
pub use seasonal::SeasonalClimateModel;
pub use simulator::Simulator;
