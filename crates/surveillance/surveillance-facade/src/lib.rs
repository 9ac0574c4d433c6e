//! Surveillance Facade
//!
//! High-level API for synthetic clinic surveillance. Re-exports all public
//! types from the surveillance stack for convenient usage.

// Re-export everything from API (which includes SPI)
pub use surveillance_api::*;

// Explicit re-exports for documentation
pub use surveillance_api::prelude;

// Re-export core modules for direct access
pub use surveillance_core::{
    cache, calendar, engine, features, forest, metrics, pipeline, registry, report, seasonal,
    simulator,
};

// Re-export core types at root
pub use surveillance_core::{
    ClinicRegistry, ForecastEngine, ForecastReport, RandomForestRegressor, RiskSummary,
    SeasonalClimateModel, SimulationCache, SimulationKey, SimulationRun, Simulator,
    SurveillancePipeline, SurveillanceRun,
};
