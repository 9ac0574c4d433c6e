//! Surveillance Consumer API
//!
//! Configuration types for the clinic registry, the weekly case simulator
//! and the forecasting engine.
//!
//! This crate provides:
//! - Serde-friendly configuration structs with defaults and validation
//! - `with_*` builder methods for programmatic construction
//! - Re-exports from the SPI for convenience

pub mod forecast;
pub mod simulation;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use forecast::{ForecastConfig, ForestConfig};
pub use simulation::{CaseCoefficients, SimulationConfig, ValueRange, MAX_HORIZON_WEEKS};

// Re-export from SPI
pub use surveillance_spi::{
    CaseModel, CategoryForecast, CategoryOutcome, ClimateResponse, Clinic, ClinicSite,
    ConfigurationError, DiseaseCategory, DiseaseProfile, Feature, FeatureImportance,
    FeatureImportanceEntry, FeatureValues, ForecastRecord, HistoricalTable, Regressor, Result,
    SeasonWindow, SurveillanceError, TrainingDiagnostics, TrainingError, WeekContext,
    WeeklyObservation,
};

/// Configuration for clinic registry construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Uniform range each clinic's risk factor is drawn from
    pub risk_factor_range: ValueRange,
    /// Clinic sites; `None` uses the built-in planning-area list
    pub sites: Option<Vec<ClinicSite>>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            risk_factor_range: ValueRange::new(1.0, 1.8),
            sites: None,
        }
    }
}

impl RegistryConfig {
    pub fn with_sites(mut self, sites: Vec<ClinicSite>) -> Self {
        self.sites = Some(sites);
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        self.risk_factor_range.validate("risk_factor_range")?;
        if self.risk_factor_range.min <= 0.0 {
            return Err(ConfigurationError::invalid(
                "risk_factor_range",
                "risk factors must be positive",
            ));
        }
        if matches!(&self.sites, Some(sites) if sites.is_empty()) {
            return Err(ConfigurationError::EmptyRegistry);
        }
        Ok(())
    }
}

/// Top-level configuration of a surveillance run
///
/// A single `seed` drives every random draw of the run, so two runs with
/// equal configuration produce identical tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveillanceConfig {
    pub seed: u64,
    /// Diseases to simulate and forecast
    pub diseases: Vec<DiseaseCategory>,
    /// Per-disease strategy table
    pub profiles: BTreeMap<DiseaseCategory, DiseaseProfile>,
    pub registry: RegistryConfig,
    pub simulation: SimulationConfig,
    pub forecast: ForecastConfig,
}

impl Default for SurveillanceConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            diseases: DiseaseCategory::ALL.to_vec(),
            profiles: DiseaseCategory::ALL
                .iter()
                .map(|d| (*d, d.default_profile()))
                .collect(),
            registry: RegistryConfig::default(),
            simulation: SimulationConfig::default(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl SurveillanceConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_diseases(mut self, diseases: Vec<DiseaseCategory>) -> Self {
        self.diseases = diseases;
        self
    }

    /// Select diseases by name, failing on names outside the known set
    pub fn with_disease_names<S: AsRef<str>>(
        self,
        names: &[S],
    ) -> std::result::Result<Self, ConfigurationError> {
        let diseases = names
            .iter()
            .map(|n| n.as_ref().parse())
            .collect::<std::result::Result<Vec<DiseaseCategory>, _>>()?;
        Ok(self.with_diseases(diseases))
    }

    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn with_forecast(mut self, forecast: ForecastConfig) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn with_profile(mut self, disease: DiseaseCategory, profile: DiseaseProfile) -> Self {
        self.profiles.insert(disease, profile);
        self
    }

    /// Profile of a selected disease
    pub fn profile(
        &self,
        disease: DiseaseCategory,
    ) -> std::result::Result<&DiseaseProfile, ConfigurationError> {
        self.profiles
            .get(&disease)
            .ok_or_else(|| ConfigurationError::MissingProfile(disease.to_string()))
    }

    /// Whether forecast perturbation is wider than the simulator's weekly noise
    pub fn perturbation_exceeds_simulation_noise(&self) -> bool {
        self.forecast.temperature_perturbation_std > self.simulation.temperature_noise_std
            && self.forecast.precipitation_perturbation_std
                > self.simulation.precipitation_noise_std
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.diseases.is_empty() {
            return Err(ConfigurationError::NoDiseases);
        }
        for disease in &self.diseases {
            self.profile(*disease)?.validate(*disease)?;
        }
        self.registry.validate()?;
        self.simulation.validate()?;
        self.forecast.validate()
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CaseCoefficients, ForecastConfig, ForestConfig, RegistryConfig, SimulationConfig,
        SurveillanceConfig, ValueRange,
    };
    pub use surveillance_spi::{
        CategoryOutcome, Clinic, ClinicSite, ConfigurationError, DiseaseCategory, Feature,
        FeatureImportance, ForecastRecord, HistoricalTable, SurveillanceError, TrainingError,
        WeeklyObservation,
    };
}
