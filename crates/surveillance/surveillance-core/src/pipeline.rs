//! End-to-end batch run: registry, simulation, forecasting

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use surveillance_api::SurveillanceConfig;
use surveillance_spi::{ConfigurationError, HistoricalTable};
use tracing::{info, warn};

use crate::cache::SimulationCache;
use crate::engine::ForecastEngine;
use crate::registry::ClinicRegistry;
use crate::report::ForecastReport;
use crate::simulator::Simulator;

/// Registry and history produced by the simulation phase
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub registry: ClinicRegistry,
    pub historical: Arc<HistoricalTable>,
    /// Seed left for the forecasting phase
    forecast_seed: u64,
}

/// Everything one surveillance run produces
#[derive(Debug, Clone)]
pub struct SurveillanceRun {
    pub registry: ClinicRegistry,
    pub historical: Arc<HistoricalTable>,
    pub report: ForecastReport,
}

/// Headline figures of a forecast, as shown above the forecast tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub monitored_clinics: usize,
    pub highest_risk_disease: Option<String>,
    pub highest_risk_clinic: Option<String>,
    pub highest_risk_cases: Option<u32>,
    pub disease_totals: Vec<(String, u64)>,
}

impl SurveillanceRun {
    pub fn summary(&self) -> RiskSummary {
        let top = self.report.highest_risk_clinic();
        RiskSummary {
            monitored_clinics: self.report.monitored_clinics(),
            highest_risk_disease: self.report.highest_risk_disease().map(|d| d.to_string()),
            highest_risk_clinic: top.map(|r| format!("{} ({})", r.clinic, r.disease)),
            highest_risk_cases: top.map(|r| r.predicted_case_count),
            disease_totals: self
                .report
                .disease_totals()
                .into_iter()
                .map(|(d, total)| (d.to_string(), total))
                .collect(),
        }
    }
}

/// Drives Registry → Simulator → Engine from a single seed
///
/// The pipeline owns a `SimulationCache`, so repeated runs with the same
/// configuration reuse the generated history.
#[derive(Debug, Default)]
pub struct SurveillancePipeline {
    cache: SimulationCache,
}

impl SurveillancePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &SimulationCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut SimulationCache {
        &mut self.cache
    }

    /// Build the registry and simulate the history
    pub fn simulate(
        &mut self,
        config: &SurveillanceConfig,
    ) -> Result<SimulationRun, ConfigurationError> {
        config.validate()?;
        if !config.perturbation_exceeds_simulation_noise() {
            warn!(
                temperature = config.forecast.temperature_perturbation_std,
                precipitation = config.forecast.precipitation_perturbation_std,
                "forecast perturbation is not wider than the simulator's weekly noise"
            );
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let registry = ClinicRegistry::from_config(&config.registry, &mut rng)?;
        let simulation_seed: u64 = rng.gen();
        let forecast_seed: u64 = rng.gen();

        let simulator = Simulator::from_config(config)?;
        let historical = self
            .cache
            .get_or_generate(&simulator, &registry, simulation_seed)?;

        Ok(SimulationRun {
            registry,
            historical,
            forecast_seed,
        })
    }

    /// Full run; training failures are reported per category in the report
    pub fn run(
        &mut self,
        config: &SurveillanceConfig,
    ) -> Result<SurveillanceRun, ConfigurationError> {
        info!(
            seed = config.seed,
            diseases = config.diseases.len(),
            "starting surveillance run"
        );

        let SimulationRun {
            registry,
            historical,
            forecast_seed,
        } = self.simulate(config)?;

        let engine = ForecastEngine::from_config(config)?;
        let mut rng = StdRng::seed_from_u64(forecast_seed);
        let report = engine.forecast_diseases(&historical, &config.diseases, &mut rng);

        info!(
            rows = historical.len(),
            forecasts = report.forecasts().len(),
            failed = report.failures().len(),
            "surveillance run complete"
        );

        Ok(SurveillanceRun {
            registry,
            historical,
            report,
        })
    }
}
