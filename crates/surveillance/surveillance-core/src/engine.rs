//! Per-disease forecasting engine
//!
//! For every disease category the engine trains one random forest on the
//! full history of that category, synthesizes a next-week feature row per
//! clinic from its last observation and predicts the case count.
//!
//! ## Determinism
//!
//! One sub-seed per category is drawn from the caller's generator, in
//! category order, before any category is trained. Each category then
//! perturbs its weather from its own `StdRng`, so category-level parallelism
//! does not change the output.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use surveillance_api::{ForecastConfig, SurveillanceConfig};
use surveillance_spi::{
    CategoryForecast, CategoryOutcome, ConfigurationError, DiseaseCategory, DiseaseProfile,
    FeatureImportance, FeatureValues, ForecastRecord, HistoricalTable, Regressor,
    TrainingError, WeeklyObservation,
};
use tracing::{debug, info, warn};

use crate::calendar::next_week;
use crate::features::{query_row, TrainingSet};
use crate::forest::RandomForestRegressor;
use crate::metrics;
use crate::report::ForecastReport;

/// Trains per-disease models and forecasts the week after the history
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: ForecastConfig,
    profiles: BTreeMap<DiseaseCategory, DiseaseProfile>,
}

impl ForecastEngine {
    pub fn new(
        config: ForecastConfig,
        profiles: BTreeMap<DiseaseCategory, DiseaseProfile>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        for (disease, profile) in &profiles {
            profile.validate(*disease)?;
        }
        Ok(Self { config, profiles })
    }

    pub fn from_config(config: &SurveillanceConfig) -> Result<Self, ConfigurationError> {
        Self::new(config.forecast.clone(), config.profiles.clone())
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Configured profile, or the built-in one for categories left out
    pub fn profile(&self, disease: DiseaseCategory) -> DiseaseProfile {
        self.profiles
            .get(&disease)
            .cloned()
            .unwrap_or_else(|| disease.default_profile())
    }

    /// Forecast every category present in the history
    pub fn forecast<R: Rng + ?Sized>(
        &self,
        table: &HistoricalTable,
        rng: &mut R,
    ) -> ForecastReport {
        self.forecast_diseases(table, &table.diseases(), rng)
    }

    /// Forecast the requested categories
    ///
    /// Categories without history are reported as failed outcomes.
    pub fn forecast_diseases<R: Rng + ?Sized>(
        &self,
        table: &HistoricalTable,
        diseases: &[DiseaseCategory],
        rng: &mut R,
    ) -> ForecastReport {
        let mut diseases = diseases.to_vec();
        diseases.sort();
        diseases.dedup();

        let seeded: Vec<(DiseaseCategory, u64)> =
            diseases.iter().map(|d| (*d, rng.gen::<u64>())).collect();

        info!(
            categories = seeded.len(),
            rows = table.len(),
            trees = self.config.forest.n_trees,
            "training per-disease forecasters"
        );

        let outcomes: Vec<CategoryOutcome> = if self.config.parallel {
            seeded
                .par_iter()
                .map(|(disease, seed)| self.forecast_category(table, *disease, *seed))
                .collect()
        } else {
            seeded
                .iter()
                .map(|(disease, seed)| self.forecast_category(table, *disease, *seed))
                .collect()
        };

        for outcome in &outcomes {
            if let Some(error) = outcome.error() {
                warn!(disease = %outcome.disease, %error, "category forecast failed");
            }
        }

        ForecastReport::new(outcomes)
    }

    /// Train and forecast one category with its own perturbation seed
    pub fn forecast_category(
        &self,
        table: &HistoricalTable,
        disease: DiseaseCategory,
        seed: u64,
    ) -> CategoryOutcome {
        CategoryOutcome {
            disease,
            result: self.run_category(table, disease, seed),
        }
    }

    /// Fit the category's forest on its full history
    pub fn train(
        &self,
        table: &HistoricalTable,
        disease: DiseaseCategory,
    ) -> Result<(RandomForestRegressor, TrainingSet), TrainingError> {
        let profile = self.profile(disease);
        let set = TrainingSet::from_table(table, disease, &profile.features)?;

        let mut forest = RandomForestRegressor::new(self.config.forest.clone())?;
        forest.fit(&set.rows, &set.target)?;
        Ok((forest, set))
    }

    fn run_category(
        &self,
        table: &HistoricalTable,
        disease: DiseaseCategory,
        seed: u64,
    ) -> Result<CategoryForecast, TrainingError> {
        let (forest, set) = self.train(table, disease)?;

        let raw = forest.feature_importances()?;
        let importance = FeatureImportance::ranked(disease, &set.features, &raw)
            .ok_or(TrainingError::NoInformativeFeatures)?;

        let fitted = forest.predict(&set.rows)?;
        let diagnostics = metrics::diagnostics(&set.target, &fitted);
        debug!(
            %disease,
            rows = diagnostics.rows,
            mae = diagnostics.mae,
            r_squared = diagnostics.r_squared,
            "in-sample fit"
        );

        let synthesizer = NextWeekSynthesizer::new(&self.config)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let forecasts = table
            .latest_by_clinic(disease)
            .into_iter()
            .map(|last| {
                let inputs = synthesizer.next_inputs(last, &mut rng);
                let row = query_row(&inputs, &set.features)?;
                let predicted = forest.predict_one(&row)?;
                forecast_record(last, inputs, predicted)
            })
            .collect::<Result<Vec<_>, TrainingError>>()?;

        debug!(%disease, forecasts = forecasts.len(), "category forecast complete");
        Ok(CategoryForecast {
            forecasts,
            importance,
            diagnostics,
        })
    }
}

/// Next-week weather perturbation around a clinic's last observation
struct NextWeekSynthesizer {
    temperature: Normal<f64>,
    precipitation: Normal<f64>,
}

impl NextWeekSynthesizer {
    fn new(config: &ForecastConfig) -> Result<Self, TrainingError> {
        let normal = |name: &str, std_dev: f64| {
            Normal::new(0.0, std_dev).map_err(|e| TrainingError::InvalidParameter {
                name: name.to_string(),
                reason: e.to_string(),
            })
        };
        Ok(Self {
            temperature: normal(
                "temperature_perturbation_std",
                config.temperature_perturbation_std,
            )?,
            precipitation: normal(
                "precipitation_perturbation_std",
                config.precipitation_perturbation_std,
            )?,
        })
    }

    /// Perturbed weather, unchanged density, last count as the lag feature
    ///
    /// Negative precipitation is clamped to zero.
    fn next_inputs<R: Rng + ?Sized>(
        &self,
        last: &WeeklyObservation,
        rng: &mut R,
    ) -> FeatureValues {
        FeatureValues {
            mean_temperature: last.mean_temperature + self.temperature.sample(rng),
            precipitation: (last.precipitation + self.precipitation.sample(rng)).max(0.0),
            population_density: last.population_density,
            previous_week_case_count: last.case_count,
        }
    }
}

/// Negative or non-finite predictions become zero
fn forecast_record(
    last: &WeeklyObservation,
    inputs: FeatureValues,
    predicted: f64,
) -> Result<ForecastRecord, TrainingError> {
    let week =
        next_week(last.week).ok_or(TrainingError::WeekOutOfRange { week: last.week })?;
    let predicted_case_count = if predicted.is_finite() && predicted > 0.0 {
        predicted.trunc() as u32
    } else {
        0
    };

    Ok(ForecastRecord {
        clinic: last.clinic.clone(),
        disease: last.disease,
        week,
        latitude: last.latitude,
        longitude: last.longitude,
        mean_temperature: inputs.mean_temperature,
        precipitation: inputs.precipitation,
        population_density: inputs.population_density,
        previous_week_case_count: inputs.previous_week_case_count,
        predicted_case_count,
    })
}
