//! Weekly case time-series simulator
//!
//! Produces the historical table for every (clinic, disease) pair over a
//! fixed horizon of Sunday-anchored weeks.
//!
//! ## Per-series algorithm
//!
//! 1. Draw a population density from the configured range and scale it by
//!    the clinic's risk factor; derive the base weekly case volume.
//! 2. Draw per-series temperature and precipitation baselines.
//! 3. For each week: perturb the climate baselines, evaluate the case model
//!    (seasonal × climate × (base + autocorrelation)), add observation
//!    noise and clamp to a non-negative integer.
//!
//! Negative precipitation and negative case counts are clamped to zero
//! without being reported.

use std::hash::{Hash, Hasher};

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use surveillance_api::{SimulationConfig, SurveillanceConfig};
use surveillance_spi::{
    CaseModel, Clinic, ConfigurationError, DiseaseCategory, DiseaseProfile, HistoricalTable,
    WeekContext, WeeklyObservation,
};
use tracing::{info, trace, warn};

use crate::calendar::weekly_dates;
use crate::registry::ClinicRegistry;
use crate::seasonal::SeasonalClimateModel;

/// Generator of the historical weekly observation table
pub struct Simulator {
    config: SimulationConfig,
    profiles: Vec<(DiseaseCategory, DiseaseProfile)>,
    model: Box<dyn CaseModel>,
    weeks: Vec<NaiveDate>,
    temperature_noise: Normal<f64>,
    precipitation_noise: Normal<f64>,
    observation_noise: Normal<f64>,
}

impl Simulator {
    /// Create a simulator for the given diseases, validating every parameter
    pub fn new(
        config: SimulationConfig,
        profiles: Vec<(DiseaseCategory, DiseaseProfile)>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        if profiles.is_empty() {
            return Err(ConfigurationError::NoDiseases);
        }
        for (disease, profile) in &profiles {
            profile.validate(*disease)?;
        }

        let temperature_noise = normal("temperature_noise_std", config.temperature_noise_std)?;
        let precipitation_noise =
            normal("precipitation_noise_std", config.precipitation_noise_std)?;
        let observation_noise = normal("observation_noise_std", config.observation_noise_std)?;
        let weeks = weekly_dates(config.start_date, config.horizon_weeks).ok_or_else(|| {
            ConfigurationError::invalid("start_date", "week calendar runs past the last date")
        })?;
        let model = Box::new(SeasonalClimateModel::new(config.coefficients.clone()));

        Ok(Self {
            config,
            profiles,
            model,
            weeks,
            temperature_noise,
            precipitation_noise,
            observation_noise,
        })
    }

    /// Create a simulator for the diseases selected in a run configuration
    pub fn from_config(config: &SurveillanceConfig) -> Result<Self, ConfigurationError> {
        if config.diseases.is_empty() {
            return Err(ConfigurationError::NoDiseases);
        }
        let mut diseases = config.diseases.clone();
        diseases.sort();
        diseases.dedup();

        let profiles = diseases
            .into_iter()
            .map(|d| config.profile(d).map(|p| (d, p.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(config.simulation.clone(), profiles)
    }

    /// Replace the expected-case formula
    pub fn with_case_model(mut self, model: impl CaseModel + 'static) -> Self {
        self.model = Box::new(model);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Week dates of every series
    pub fn weeks(&self) -> &[NaiveDate] {
        &self.weeks
    }

    pub fn diseases(&self) -> Vec<DiseaseCategory> {
        self.profiles.iter().map(|(d, _)| *d).collect()
    }

    pub fn profile(&self, disease: DiseaseCategory) -> Option<&DiseaseProfile> {
        self.profiles
            .iter()
            .find(|(d, _)| *d == disease)
            .map(|(_, p)| p)
    }

    /// Generate the full table: clinics in registry order, diseases in
    /// canonical order, weeks in calendar order
    pub fn generate<R: Rng + ?Sized>(
        &self,
        registry: &ClinicRegistry,
        rng: &mut R,
    ) -> Result<HistoricalTable, ConfigurationError> {
        if registry.is_empty() {
            return Err(ConfigurationError::EmptyRegistry);
        }

        info!(
            clinics = registry.len(),
            diseases = self.profiles.len(),
            weeks = self.weeks.len(),
            model = self.model.name(),
            "simulating weekly case series"
        );

        let mut rows =
            Vec::with_capacity(registry.len() * self.profiles.len() * self.weeks.len());
        for clinic in registry {
            for (disease, profile) in &self.profiles {
                self.append_series(clinic, *disease, profile, rng, &mut rows);
            }
        }

        info!(rows = rows.len(), "simulation complete");
        let table = HistoricalTable::from_rows(rows);
        self.check_seasons(&table);
        Ok(table)
    }

    /// Generate one (clinic, disease) series
    pub fn simulate_series<R: Rng + ?Sized>(
        &self,
        clinic: &Clinic,
        disease: DiseaseCategory,
        rng: &mut R,
    ) -> Result<Vec<WeeklyObservation>, ConfigurationError> {
        let profile = self
            .profile(disease)
            .ok_or_else(|| ConfigurationError::MissingProfile(disease.to_string()))?;

        let mut rows = Vec::with_capacity(self.weeks.len());
        self.append_series(clinic, disease, profile, rng, &mut rows);
        Ok(rows)
    }

    fn append_series<R: Rng + ?Sized>(
        &self,
        clinic: &Clinic,
        disease: DiseaseCategory,
        profile: &DiseaseProfile,
        rng: &mut R,
        rows: &mut Vec<WeeklyObservation>,
    ) {
        let risk = clinic.risk_factor();
        let density = uniform(rng, self.config.density_range.min, self.config.density_range.max)
            * risk;
        let base_volume =
            density * self.config.density_case_rate * risk * profile.volume_multiplier;

        let temperature_baseline = uniform(
            rng,
            self.config.temperature_baseline.min,
            self.config.temperature_baseline.max,
        );
        let precipitation_baseline = uniform(
            rng,
            self.config.precipitation_baseline.min,
            self.config.precipitation_baseline.max,
        );

        trace!(
            clinic = clinic.name(),
            %disease,
            density,
            base_volume,
            "series parameters"
        );

        let mut previous_cases = 0u32;
        for week in &self.weeks {
            let mean_temperature = temperature_baseline + self.temperature_noise.sample(rng);
            let precipitation =
                (precipitation_baseline + self.precipitation_noise.sample(rng)).max(0.0);

            let context = WeekContext {
                profile,
                base_volume,
                previous_cases,
                day_of_year: week.ordinal(),
                mean_temperature,
                precipitation,
            };
            let raw = self.model.expected_cases(&context) + self.observation_noise.sample(rng);
            let case_count = clamp_cases(raw);

            rows.push(WeeklyObservation {
                week: *week,
                clinic: clinic.name().to_string(),
                disease,
                case_count,
                mean_temperature,
                precipitation,
                population_density: density as u32,
                previous_week_case_count: previous_cases,
                latitude: clinic.latitude(),
                longitude: clinic.longitude(),
            });
            previous_cases = case_count;
        }
    }

    /// Feed every generation parameter into a hasher
    /// Warn for every disease whose summed peak week leaves its season window
    ///
    /// Returns the diseases that peaked out of season.
    pub fn check_seasons(&self, table: &HistoricalTable) -> Vec<DiseaseCategory> {
        let mut off_season = Vec::new();
        for (disease, profile) in &self.profiles {
            let Some(week) = table.peak_week(*disease) else {
                continue;
            };
            if !profile.season.contains(week.ordinal()) {
                warn!(
                    %disease,
                    %week,
                    start_day = profile.season.start_day,
                    end_day = profile.season.end_day,
                    "simulated peak falls outside the season window"
                );
                off_season.push(*disease);
            }
        }
        off_season
    }

    pub(crate) fn hash_parameters<H: Hasher>(&self, state: &mut H) {
        let c = &self.config;
        c.start_date.hash(state);
        c.horizon_weeks.hash(state);
        for value in [
            c.density_range.min,
            c.density_range.max,
            c.density_case_rate,
            c.temperature_baseline.min,
            c.temperature_baseline.max,
            c.temperature_noise_std,
            c.precipitation_baseline.min,
            c.precipitation_baseline.max,
            c.precipitation_noise_std,
            c.observation_noise_std,
            c.coefficients.autocorrelation,
            c.coefficients.reference_temperature,
            c.coefficients.reference_precipitation,
            c.coefficients.seasonal_period_days,
        ] {
            value.to_bits().hash(state);
        }

        for (disease, profile) in &self.profiles {
            disease.hash(state);
            profile.peak_day.to_bits().hash(state);
            profile.amplitude.to_bits().hash(state);
            profile.volume_multiplier.to_bits().hash(state);
            (profile.climate_response as u8).hash(state);
            profile.features.hash(state);
            profile.season.hash(state);
        }

        self.model.name().hash(state);
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("diseases", &self.diseases())
            .field("model", &self.model.name())
            .finish()
    }
}

/// Floor negative or non-finite counts at zero, then truncate
fn clamp_cases(raw: f64) -> u32 {
    if raw.is_finite() && raw > 0.0 {
        raw.trunc() as u32
    } else {
        0
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.gen_range(min..=max)
}

fn normal(name: &str, std_dev: f64) -> Result<Normal<f64>, ConfigurationError> {
    Normal::new(0.0, std_dev).map_err(|e| ConfigurationError::invalid(name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn registry() -> ClinicRegistry {
        ClinicRegistry::from_clinics(vec![
            Clinic::new("CF Adib Jatene (Complexo da Maré)", -22.8656, -43.2419, 1.3),
            Clinic::new("CF Augusto Boal (Bonsucesso)", -22.8657, -43.2445, 1.7),
        ])
        .unwrap()
    }

    fn simulator() -> Simulator {
        Simulator::from_config(&SurveillanceConfig::default()).unwrap()
    }

    #[test]
    fn test_row_count() {
        let table = simulator()
            .generate(&registry(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(table.len(), 2 * 3 * 52);
    }

    #[test]
    fn test_row_order() {
        let table = simulator()
            .generate(&registry(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        let first = &table.rows()[0];
        assert_eq!(first.clinic, "CF Adib Jatene (Complexo da Maré)");
        assert_eq!(first.disease, DiseaseCategory::Dengue);
        assert_eq!(first.week, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());

        let second_series = &table.rows()[52];
        assert_eq!(second_series.disease, DiseaseCategory::Chikungunya);
    }

    #[test]
    fn test_non_negative_and_bookkeeping() {
        let table = simulator()
            .generate(&registry(), &mut StdRng::seed_from_u64(5))
            .unwrap();

        assert!(table.iter().all(|r| r.precipitation >= 0.0));
        for clinic in table.clinic_names() {
            for disease in table.diseases() {
                let series = table.series(clinic, disease);
                assert_eq!(series[0].previous_week_case_count, 0);
                for pair in series.windows(2) {
                    assert_eq!(pair[1].previous_week_case_count, pair[0].case_count);
                    assert!(pair[1].week > pair[0].week);
                }
            }
        }
    }

    #[test]
    fn test_density_constant_within_series() {
        let sim = simulator();
        let clinic = Clinic::new("A", 0.0, 0.0, 1.5);
        let series = sim
            .simulate_series(&clinic, DiseaseCategory::Influenza, &mut StdRng::seed_from_u64(2))
            .unwrap();

        let density = series[0].population_density;
        assert!(series.iter().all(|r| r.population_density == density));
        assert!((7_500..=22_500).contains(&density));
    }

    #[test]
    fn test_missing_disease_profile() {
        let config = SurveillanceConfig::default().with_diseases(vec![DiseaseCategory::Dengue]);
        let sim = Simulator::from_config(&config).unwrap();
        let clinic = Clinic::new("A", 0.0, 0.0, 1.5);
        let result =
            sim.simulate_series(&clinic, DiseaseCategory::Influenza, &mut StdRng::seed_from_u64(2));
        assert_eq!(
            result,
            Err(ConfigurationError::MissingProfile("Influenza".to_string()))
        );
    }

    #[test]
    fn test_zero_horizon_rejected_at_construction() {
        let config = SurveillanceConfig::default()
            .with_simulation(SimulationConfig::default().with_horizon(0));
        assert_eq!(
            Simulator::from_config(&config).unwrap_err(),
            ConfigurationError::ZeroHorizon
        );
    }

    #[test]
    fn test_custom_case_model_is_used() {
        struct Flat;
        impl CaseModel for Flat {
            fn expected_cases(&self, _week: &WeekContext<'_>) -> f64 {
                -50.0
            }
            fn name(&self) -> &str {
                "flat"
            }
        }

        let sim = simulator().with_case_model(Flat);
        let table = sim.generate(&registry(), &mut StdRng::seed_from_u64(3)).unwrap();
        // Strongly negative expectations clamp to zero
        assert!(table.iter().all(|r| r.case_count == 0));
    }

    #[test]
    fn test_off_season_peak_reported() {
        let row = |month: u32, cases: u32| WeeklyObservation {
            week: NaiveDate::from_ymd_opt(2024, month, 7).unwrap(),
            clinic: "A".to_string(),
            disease: DiseaseCategory::Dengue,
            case_count: cases,
            mean_temperature: 27.0,
            precipitation: 100.0,
            population_density: 10_000,
            previous_week_case_count: 0,
            latitude: -22.8,
            longitude: -43.2,
        };
        let simulator = simulator();

        let winter_peak = HistoricalTable::from_rows(vec![row(1, 2), row(7, 9)]);
        assert_eq!(
            simulator.check_seasons(&winter_peak),
            vec![DiseaseCategory::Dengue]
        );
        let summer_peak = HistoricalTable::from_rows(vec![row(1, 9), row(7, 2)]);
        assert!(simulator.check_seasons(&summer_peak).is_empty());
    }

    #[test]
    fn test_clamp_cases() {
        assert_eq!(clamp_cases(-3.2), 0);
        assert_eq!(clamp_cases(f64::NAN), 0);
        assert_eq!(clamp_cases(4.99), 4);
        assert_eq!(clamp_cases(0.0), 0);
    }

    #[test]
    fn test_duplicate_diseases_collapse() {
        let config = SurveillanceConfig::default().with_diseases(vec![
            DiseaseCategory::Influenza,
            DiseaseCategory::Dengue,
            DiseaseCategory::Influenza,
        ]);
        let sim = Simulator::from_config(&config).unwrap();
        assert_eq!(
            sim.diseases(),
            vec![DiseaseCategory::Dengue, DiseaseCategory::Influenza]
        );
    }
}
