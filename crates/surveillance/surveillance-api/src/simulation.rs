//! Simulation configuration
//!
//! Every coefficient of the weekly case formula is a named parameter here;
//! the defaults reproduce the reference dashboard's behaviour.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use surveillance_spi::ConfigurationError;

/// Longest simulated history, a century of weeks
pub const MAX_HORIZON_WEEKS: usize = 5_200;

/// Closed interval used for uniform draws
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigurationError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigurationError::InvalidRange {
                name: name.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Coefficients of the expected-case formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseCoefficients {
    /// Fraction of last week's cases carried into this week
    pub autocorrelation: f64,
    /// Temperature at which climate modulation is neutral (°C)
    pub reference_temperature: f64,
    /// Precipitation scale for vector-borne modulation (mm)
    pub reference_precipitation: f64,
    /// Length of the seasonal cycle in days
    pub seasonal_period_days: f64,
}

impl Default for CaseCoefficients {
    fn default() -> Self {
        Self {
            autocorrelation: 0.05,
            reference_temperature: 28.0,
            reference_precipitation: 150.0,
            seasonal_period_days: 365.25,
        }
    }
}

impl CaseCoefficients {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..1.0).contains(&self.autocorrelation) {
            return Err(ConfigurationError::invalid(
                "autocorrelation",
                "must be in [0, 1)",
            ));
        }
        for (name, value) in [
            ("reference_temperature", self.reference_temperature),
            ("reference_precipitation", self.reference_precipitation),
            ("seasonal_period_days", self.seasonal_period_days),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigurationError::invalid(name, "must be positive"));
            }
        }
        Ok(())
    }
}

/// Configuration for the weekly case simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// First week is the first Sunday on or after this date
    pub start_date: NaiveDate,
    /// Number of weekly periods per series
    pub horizon_weeks: usize,
    /// Population density draw before risk scaling
    pub density_range: ValueRange,
    /// Weekly cases per inhabitant-density unit
    pub density_case_rate: f64,
    /// Per-series temperature baseline draw (°C)
    pub temperature_baseline: ValueRange,
    /// Weekly temperature noise around the baseline
    pub temperature_noise_std: f64,
    /// Per-series precipitation baseline draw (mm)
    pub precipitation_baseline: ValueRange,
    /// Weekly precipitation noise around the baseline
    pub precipitation_noise_std: f64,
    /// Gaussian noise added to each week's case count
    pub observation_noise_std: f64,
    pub coefficients: CaseCoefficients,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            horizon_weeks: 52,
            density_range: ValueRange::new(5_000.0, 15_000.0),
            density_case_rate: 0.0005,
            temperature_baseline: ValueRange::new(25.0, 30.0),
            temperature_noise_std: 2.0,
            precipitation_baseline: ValueRange::new(80.0, 150.0),
            precipitation_noise_std: 40.0,
            observation_noise_std: 2.0,
            coefficients: CaseCoefficients::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_horizon(mut self, weeks: usize) -> Self {
        self.horizon_weeks = weeks;
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    pub fn with_observation_noise(mut self, std_dev: f64) -> Self {
        self.observation_noise_std = std_dev;
        self
    }

    pub fn with_coefficients(mut self, coefficients: CaseCoefficients) -> Self {
        self.coefficients = coefficients;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.horizon_weeks == 0 {
            return Err(ConfigurationError::ZeroHorizon);
        }
        if self.horizon_weeks > MAX_HORIZON_WEEKS {
            return Err(ConfigurationError::invalid(
                "horizon_weeks",
                format!("must not exceed {} weeks", MAX_HORIZON_WEEKS),
            ));
        }
        if self.forecast_week().is_none() {
            return Err(ConfigurationError::invalid(
                "start_date",
                "history and forecast week run past the supported calendar",
            ));
        }

        self.density_range.validate("density_range")?;
        if self.density_range.min <= 0.0 {
            return Err(ConfigurationError::invalid(
                "density_range",
                "densities must be positive",
            ));
        }
        self.temperature_baseline.validate("temperature_baseline")?;
        if self.temperature_baseline.min <= 0.0 {
            // Cold-favored modulation divides by temperature
            return Err(ConfigurationError::invalid(
                "temperature_baseline",
                "must stay above 0 °C",
            ));
        }
        self.precipitation_baseline.validate("precipitation_baseline")?;

        if !self.density_case_rate.is_finite() || self.density_case_rate <= 0.0 {
            return Err(ConfigurationError::invalid(
                "density_case_rate",
                "must be positive",
            ));
        }
        for (name, value) in [
            ("temperature_noise_std", self.temperature_noise_std),
            ("precipitation_noise_std", self.precipitation_noise_std),
            ("observation_noise_std", self.observation_noise_std),
        ] {
            validate_std_dev(name, value)?;
        }

        self.coefficients.validate()
    }
}

impl SimulationConfig {
    /// Sunday after the last simulated week, `None` when it overflows
    ///
    /// The first week is the first Sunday on or after `start_date`.
    pub fn forecast_week(&self) -> Option<NaiveDate> {
        let weeks = i64::try_from(self.horizon_weeks.min(MAX_HORIZON_WEEKS)).ok()?;
        let offset = (7 - self.start_date.weekday().num_days_from_sunday()) % 7;
        self.start_date
            .checked_add_signed(Duration::days(i64::from(offset)))?
            .checked_add_signed(Duration::weeks(weeks))
    }
}

pub(crate) fn validate_std_dev(name: &str, value: f64) -> Result<(), ConfigurationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigurationError::invalid(
            name,
            "standard deviation must be finite and non-negative",
        ));
    }
    Ok(())
}
