//! Seasonal and climate modulation of weekly case volume
//!
//! Expected cases for a week are
//!
//! ```text
//! (base + autocorrelation * previous) * seasonal(doy) * climate(temp, precip)
//! ```
//!
//! with `seasonal = 1 + amplitude * cos(2π (doy - peak_day) / period)` so
//! forcing peaks exactly on the profile's peak day.

use std::f64::consts::PI;

use surveillance_api::CaseCoefficients;
use surveillance_spi::{CaseModel, ClimateResponse, DiseaseProfile, WeekContext};

/// Temperatures below this are treated as this value by cold-favored modulation
const MIN_TEMPERATURE: f64 = 1.0;

/// Default expected-case formula, parameterized by named coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalClimateModel {
    coefficients: CaseCoefficients,
}

impl SeasonalClimateModel {
    pub fn new(coefficients: CaseCoefficients) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &CaseCoefficients {
        &self.coefficients
    }

    /// Seasonal forcing factor, in `[1 - amplitude, 1 + amplitude]`
    pub fn seasonal_factor(&self, profile: &DiseaseProfile, day_of_year: u32) -> f64 {
        let offset = day_of_year as f64 - profile.peak_day;
        let phase = 2.0 * PI * offset / self.coefficients.seasonal_period_days;
        1.0 + profile.amplitude * phase.cos()
    }

    /// Climate modulation factor for the week's weather
    pub fn climate_factor(
        &self,
        profile: &DiseaseProfile,
        mean_temperature: f64,
        precipitation: f64,
    ) -> f64 {
        match profile.climate_response {
            ClimateResponse::VectorBorne => {
                mean_temperature / self.coefficients.reference_temperature
                    + precipitation / self.coefficients.reference_precipitation
            }
            ClimateResponse::ColdFavored => {
                self.coefficients.reference_temperature / mean_temperature.max(MIN_TEMPERATURE)
            }
        }
    }

    /// Contribution carried over from last week's count
    pub fn autocorrelation(&self, previous_cases: u32) -> f64 {
        self.coefficients.autocorrelation * previous_cases as f64
    }
}

impl Default for SeasonalClimateModel {
    fn default() -> Self {
        Self::new(CaseCoefficients::default())
    }
}

impl CaseModel for SeasonalClimateModel {
    fn expected_cases(&self, week: &WeekContext<'_>) -> f64 {
        let seasonal = self.seasonal_factor(week.profile, week.day_of_year);
        let climate =
            self.climate_factor(week.profile, week.mean_temperature, week.precipitation);
        (week.base_volume + self.autocorrelation(week.previous_cases)) * seasonal * climate
    }

    fn name(&self) -> &str {
        "seasonal-climate"
    }
}
