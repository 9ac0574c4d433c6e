//! Disease categories and their per-category profiles
//!
//! Everything that differs between diseases (seasonal phase, amplitude,
//! climate response, case volume and predictive features) lives in a
//! [`DiseaseProfile`], so adding a category only touches this table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Feature;
use crate::error::ConfigurationError;

/// Closed set of tracked diseases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiseaseCategory {
    Dengue,
    Chikungunya,
    Influenza,
}

impl DiseaseCategory {
    /// All categories in canonical order
    pub const ALL: [DiseaseCategory; 3] = [
        DiseaseCategory::Dengue,
        DiseaseCategory::Chikungunya,
        DiseaseCategory::Influenza,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DiseaseCategory::Dengue => "Dengue",
            DiseaseCategory::Chikungunya => "Chikungunya",
            DiseaseCategory::Influenza => "Influenza",
        }
    }

    /// Built-in profile for this category
    pub fn default_profile(&self) -> DiseaseProfile {
        let vector_borne_features = vec![
            Feature::MeanTemperature,
            Feature::Precipitation,
            Feature::PopulationDensity,
            Feature::PreviousWeekCases,
        ];

        match self {
            DiseaseCategory::Dengue => DiseaseProfile {
                peak_day: 60.0,
                amplitude: 0.8,
                volume_multiplier: 1.0,
                climate_response: ClimateResponse::VectorBorne,
                features: vector_borne_features,
                season: SeasonWindow::new(1, 120),
            },
            DiseaseCategory::Chikungunya => DiseaseProfile {
                peak_day: 60.0,
                amplitude: 0.8,
                volume_multiplier: 0.6,
                climate_response: ClimateResponse::VectorBorne,
                features: vector_borne_features,
                season: SeasonWindow::new(1, 120),
            },
            // Precipitation is not a predictor for respiratory spread
            DiseaseCategory::Influenza => DiseaseProfile {
                peak_day: 195.0,
                amplitude: 0.9,
                volume_multiplier: 1.0,
                climate_response: ClimateResponse::ColdFavored,
                features: vec![
                    Feature::MeanTemperature,
                    Feature::PopulationDensity,
                    Feature::PreviousWeekCases,
                ],
                season: SeasonWindow::new(152, 243),
            },
        }
    }
}

impl fmt::Display for DiseaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiseaseCategory {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DiseaseCategory::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigurationError::UnknownDisease(wanted.to_string()))
    }
}

/// How simulated climate modulates case volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateResponse {
    /// Scales up with temperature and precipitation
    VectorBorne,
    /// Scales inversely with temperature
    ColdFavored,
}

/// Inclusive day-of-year window, wrapping past the year end when start > end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonWindow {
    pub start_day: u32,
    pub end_day: u32,
}

impl SeasonWindow {
    pub fn new(start_day: u32, end_day: u32) -> Self {
        Self { start_day, end_day }
    }

    pub fn contains(&self, day_of_year: u32) -> bool {
        if self.start_day <= self.end_day {
            (self.start_day..=self.end_day).contains(&day_of_year)
        } else {
            day_of_year >= self.start_day || day_of_year <= self.end_day
        }
    }
}

/// Per-category simulation and training contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProfile {
    /// Day of year at which seasonal forcing peaks
    pub peak_day: f64,
    /// Seasonal forcing amplitude, in [0, 1)
    pub amplitude: f64,
    /// Case volume relative to Dengue
    pub volume_multiplier: f64,
    pub climate_response: ClimateResponse,
    /// Predictors used when training this category's model
    pub features: Vec<Feature>,
    /// Window in which incidence is expected to peak
    pub season: SeasonWindow,
}

impl DiseaseProfile {
    /// Check the profile for values the simulator cannot use
    pub fn validate(&self, disease: DiseaseCategory) -> Result<(), ConfigurationError> {
        let field = |name: &str| format!("{}.{}", disease.name().to_lowercase(), name);

        if !(0.0..=366.0).contains(&self.peak_day) {
            return Err(ConfigurationError::invalid(
                &field("peak_day"),
                "must be a day of year in [0, 366]",
            ));
        }
        if !(0.0..1.0).contains(&self.amplitude) {
            return Err(ConfigurationError::invalid(
                &field("amplitude"),
                "must be in [0, 1) so seasonal forcing stays positive",
            ));
        }
        if !self.volume_multiplier.is_finite() || self.volume_multiplier <= 0.0 {
            return Err(ConfigurationError::invalid(
                &field("volume_multiplier"),
                "must be positive",
            ));
        }
        if self.features.is_empty() {
            return Err(ConfigurationError::invalid(
                &field("features"),
                "at least one feature is required",
            ));
        }
        if self.season.start_day == 0
            || self.season.start_day > 366
            || self.season.end_day == 0
            || self.season.end_day > 366
        {
            return Err(ConfigurationError::invalid(
                &field("season"),
                "days must be in [1, 366]",
            ));
        }
        if !self.season.contains(self.peak_day.round().max(1.0) as u32) {
            return Err(ConfigurationError::invalid(
                &field("peak_day"),
                "must fall inside the season window",
            ));
        }
        Ok(())
    }
}
