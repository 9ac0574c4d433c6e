//! Predictive features available to the forecasting models

use serde::{Deserialize, Serialize};

/// Exogenous covariates a disease model may train on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    MeanTemperature,
    Precipitation,
    PopulationDensity,
    PreviousWeekCases,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::MeanTemperature,
        Feature::Precipitation,
        Feature::PopulationDensity,
        Feature::PreviousWeekCases,
    ];

    /// Column name used in output tables
    pub fn column(&self) -> &'static str {
        match self {
            Feature::MeanTemperature => "mean_temperature",
            Feature::Precipitation => "precipitation",
            Feature::PopulationDensity => "population_density",
            Feature::PreviousWeekCases => "previous_week_case_count",
        }
    }

    /// Human-readable label for importance rankings
    pub fn label(&self) -> &'static str {
        match self {
            Feature::MeanTemperature => "Mean Temperature (°C)",
            Feature::Precipitation => "Precipitation (mm)",
            Feature::PopulationDensity => "Population Density",
            Feature::PreviousWeekCases => "Previous Week Cases",
        }
    }

    pub fn extract(&self, values: &FeatureValues) -> f64 {
        match self {
            Feature::MeanTemperature => values.mean_temperature,
            Feature::Precipitation => values.precipitation,
            Feature::PopulationDensity => values.population_density as f64,
            Feature::PreviousWeekCases => values.previous_week_case_count as f64,
        }
    }
}

/// Covariates of one clinic-week, observed or synthesized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureValues {
    pub mean_temperature: f64,
    pub precipitation: f64,
    pub population_density: u32,
    pub previous_week_case_count: u32,
}

impl FeatureValues {
    /// Project onto an ordered feature set
    pub fn vector(&self, features: &[Feature]) -> Vec<f64> {
        features.iter().map(|f| f.extract(self)).collect()
    }
}
