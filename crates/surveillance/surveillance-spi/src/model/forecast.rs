//! Forecast outputs: per-clinic predictions and per-disease importances

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DiseaseCategory, Feature, FeatureValues};
use crate::error::TrainingError;

/// Next-week prediction for one (clinic, disease) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub clinic: String,
    pub disease: DiseaseCategory,
    pub week: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub mean_temperature: f64,
    pub precipitation: f64,
    pub population_density: u32,
    pub previous_week_case_count: u32,
    pub predicted_case_count: u32,
}

impl ForecastRecord {
    /// The synthesized covariates the prediction was made from
    pub fn inputs(&self) -> FeatureValues {
        FeatureValues {
            mean_temperature: self.mean_temperature,
            precipitation: self.precipitation,
            population_density: self.population_density,
            previous_week_case_count: self.previous_week_case_count,
        }
    }
}

/// Normalized importance of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportanceEntry {
    pub feature: Feature,
    pub label: String,
    pub importance: f64,
}

/// Ranked feature importances of one disease model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub disease: DiseaseCategory,
    /// Sorted by descending importance
    pub entries: Vec<FeatureImportanceEntry>,
}

impl FeatureImportance {
    /// Build a ranking from raw importances aligned with `features`
    ///
    /// Weights are normalized to sum to one. Returns `None` when the raw
    /// weights are all zero or any is non-finite.
    pub fn ranked(disease: DiseaseCategory, features: &[Feature], raw: &[f64]) -> Option<Self> {
        let total: f64 = raw.iter().sum();
        if features.len() != raw.len() || !total.is_finite() || total <= 0.0 {
            return None;
        }

        let mut entries: Vec<FeatureImportanceEntry> = features
            .iter()
            .zip(raw)
            .map(|(feature, &weight)| FeatureImportanceEntry {
                feature: *feature,
                label: feature.label().to_string(),
                importance: weight / total,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.feature.cmp(&b.feature))
        });

        Some(Self { disease, entries })
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.importance).sum()
    }

    pub fn top(&self) -> Option<&FeatureImportanceEntry> {
        self.entries.first()
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.feature == feature)
            .map(|e| e.importance)
    }
}

/// In-sample fit quality of a trained category model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingDiagnostics {
    pub rows: usize,
    pub mae: f64,
    pub r_squared: f64,
}

/// Everything produced for one successfully trained category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForecast {
    pub forecasts: Vec<ForecastRecord>,
    pub importance: FeatureImportance,
    pub diagnostics: TrainingDiagnostics,
}

/// Result of training and forecasting one disease category
///
/// Failed categories stay in the output with their error so callers can
/// tell a partial run from a complete one.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOutcome {
    pub disease: DiseaseCategory,
    pub result: Result<CategoryForecast, TrainingError>,
}

impl CategoryOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn forecast(&self) -> Option<&CategoryForecast> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&TrainingError> {
        self.result.as_ref().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_normalizes_and_sorts() {
        let features = [
            Feature::MeanTemperature,
            Feature::PopulationDensity,
            Feature::PreviousWeekCases,
        ];
        let ranking =
            FeatureImportance::ranked(DiseaseCategory::Influenza, &features, &[1.0, 2.0, 5.0])
                .unwrap();

        assert!((ranking.total() - 1.0).abs() < 1e-12);
        assert_eq!(ranking.top().unwrap().feature, Feature::PreviousWeekCases);
        assert_eq!(ranking.entries[2].feature, Feature::MeanTemperature);
        assert!((ranking.get(Feature::PopulationDensity).unwrap() - 0.25).abs() < 1e-12);
        assert_eq!(ranking.entries[0].label, "Previous Week Cases");
    }

    #[test]
    fn test_ranked_rejects_zero_total() {
        let features = [Feature::MeanTemperature, Feature::Precipitation];
        let ranked = FeatureImportance::ranked(DiseaseCategory::Dengue, &features, &[0.0, 0.0]);
        assert!(ranked.is_none());
    }

    #[test]
    fn test_ranked_rejects_length_mismatch() {
        let features = [Feature::MeanTemperature];
        let ranked = FeatureImportance::ranked(DiseaseCategory::Dengue, &features, &[0.5, 0.5]);
        assert!(ranked.is_none());
    }

    #[test]
    fn test_outcome_accessors() {
        let failed = CategoryOutcome {
            disease: DiseaseCategory::Dengue,
            result: Err(TrainingError::EmptyTrainingSet),
        };
        assert!(!failed.is_ok());
        assert!(failed.forecast().is_none());
        assert_eq!(failed.error(), Some(&TrainingError::EmptyTrainingSet));
    }
}
