//! Forecast report and risk summary

use std::collections::HashSet;

use surveillance_spi::{
    CategoryOutcome, DiseaseCategory, FeatureImportance, ForecastRecord, SurveillanceError,
    TrainingError,
};

/// Per-category outcomes of one forecasting pass, in category order
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReport {
    outcomes: Vec<CategoryOutcome>,
}

impl ForecastReport {
    pub fn new(mut outcomes: Vec<CategoryOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.disease);
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[CategoryOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, disease: DiseaseCategory) -> Option<&CategoryOutcome> {
        self.outcomes.iter().find(|o| o.disease == disease)
    }

    /// Forecast rows of every trained category, category then clinic order
    pub fn forecasts(&self) -> Vec<&ForecastRecord> {
        self.outcomes
            .iter()
            .filter_map(CategoryOutcome::forecast)
            .flat_map(|f| f.forecasts.iter())
            .collect()
    }

    /// One ranked importance list per trained category
    pub fn importances(&self) -> Vec<&FeatureImportance> {
        self.outcomes
            .iter()
            .filter_map(CategoryOutcome::forecast)
            .map(|f| &f.importance)
            .collect()
    }

    pub fn failures(&self) -> Vec<(DiseaseCategory, &TrainingError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.disease, e)))
            .collect()
    }

    /// True when every requested category trained
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(CategoryOutcome::is_ok)
    }

    /// Fail with the first category's training error, if any
    pub fn ensure_complete(&self) -> surveillance_spi::Result<()> {
        match self.failures().into_iter().next() {
            Some((disease, error)) => Err(SurveillanceError::training(disease, error.clone())),
            None => Ok(()),
        }
    }

    /// Total predicted cases per trained disease, largest first
    pub fn disease_totals(&self) -> Vec<(DiseaseCategory, u64)> {
        let mut totals: Vec<(DiseaseCategory, u64)> = self
            .outcomes
            .iter()
            .filter_map(|o| {
                o.forecast().map(|f| {
                    let total = f
                        .forecasts
                        .iter()
                        .map(|r| u64::from(r.predicted_case_count))
                        .sum();
                    (o.disease, total)
                })
            })
            .collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        totals
    }

    pub fn highest_risk_disease(&self) -> Option<DiseaseCategory> {
        self.disease_totals().first().map(|(d, _)| *d)
    }

    /// The single clinic forecast with the largest predicted count
    ///
    /// Ties resolve to the earliest record in report order.
    pub fn highest_risk_clinic(&self) -> Option<&ForecastRecord> {
        self.forecasts()
            .into_iter()
            .fold(None, |best: Option<&ForecastRecord>, record| match best {
                Some(b) if b.predicted_case_count >= record.predicted_case_count => Some(b),
                _ => Some(record),
            })
    }

    /// Distinct clinics with at least one forecast
    pub fn monitored_clinics(&self) -> usize {
        self.forecasts()
            .into_iter()
            .map(|r| r.clinic.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Forecasts of one disease, highest predicted count first, ties by clinic name
    pub fn ranking(&self, disease: DiseaseCategory) -> Vec<&ForecastRecord> {
        let mut records: Vec<&ForecastRecord> = self
            .outcome(disease)
            .and_then(CategoryOutcome::forecast)
            .map(|f| f.forecasts.iter().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| {
            b.predicted_case_count
                .cmp(&a.predicted_case_count)
                .then_with(|| a.clinic.cmp(&b.clinic))
        });
        records
    }
}
