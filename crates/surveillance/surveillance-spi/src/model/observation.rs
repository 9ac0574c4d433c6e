//! Weekly observations and the historical table

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DiseaseCategory, FeatureValues};

/// One clinic-disease-week row of the simulated history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyObservation {
    pub week: NaiveDate,
    pub clinic: String,
    pub disease: DiseaseCategory,
    pub case_count: u32,
    pub mean_temperature: f64,
    pub precipitation: f64,
    pub population_density: u32,
    pub previous_week_case_count: u32,
    pub latitude: f64,
    pub longitude: f64,
}

impl WeeklyObservation {
    pub fn features(&self) -> FeatureValues {
        FeatureValues {
            mean_temperature: self.mean_temperature,
            precipitation: self.precipitation,
            population_density: self.population_density,
            previous_week_case_count: self.previous_week_case_count,
        }
    }
}

/// Ordered collection of weekly observations
///
/// Rows are grouped by clinic, then disease, then ordered by week. The
/// table is append-only during generation and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoricalTable {
    rows: Vec<WeeklyObservation>,
}

impl HistoricalTable {
    pub fn from_rows(rows: Vec<WeeklyObservation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[WeeklyObservation] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeeklyObservation> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct disease categories, in canonical order
    pub fn diseases(&self) -> Vec<DiseaseCategory> {
        let mut diseases: Vec<DiseaseCategory> = self.rows.iter().map(|r| r.disease).collect();
        diseases.sort();
        diseases.dedup();
        diseases
    }

    /// Distinct clinic names, in order of first appearance
    pub fn clinic_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !names.contains(&row.clinic.as_str()) {
                names.push(&row.clinic);
            }
        }
        names
    }

    pub fn for_disease(
        &self,
        disease: DiseaseCategory,
    ) -> impl Iterator<Item = &WeeklyObservation> + '_ {
        self.rows.iter().filter(move |r| r.disease == disease)
    }

    /// All weeks of one (clinic, disease) series in time order
    pub fn series(&self, clinic: &str, disease: DiseaseCategory) -> Vec<&WeeklyObservation> {
        self.rows
            .iter()
            .filter(|r| r.disease == disease && r.clinic == clinic)
            .collect()
    }

    /// Every disease series of one clinic
    pub fn clinic_history(&self, clinic: &str) -> Vec<&WeeklyObservation> {
        self.rows.iter().filter(|r| r.clinic == clinic).collect()
    }

    /// Most recent observation of one (clinic, disease) series
    pub fn latest(&self, clinic: &str, disease: DiseaseCategory) -> Option<&WeeklyObservation> {
        self.rows
            .iter()
            .filter(|r| r.disease == disease && r.clinic == clinic)
            .max_by_key(|r| r.week)
    }

    /// Week with the most cases of one disease summed over clinics
    ///
    /// Ties resolve to the earliest week.
    pub fn peak_week(&self, disease: DiseaseCategory) -> Option<NaiveDate> {
        let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for row in self.for_disease(disease) {
            *totals.entry(row.week).or_default() += u64::from(row.case_count);
        }
        totals
            .into_iter()
            .fold(None, |best: Option<(NaiveDate, u64)>, (week, total)| match best {
                Some((_, top)) if top >= total => best,
                _ => Some((week, total)),
            })
            .map(|(week, _)| week)
    }

    /// Most recent observation per clinic for one disease, in clinic order
    pub fn latest_by_clinic(&self, disease: DiseaseCategory) -> Vec<&WeeklyObservation> {
        self.clinic_names()
            .into_iter()
            .filter_map(|clinic| self.latest(clinic, disease))
            .collect()
    }
}

impl<'a> IntoIterator for &'a HistoricalTable {
    type Item = &'a WeeklyObservation;
    type IntoIter = std::slice::Iter<'a, WeeklyObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
