//! Feature matrix assembly for per-disease training

use surveillance_spi::{
    DiseaseCategory, Feature, FeatureValues, HistoricalTable, TrainingError,
};

/// Dense training matrix for one disease
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub disease: DiseaseCategory,
    /// Column order of `rows`
    pub features: Vec<Feature>,
    pub rows: Vec<Vec<f64>>,
    pub target: Vec<f64>,
}

impl TrainingSet {
    /// Collect every historical row of `disease`, target is the weekly case count
    pub fn from_table(
        table: &HistoricalTable,
        disease: DiseaseCategory,
        features: &[Feature],
    ) -> Result<Self, TrainingError> {
        let (rows, target): (Vec<_>, Vec<_>) = table
            .for_disease(disease)
            .map(|obs| (obs.features().vector(features), obs.case_count as f64))
            .unzip();

        let set = Self {
            disease,
            features: features.to_vec(),
            rows,
            target,
        };
        set.validate()?;
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reject empty sets and non-finite cells
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.rows.is_empty() {
            return Err(TrainingError::EmptyTrainingSet);
        }
        if self.rows.len() != self.target.len() {
            return Err(TrainingError::LengthMismatch {
                rows: self.rows.len(),
                targets: self.target.len(),
            });
        }
        check_finite(&self.features, &self.rows)
    }
}

/// Feature row for a query point
pub fn query_row(
    values: &FeatureValues,
    features: &[Feature],
) -> Result<Vec<f64>, TrainingError> {
    let row = values.vector(features);
    check_finite(features, std::slice::from_ref(&row))?;
    Ok(row)
}

fn check_finite(features: &[Feature], rows: &[Vec<f64>]) -> Result<(), TrainingError> {
    for (i, row) in rows.iter().enumerate() {
        if row.len() != features.len() {
            return Err(TrainingError::DimensionMismatch {
                expected: features.len(),
                actual: row.len(),
            });
        }
        if let Some(col) = row.iter().position(|v| !v.is_finite()) {
            return Err(TrainingError::NonFiniteFeature {
                feature: features[col].column().to_string(),
                row: i,
            });
        }
    }
    Ok(())
}
