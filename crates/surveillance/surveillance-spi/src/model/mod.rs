//! Model module containing data structures

mod clinic;
mod disease;
mod feature;
mod forecast;
mod observation;

pub use clinic::{Clinic, ClinicSite};
pub use disease::{ClimateResponse, DiseaseCategory, DiseaseProfile, SeasonWindow};
pub use feature::{Feature, FeatureValues};
pub use forecast::{
    CategoryForecast, CategoryOutcome, FeatureImportance, FeatureImportanceEntry, ForecastRecord,
    TrainingDiagnostics,
};
pub use observation::{HistoricalTable, WeeklyObservation};
