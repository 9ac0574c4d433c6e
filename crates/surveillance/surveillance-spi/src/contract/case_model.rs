//! Trait for the expected-case formula used by the simulator

use crate::model::DiseaseProfile;

/// Inputs available when computing one week's expected case volume
#[derive(Debug, Clone, Copy)]
pub struct WeekContext<'a> {
    pub profile: &'a DiseaseProfile,
    /// Base weekly case volume of the series
    pub base_volume: f64,
    /// Case count recorded for the previous week of the same series
    pub previous_cases: u32,
    /// Day of year of the week date, 1-based
    pub day_of_year: u32,
    pub mean_temperature: f64,
    pub precipitation: f64,
}

/// Maps a week's inputs to an expected case count
///
/// Implementations return the noiseless expectation; the simulator adds
/// observation noise and clamps to a non-negative integer afterwards.
pub trait CaseModel: Send + Sync {
    /// Expected cases for the week, may be negative for exotic coefficients
    fn expected_cases(&self, week: &WeekContext<'_>) -> f64;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}
