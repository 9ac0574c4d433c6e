//! Clinic model

use serde::{Deserialize, Serialize};

/// Location of a clinic before a risk factor is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicSite {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ClinicSite {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// A health clinic with its drawn risk factor
///
/// Immutable once created; the registry owns every clinic for the
/// lifetime of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    name: String,
    latitude: f64,
    longitude: f64,
    risk_factor: f64,
}

impl Clinic {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, risk_factor: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            risk_factor,
        }
    }

    /// Attach a risk factor to a site
    pub fn from_site(site: ClinicSite, risk_factor: f64) -> Self {
        Self {
            name: site.name,
            latitude: site.latitude,
            longitude: site.longitude,
            risk_factor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn risk_factor(&self) -> f64 {
        self.risk_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clinic_from_site() {
        let site = ClinicSite::new("CF Wilma Costa (Cocotá)", -22.803715, -43.1813638);
        let clinic = Clinic::from_site(site, 1.4);

        assert_eq!(clinic.name(), "CF Wilma Costa (Cocotá)");
        assert_eq!(clinic.latitude(), -22.803715);
        assert_eq!(clinic.longitude(), -43.1813638);
        assert_eq!(clinic.risk_factor(), 1.4);
    }
}
