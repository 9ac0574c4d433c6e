//! Clinic registry
//!
//! Ordered table of clinics with coordinates and a risk factor drawn once
//! per run from the injected random source.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use rand::Rng;
use surveillance_api::{RegistryConfig, ValueRange};
use surveillance_spi::{Clinic, ClinicSite, ConfigurationError};
use tracing::debug;

/// Built-in sites: municipal health centres and family clinics of
/// Rio de Janeiro planning area 3.1
const DEFAULT_SITES: &[(&str, f64, f64)] = &[
    ("CMS Madre Teresa de Calcutá (Bancários)", -22.78659, -43.18582),
    ("CMS Newton Alves Cardozo (Cacuia)", -22.80908, -43.18927),
    ("CMS Parque Royal (Portuguesa)", -22.79464, -43.20959),
    ("CMS Vila do João (Complexo da Maré)", -22.87350, -43.23976),
    ("CMS João Cândido (Penha)", -22.82191, -43.27115),
    ("CMS São Godoredo (Penha)", -22.84146, -43.27071),
    ("CMS José Breves dos Santos (Cordovil)", -22.81689, -43.28955),
    ("CMS Américo Veloso (Ramos)", -22.84181, -43.24957),
    ("CMS Maria Cristina Roma Paugartten (Ramos)", -22.85186, -43.25192),
    ("CMS Iraci Lopes (Vigário Geral)", -22.80730, -43.30394),
    ("CMS Nagib Jorge Farah (Jardim América)", -22.80780, -43.32143),
    ("CMS José Paranhos Fontenelle (Olaria)", -22.84183, -43.26965),
    ("CMS Alemão (Complexo do Alemão)", -22.86504, -43.26845),
    ("CF Victor Valla (AP 3.1)", -22.8860155, -43.2511681),
    ("CF Assis Valente (Galeão)", -22.8107054, -43.2296404),
    ("CF Maria Sebastiana de Oliveira (Tauá)", -22.7969615, -43.1939483),
    ("CF Wilma Costa (Cocotá)", -22.803715, -43.1813638),
    ("CF Adib Jatene (Complexo da Maré)", -22.8656456, -43.2419067),
    ("CF Diniz Batista dos Santos (Complexo da Maré)", -22.8470668, -43.2471472),
    ("CF Jeremias Moraes da Silva (Complexo da Maré)", -22.8545612, -43.2421543),
    ("CF Felippe Cardoso (Penha)", -22.8427502, -43.2815405),
    ("CF Rodrigo Y. Aguilar Roig (Cordovil)", -22.8604152, -43.2705142),
    ("CF Nilda Campos de Lima (Cordovil)", -22.8284469, -43.3044761),
    ("CF Valter Felisbino de Souza (Ramos)", -22.8546931, -43.2671231),
    ("CF Jorgina Tuta (Vigário Geral)", -22.8518103, -43.2543167),
    ("CF Klebel de Oliveira Rocha (Vigário Geral)", -22.850761, -43.27306),
    ("CF Heitor dos Prazeres (Brás de Pina)", -22.824787, -43.283083),
    ("CF Augusto Boal (Bonsucesso)", -22.8657052, -43.244519),
    ("CF Zilda Arns (Complexo do Alemão)", -22.865377, -43.269168),
    ("CF Eidimir Thiago de Souza (Parada de Lucas)", -22.8232363, -43.3120509),
    ("CF Aloysio Augusto Novis (Penha Circular)", -22.8379708, -43.2926308),
];

/// Ordered mapping from clinic name to its location and risk factor
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicRegistry {
    clinics: Vec<Clinic>,
}

impl ClinicRegistry {
    /// The built-in site list
    pub fn default_sites() -> Vec<ClinicSite> {
        DEFAULT_SITES
            .iter()
            .map(|(name, lat, lon)| ClinicSite::new(*name, *lat, *lon))
            .collect()
    }

    /// Draw one risk factor per site, in site order
    pub fn generate<R: Rng + ?Sized>(
        sites: Vec<ClinicSite>,
        risk_range: ValueRange,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        risk_range.validate("risk_factor_range")?;

        let clinics = sites
            .into_iter()
            .map(|site| {
                let risk = rng.gen_range(risk_range.min..=risk_range.max);
                Clinic::from_site(site, risk)
            })
            .collect();

        let registry = Self::from_clinics(clinics)?;
        debug!(clinics = registry.len(), "generated clinic registry");
        Ok(registry)
    }

    /// Build from configuration, falling back to the built-in sites
    pub fn from_config<R: Rng + ?Sized>(
        config: &RegistryConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let sites = config.sites.clone().unwrap_or_else(Self::default_sites);
        Self::generate(sites, config.risk_factor_range, rng)
    }

    /// Build from clinics with fixed risk factors
    pub fn from_clinics(clinics: Vec<Clinic>) -> Result<Self, ConfigurationError> {
        if clinics.is_empty() {
            return Err(ConfigurationError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for clinic in &clinics {
            if !seen.insert(clinic.name()) {
                return Err(ConfigurationError::DuplicateClinic(clinic.name().to_string()));
            }
            if !clinic.risk_factor().is_finite() || clinic.risk_factor() <= 0.0 {
                return Err(ConfigurationError::invalid(
                    "risk_factor",
                    format!("clinic '{}' must have a positive risk factor", clinic.name()),
                ));
            }
        }

        Ok(Self { clinics })
    }

    pub fn get(&self, name: &str) -> Option<&Clinic> {
        self.clinics.iter().find(|c| c.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clinic> {
        self.clinics.iter()
    }

    pub fn clinics(&self) -> &[Clinic] {
        &self.clinics
    }

    pub fn names(&self) -> Vec<&str> {
        self.clinics.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.clinics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clinics.is_empty()
    }

    /// Stable hash of the full snapshot, used as part of cache keys
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        self.clinics.len().hash(state);
        for clinic in &self.clinics {
            clinic.name().hash(state);
            clinic.latitude().to_bits().hash(state);
            clinic.longitude().to_bits().hash(state);
            clinic.risk_factor().to_bits().hash(state);
        }
    }
}

impl<'a> IntoIterator for &'a ClinicRegistry {
    type Item = &'a Clinic;
    type IntoIter = std::slice::Iter<'a, Clinic>;

    fn into_iter(self) -> Self::IntoIter {
        self.clinics.iter()
    }
}
