//! Memoization of generated historical tables
//!
//! Tables are keyed by a hash of every input that influences generation:
//! simulation parameters, disease profiles, case model, registry snapshot
//! and seed. Entries live until explicitly invalidated or cleared.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use surveillance_spi::{ConfigurationError, HistoricalTable};
use tracing::debug;

use crate::registry::ClinicRegistry;
use crate::simulator::Simulator;

/// Fingerprint of one simulation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimulationKey(u64);

impl SimulationKey {
    pub fn new(simulator: &Simulator, registry: &ClinicRegistry, seed: u64) -> Self {
        let mut hasher = DefaultHasher::new();
        simulator.hash_parameters(&mut hasher);
        registry.hash_into(&mut hasher);
        seed.hash(&mut hasher);
        Self(hasher.finish())
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Owned cache of shared historical tables
#[derive(Debug, Default)]
pub struct SimulationCache {
    entries: HashMap<SimulationKey, Arc<HistoricalTable>>,
    hits: u64,
    misses: u64,
}

impl SimulationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for this request, generating it on a miss
    ///
    /// Generation uses a fresh `StdRng` seeded from `seed`.
    pub fn get_or_generate(
        &mut self,
        simulator: &Simulator,
        registry: &ClinicRegistry,
        seed: u64,
    ) -> Result<Arc<HistoricalTable>, ConfigurationError> {
        let key = SimulationKey::new(simulator, registry, seed);
        if let Some(table) = self.entries.get(&key) {
            self.hits += 1;
            debug!(key = key.value(), "simulation cache hit");
            return Ok(Arc::clone(table));
        }

        self.misses += 1;
        debug!(key = key.value(), "simulation cache miss");
        let mut rng = StdRng::seed_from_u64(seed);
        let table = Arc::new(simulator.generate(registry, &mut rng)?);
        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    pub fn get(&self, key: &SimulationKey) -> Option<Arc<HistoricalTable>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &SimulationKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop one entry; returns whether it was present
    pub fn invalidate(&mut self, key: &SimulationKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surveillance_api::{SimulationConfig, SurveillanceConfig};
    use surveillance_spi::Clinic;

    fn registry(risk: f64) -> ClinicRegistry {
        ClinicRegistry::from_clinics(vec![Clinic::new("CF Zilda Arns", -22.86, -43.27, risk)])
            .unwrap()
    }

    fn simulator(weeks: usize) -> Simulator {
        let config = SurveillanceConfig::default()
            .with_simulation(SimulationConfig::default().with_horizon(weeks));
        Simulator::from_config(&config).unwrap()
    }

    #[test]
    fn test_second_request_hits() {
        let mut cache = SimulationCache::new();
        let sim = simulator(10);
        let reg = registry(1.4);

        let first = cache.get_or_generate(&sim, &reg, 42).unwrap();
        let second = cache.get_or_generate(&sim, &reg, 42).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_covers_seed_registry_and_parameters() {
        let sim = simulator(10);
        let reg = registry(1.4);
        let base = SimulationKey::new(&sim, &reg, 42);

        assert_ne!(base, SimulationKey::new(&sim, &reg, 43));
        assert_ne!(base, SimulationKey::new(&sim, &registry(1.5), 42));
        assert_ne!(base, SimulationKey::new(&simulator(11), &reg, 42));
        assert_eq!(base, SimulationKey::new(&simulator(10), &registry(1.4), 42));
    }

    #[test]
    fn test_invalidate_forces_regeneration() {
        let mut cache = SimulationCache::new();
        let sim = simulator(4);
        let reg = registry(1.1);
        let key = SimulationKey::new(&sim, &reg, 7);

        let first = cache.get_or_generate(&sim, &reg, 7).unwrap();
        assert!(cache.contains(&key));
        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));

        let again = cache.get_or_generate(&sim, &reg, 7).unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
        // Same seed regenerates the same table
        assert_eq!(*first, *again);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_clear() {
        let mut cache = SimulationCache::new();
        let reg = registry(1.2);
        cache.get_or_generate(&simulator(3), &reg, 1).unwrap();
        cache.get_or_generate(&simulator(3), &reg, 2).unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&SimulationKey::new(&simulator(3), &reg, 1)).is_none());
    }
}
