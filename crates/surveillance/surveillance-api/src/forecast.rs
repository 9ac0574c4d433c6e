//! Forecasting configuration

use serde::{Deserialize, Serialize};
use surveillance_spi::ConfigurationError;

use crate::simulation::validate_std_dev;

/// Hyperparameters of the random-forest regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Maximum tree depth (None grows until leaves are pure or too small)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples required in each leaf
    pub min_samples_leaf: usize,
    /// Train each tree on a bootstrap resample
    pub bootstrap: bool,
    /// Seed of the forest's own random streams
    pub seed: u64,
    /// Grow trees on the rayon thread pool
    pub parallel: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
            parallel: true,
        }
    }
}

impl ForestConfig {
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.n_trees == 0 {
            return Err(ConfigurationError::invalid("n_trees", "must be at least 1"));
        }
        if self.max_depth == Some(0) {
            return Err(ConfigurationError::invalid("max_depth", "must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(ConfigurationError::invalid(
                "min_samples_split",
                "must be at least 2",
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ConfigurationError::invalid(
                "min_samples_leaf",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Configuration for the per-disease forecasting engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub forest: ForestConfig,
    /// Noise added to the last observed temperature for next week
    pub temperature_perturbation_std: f64,
    /// Noise added to the last observed precipitation for next week
    pub precipitation_perturbation_std: f64,
    /// Train disease categories concurrently
    pub parallel: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            temperature_perturbation_std: 3.0,
            precipitation_perturbation_std: 60.0,
            parallel: true,
        }
    }
}

impl ForecastConfig {
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    pub fn with_perturbation(mut self, temperature_std: f64, precipitation_std: f64) -> Self {
        self.temperature_perturbation_std = temperature_std;
        self.precipitation_perturbation_std = precipitation_std;
        self
    }

    /// Disable both category-level and tree-level parallelism
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self.forest.parallel = false;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.forest.validate()?;
        validate_std_dev(
            "temperature_perturbation_std",
            self.temperature_perturbation_std,
        )?;
        validate_std_dev(
            "precipitation_perturbation_std",
            self.precipitation_perturbation_std,
        )
    }
}
