//! Bagged ensemble of regression trees

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use surveillance_api::ForestConfig;
use surveillance_spi::{Regressor, TrainingError};
use tracing::debug;

use super::tree::{RegressionTree, TreeParams};

/// Random forest regressor
///
/// Every tree draws its bootstrap sample from its own generator seeded by
/// `(seed, tree index)`, so the fitted forest is identical whether trees
/// are grown in parallel or one after another.
///
/// # Example
///
/// ```rust
/// use surveillance_api::ForestConfig;
/// use surveillance_core::forest::RandomForestRegressor;
/// use surveillance_spi::Regressor;
///
/// let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
/// let y: Vec<f64> = (0..40).map(|i| if i < 20 { 2.0 } else { 8.0 }).collect();
///
/// let mut forest = RandomForestRegressor::new(ForestConfig::default().with_trees(20)).unwrap();
/// forest.fit(&x, &y).unwrap();
/// let prediction = forest.predict_one(&[35.0, 1.0]).unwrap();
/// assert!(prediction > 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: Option<usize>,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Result<Self, TrainingError> {
        config
            .validate()
            .map_err(|e| TrainingError::InvalidParameter {
                name: "forest".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            config,
            trees: Vec::new(),
            n_features: None,
        })
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
        }
    }

    fn grow_tree(&self, index: usize, rows: &[Vec<f64>], target: &[f64]) -> RegressionTree {
        let n = rows.len();
        let samples = if self.config.bootstrap {
            let mut rng = StdRng::seed_from_u64(tree_seed(self.config.seed, index));
            (0..n).map(|_| rng.gen_range(0..n)).collect()
        } else {
            (0..n).collect()
        };
        RegressionTree::fit(rows, target, samples, self.tree_params())
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, features: &[Vec<f64>], target: &[f64]) -> Result<(), TrainingError> {
        validate_training_data(features, target)?;

        let forest = &*self;
        let trees: Vec<RegressionTree> = if self.config.parallel {
            (0..self.config.n_trees)
                .into_par_iter()
                .map(|i| forest.grow_tree(i, features, target))
                .collect()
        } else {
            (0..self.config.n_trees)
                .map(|i| forest.grow_tree(i, features, target))
                .collect()
        };

        debug!(
            trees = trees.len(),
            rows = features.len(),
            nodes = trees.iter().map(RegressionTree::node_count).sum::<usize>(),
            "fitted random forest"
        );

        self.n_features = Some(features[0].len());
        self.trees = trees;
        Ok(())
    }

    fn predict_one(&self, row: &[f64]) -> Result<f64, TrainingError> {
        let expected = self.n_features.ok_or(TrainingError::NotFitted)?;
        if row.len() != expected {
            return Err(TrainingError::DimensionMismatch {
                expected,
                actual: row.len(),
            });
        }

        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, TrainingError> {
        if self.config.parallel {
            rows.par_iter().map(|row| self.predict_one(row)).collect()
        } else {
            rows.iter().map(|row| self.predict_one(row)).collect()
        }
    }

    /// Mean of per-tree normalized impurity decreases, renormalized
    fn feature_importances(&self) -> Result<Vec<f64>, TrainingError> {
        let width = self.n_features.ok_or(TrainingError::NotFitted)?;

        let mut totals = vec![0.0; width];
        for tree in &self.trees {
            for (total, share) in totals.iter_mut().zip(tree.importances()) {
                *total += share;
            }
        }

        let sum: f64 = totals.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(TrainingError::NoInformativeFeatures);
        }
        Ok(totals.into_iter().map(|t| t / sum).collect())
    }

    fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }
}

/// Independent seed for the tree at `index`
fn tree_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn validate_training_data(features: &[Vec<f64>], target: &[f64]) -> Result<(), TrainingError> {
    if features.is_empty() {
        return Err(TrainingError::EmptyTrainingSet);
    }
    if features.len() != target.len() {
        return Err(TrainingError::LengthMismatch {
            rows: features.len(),
            targets: target.len(),
        });
    }

    let width = features[0].len();
    if width == 0 {
        return Err(TrainingError::InvalidParameter {
            name: "features".to_string(),
            reason: "at least one feature column is required".to_string(),
        });
    }
    for (row, values) in features.iter().enumerate() {
        if values.len() != width {
            return Err(TrainingError::DimensionMismatch {
                expected: width,
                actual: values.len(),
            });
        }
        if let Some(col) = values.iter().position(|v| !v.is_finite()) {
            return Err(TrainingError::NonFiniteFeature {
                feature: format!("column {col}"),
                row,
            });
        }
    }

    if let Some(row) = target.iter().position(|v| !v.is_finite()) {
        return Err(TrainingError::NonFiniteFeature {
            feature: "target".to_string(),
            row,
        });
    }

    let first = target[0];
    if target.iter().all(|&y| y == first) {
        return Err(TrainingError::ConstantTarget {
            value: first,
            rows: target.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let y: Vec<f64> = (0..60).map(|i| (i / 10) as f64 * 3.0).collect();
        (x, y)
    }

    fn forest(config: ForestConfig) -> RandomForestRegressor {
        RandomForestRegressor::new(config).unwrap()
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = data();
        let mut model = forest(ForestConfig::default().with_trees(30));
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted());
        assert_eq!(model.n_trees(), 30);
        let low = model.predict_one(&[3.0, 1.0]).unwrap();
        let high = model.predict_one(&[57.0, 1.0]).unwrap();
        assert!(low < 3.0);
        assert!(high > 12.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (x, y) = data();
        let mut parallel = forest(ForestConfig::default().with_trees(16).with_seed(7));
        let mut sequential =
            forest(ForestConfig::default().with_trees(16).with_seed(7).sequential());
        parallel.fit(&x, &y).unwrap();
        sequential.fit(&x, &y).unwrap();

        assert_eq!(parallel.trees(), sequential.trees());
        assert_eq!(
            parallel.feature_importances().unwrap(),
            sequential.feature_importances().unwrap()
        );
    }

    #[test]
    fn test_seed_changes_forest() {
        let (x, y) = data();
        let mut a = forest(ForestConfig::default().with_trees(8).with_seed(1));
        let mut b = forest(ForestConfig::default().with_trees(8).with_seed(2));
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_ne!(a.trees(), b.trees());
    }

    #[test]
    fn test_importances_sum_to_one_and_rank_signal() {
        let (x, y) = data();
        let mut model = forest(ForestConfig::default().with_trees(20));
        model.fit(&x, &y).unwrap();

        let importances = model.feature_importances().unwrap();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_not_fitted() {
        let model = forest(ForestConfig::default());
        assert_eq!(model.predict_one(&[1.0]), Err(TrainingError::NotFitted));
        assert_eq!(model.feature_importances(), Err(TrainingError::NotFitted));
    }

    #[test]
    fn test_training_errors() {
        let mut model = forest(ForestConfig::default().with_trees(4));

        assert_eq!(model.fit(&[], &[]), Err(TrainingError::EmptyTrainingSet));
        assert_eq!(
            model.fit(&[vec![1.0], vec![2.0]], &[3.0, 3.0]),
            Err(TrainingError::ConstantTarget {
                value: 3.0,
                rows: 2
            })
        );
        assert_eq!(
            model.fit(&[vec![1.0], vec![f64::NAN]], &[1.0, 2.0]),
            Err(TrainingError::NonFiniteFeature {
                feature: "column 0".to_string(),
                row: 1
            })
        );
        assert_eq!(
            model.fit(&[vec![1.0]], &[1.0, 2.0]),
            Err(TrainingError::LengthMismatch {
                rows: 1,
                targets: 2
            })
        );
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_constant_features_are_uninformative() {
        let x = vec![vec![5.0, 1.0]; 10];
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut model = forest(ForestConfig::default().with_trees(5));
        model.fit(&x, &y).unwrap();
        assert_eq!(
            model.feature_importances(),
            Err(TrainingError::NoInformativeFeatures)
        );
    }

    #[test]
    fn test_dimension_mismatch_on_predict() {
        let (x, y) = data();
        let mut model = forest(ForestConfig::default().with_trees(3));
        model.fit(&x, &y).unwrap();
        assert_eq!(
            model.predict_one(&[1.0]),
            Err(TrainingError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_invalid_config() {
        let result = RandomForestRegressor::new(ForestConfig::default().with_trees(0));
        assert!(matches!(
            result,
            Err(TrainingError::InvalidParameter { .. })
        ));
    }
}
