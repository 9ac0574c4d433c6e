//! CART regression tree
//!
//! Greedy binary splits chosen by the largest reduction in squared error.
//! Each split's reduction is credited to its feature, giving the
//! mean-decrease-in-impurity importances the ensemble averages.

/// Reductions at or below this are treated as no improvement
const MIN_IMPURITY_DECREASE: f64 = 1e-9;

/// Growth limits of a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Fitted regression tree, nodes stored in a flat arena
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    /// Total squared-error reduction per feature
    impurity_decrease: Vec<f64>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    decrease: f64,
    /// Sample indices sorted by `feature`, cut at `position`
    order: Vec<usize>,
    position: usize,
}

struct Builder<'a> {
    rows: &'a [Vec<f64>],
    target: &'a [f64],
    params: TreeParams,
    nodes: Vec<Node>,
    impurity_decrease: Vec<f64>,
}

impl RegressionTree {
    /// Grow a tree over the given sample indices, which may repeat
    pub fn fit(
        rows: &[Vec<f64>],
        target: &[f64],
        samples: Vec<usize>,
        params: TreeParams,
    ) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let mut builder = Builder {
            rows,
            target,
            params,
            nodes: Vec::new(),
            impurity_decrease: vec![0.0; width],
        };
        builder.grow(samples, 0);

        Self {
            nodes: builder.nodes,
            impurity_decrease: builder.impurity_decrease,
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Per-feature share of this tree's total impurity decrease
    ///
    /// All zeros when the tree is a single leaf.
    pub fn importances(&self) -> Vec<f64> {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.impurity_decrease.len()];
        }
        self.impurity_decrease.iter().map(|d| d / total).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

impl Builder<'_> {
    /// Grow the subtree over `samples` and return its node index
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: mean(self.target, &samples),
        });

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || samples.len() < self.params.min_samples_split {
            return index;
        }

        let Some(split) = self.best_split(&samples) else {
            return index;
        };

        self.impurity_decrease[split.feature] += split.decrease;
        let mut order = split.order;
        let right_samples = order.split_off(split.position);
        let left = self.grow(order, depth + 1);
        let right = self.grow(right_samples, depth + 1);

        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn best_split(&self, samples: &[usize]) -> Option<SplitCandidate> {
        let n = samples.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        if n < 2 * min_leaf {
            return None;
        }

        let (total_sum, total_sq) = samples.iter().fold((0.0, 0.0), |(s, q), &i| {
            let y = self.target[i];
            (s + y, q + y * y)
        });
        let parent_sse = sse(total_sum, total_sq, n as f64);
        if parent_sse <= MIN_IMPURITY_DECREASE {
            return None;
        }

        let width = self.impurity_decrease.len();
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..width {
            let mut order = samples.to_vec();
            order.sort_by(|&a, &b| {
                self.rows[a][feature]
                    .partial_cmp(&self.rows[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            let mut best_here: Option<(usize, f64)> = None;

            for position in 1..n {
                let y = self.target[order[position - 1]];
                left_sum += y;
                left_sq += y * y;

                if position < min_leaf || n - position < min_leaf {
                    continue;
                }
                let lo = self.rows[order[position - 1]][feature];
                let hi = self.rows[order[position]][feature];
                if lo >= hi {
                    continue;
                }

                let left_n = position as f64;
                let right_n = (n - position) as f64;
                let children = sse(left_sum, left_sq, left_n)
                    + sse(total_sum - left_sum, total_sq - left_sq, right_n);
                let decrease = parent_sse - children;

                if best_here.map_or(true, |(_, d)| decrease > d) {
                    best_here = Some((position, decrease));
                }
            }

            if let Some((position, decrease)) = best_here {
                let improves = decrease > MIN_IMPURITY_DECREASE
                    && best.as_ref().map_or(true, |b| decrease > b.decrease);
                if improves {
                    let lo = self.rows[order[position - 1]][feature];
                    let hi = self.rows[order[position]][feature];
                    best = Some(SplitCandidate {
                        feature,
                        threshold: lo + (hi - lo) / 2.0,
                        decrease,
                        order,
                        position,
                    });
                }
            }
        }

        best
    }
}

fn mean(target: &[f64], samples: &[usize]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&i| target[i]).sum::<f64>() / samples.len() as f64
}

/// Sum of squared deviations from the mean, floored at zero
fn sse(sum: f64, sum_sq: f64, n: f64) -> f64 {
    (sum_sq - sum * sum / n).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    #[test]
    fn test_step_function_learned_exactly() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let target: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();
        let tree = RegressionTree::fit(&rows, &target, (0..10).collect(), params());

        assert_eq!(tree.predict(&[2.0]), 1.0);
        assert_eq!(tree.predict(&[7.0]), 9.0);
        assert_eq!(tree.predict(&[4.6]), 9.0);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_importance_goes_to_informative_feature() {
        // Column 0 is noise-free signal, column 1 is constant
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 3.0]).collect();
        let target: Vec<f64> = (0..20).map(|i| (i / 4) as f64).collect();
        let tree = RegressionTree::fit(&rows, &target, (0..20).collect(), params());

        let importances = tree.importances();
        assert!((importances[0] - 1.0).abs() < 1e-12);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let target = vec![4.0; 6];
        let tree = RegressionTree::fit(&rows, &target, (0..6).collect(), params());

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[100.0]), 4.0);
        assert_eq!(tree.importances(), vec![0.0]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let rows: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        let target: Vec<f64> = (0..32).map(|i| i as f64).collect();
        let limited = TreeParams {
            max_depth: Some(2),
            ..params()
        };
        let tree = RegressionTree::fit(&rows, &target, (0..32).collect(), limited);
        assert_eq!(tree.depth(), 2);
        assert!(tree.node_count() <= 7);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let rows: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64]).collect();
        let target = vec![0.0, 0.0, 0.0, 10.0];
        let wide_leaves = TreeParams {
            min_samples_leaf: 2,
            ..params()
        };
        let tree = RegressionTree::fit(&rows, &target, (0..4).collect(), wide_leaves);
        // Only the 2/2 split is allowed
        assert_eq!(tree.predict(&[3.0]), 5.0);
        assert_eq!(tree.predict(&[0.0]), 0.0);
    }

    #[test]
    fn test_repeated_samples() {
        let rows = vec![vec![0.0], vec![1.0]];
        let target = vec![2.0, 6.0];
        let tree = RegressionTree::fit(&rows, &target, vec![0, 0, 0, 1], params());
        assert_eq!(tree.predict(&[0.0]), 2.0);
        assert_eq!(tree.predict(&[1.0]), 6.0);
    }
}
