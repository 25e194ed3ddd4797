//! Random forest regression
//!
//! Bootstrap-aggregated CART regression trees. Every split considers all
//! features and picks the threshold that minimises the summed squared error
//! of the two children. Sampling is driven by a seeded RNG, so identical
//! input always yields an identical forest.

use super::regression::{check_training_set, mean};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of trees in the ensemble
pub const DEFAULT_TREES: usize = 100;

/// Default RNG seed for bootstrap sampling
pub const DEFAULT_SEED: u64 = 42;

/// Forest hyper-parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    /// Number of trees to grow
    pub n_trees: usize,
    /// Seed for bootstrap sampling
    pub seed: u64,
    /// Nodes with fewer samples than this become leaves
    pub min_samples_split: usize,
    /// Optional depth limit; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Draw a bootstrap sample per tree instead of using every row
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            seed: DEFAULT_SEED,
            min_samples_split: 2,
            max_depth: None,
            bootstrap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A single CART regression tree
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    root: Node,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    error: f64,
}

impl RegressionTree {
    /// Grow a tree on the rows listed in `sample`
    pub fn fit(
        features: &[Vec<f64>],
        targets: &[f64],
        sample: &[usize],
        config: &ForestConfig,
    ) -> Self {
        let mut rows = sample.to_vec();
        Self {
            root: grow(features, targets, &mut rows, 0, config),
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    #[cfg(test)]
    fn leaf_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf(_) => 1,
                Node::Split { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }
}

fn grow(
    features: &[Vec<f64>],
    targets: &[f64],
    rows: &mut [usize],
    depth: usize,
    config: &ForestConfig,
) -> Node {
    let values: Vec<f64> = rows.iter().map(|&i| targets[i]).collect();
    let leaf_value = mean(&values);

    let depth_reached = config.max_depth.is_some_and(|max| depth >= max);
    let too_small = rows.len() < config.min_samples_split.max(2);
    if too_small || depth_reached || sum_squared_error(&values) <= f64::EPSILON {
        return Node::Leaf(leaf_value);
    }

    let Some(best) = best_split(features, targets, rows) else {
        return Node::Leaf(leaf_value);
    };

    let (mut left, mut right): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .copied()
        .partition(|&i| features[i][best.feature] <= best.threshold);

    Node::Split {
        feature: best.feature,
        threshold: best.threshold,
        left: Box::new(grow(features, targets, &mut left, depth + 1, config)),
        right: Box::new(grow(features, targets, &mut right, depth + 1, config)),
    }
}

/// Exhaustive search over features and midpoints between distinct values
fn best_split(features: &[Vec<f64>], targets: &[f64], rows: &mut [usize]) -> Option<Candidate> {
    let width = features[rows[0]].len();
    let n = rows.len();
    let total_sum: f64 = rows.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = rows.iter().map(|&i| targets[i] * targets[i]).sum();
    let mut best: Option<Candidate> = None;

    for feature in 0..width {
        rows.sort_by(|&a, &b| {
            features[a][feature]
                .partial_cmp(&features[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 0..n - 1 {
            let y = targets[rows[k]];
            left_sum += y;
            left_sq += y * y;

            let here = features[rows[k]][feature];
            let next = features[rows[k + 1]][feature];
            if next <= here {
                continue;
            }

            let left_n = (k + 1) as f64;
            let right_n = (n - k - 1) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let error = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.as_ref().map_or(true, |b| error < b.error) {
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some(Candidate {
                    feature,
                    threshold,
                    error,
                });
            }
        }
    }

    best
}

fn sum_squared_error(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum()
}

/// Bootstrap-aggregated ensemble of regression trees
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn fit(features: &[Vec<f64>], targets: &[f64], config: &ForestConfig) -> Result<Self> {
        check_training_set(features, targets)?;

        let n = features.len();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let trees = (0..config.n_trees.max(1))
            .map(|_| {
                let sample: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(features, targets, &sample, config)
            })
            .collect();

        Ok(Self { trees })
    }

    /// Mean of the per-tree predictions
    pub fn predict(&self, row: &[f64]) -> f64 {
        let predictions: Vec<f64> = self.trees.iter().map(|t| t.predict(row)).collect();
        mean(&predictions)
    }

    #[cfg(test)]
    fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 1.0]).collect();
        let targets = (0..10).map(|i| if i < 5 { 2.0 } else { 8.0 }).collect();
        (features, targets)
    }

    #[test]
    fn test_tree_learns_step() {
        let (features, targets) = step_data();
        let sample: Vec<usize> = (0..10).collect();
        let tree = RegressionTree::fit(&features, &targets, &sample, &ForestConfig::default());

        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.predict(&[1.0, 1.0]), 2.0);
        assert_eq!(tree.predict(&[4.4, 1.0]), 2.0);
        assert_eq!(tree.predict(&[4.6, 1.0]), 8.0);
    }

    #[test]
    fn test_constant_targets_make_single_leaf() {
        let features: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64]).collect();
        let targets = vec![3.0; 5];
        let sample: Vec<usize> = (0..5).collect();
        let tree = RegressionTree::fit(&features, &targets, &sample, &ForestConfig::default());
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.predict(&[100.0]), 3.0);
    }

    #[test]
    fn test_identical_features_cannot_split() {
        let features = vec![vec![1.0], vec![1.0], vec![1.0]];
        let targets = vec![1.0, 2.0, 6.0];
        let sample: Vec<usize> = (0..3).collect();
        let tree = RegressionTree::fit(&features, &targets, &sample, &ForestConfig::default());
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.predict(&[1.0]), 3.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let features: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let sample: Vec<usize> = (0..8).collect();
        let config = ForestConfig {
            max_depth: Some(1),
            ..ForestConfig::default()
        };
        let tree = RegressionTree::fit(&features, &targets, &sample, &config);
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_forest_is_deterministic_for_seed() {
        let (features, targets) = step_data();
        let config = ForestConfig::default();
        let a = RandomForestRegressor::fit(&features, &targets, &config).unwrap();
        let b = RandomForestRegressor::fit(&features, &targets, &config).unwrap();
        assert_eq!(a.n_trees(), 100);
        assert_eq!(a.predict(&[3.0, 1.0]), b.predict(&[3.0, 1.0]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_forest_prediction_within_target_range() {
        let (features, targets) = step_data();
        let forest = RandomForestRegressor::fit(&features, &targets, &ForestConfig::default()).unwrap();
        for x in [0.0, 4.5, 9.0, 50.0] {
            let p = forest.predict(&[x, 1.0]);
            assert!((2.0..=8.0).contains(&p), "prediction {} out of range", p);
        }
    }

    #[test]
    fn test_without_bootstrap_every_tree_matches() {
        let (features, targets) = step_data();
        let config = ForestConfig {
            n_trees: 5,
            bootstrap: false,
            ..ForestConfig::default()
        };
        let forest = RandomForestRegressor::fit(&features, &targets, &config).unwrap();
        assert_eq!(forest.predict(&[0.0, 1.0]), 2.0);
        assert_eq!(forest.predict(&[9.0, 1.0]), 8.0);
    }

    #[test]
    fn test_forest_rejects_empty_training_set() {
        assert!(RandomForestRegressor::fit(&[], &[], &ForestConfig::default()).is_err());
    }
}
