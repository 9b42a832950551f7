//! CART Decision Tree
//!
//! Gini-impurity classification tree. Nodes are stored in a flat arena with
//! the root at index 0, so a fitted tree serializes as a plain list.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Classifier;
use crate::error::{ModelError, ModelResult};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Non-constant features examined per split
    pub max_features: usize,
    /// `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_features: usize::MAX,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// `x[feature] <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class fractions of the training samples that reached this leaf
    Leaf { distribution: Vec<f64> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

// ============================================================================
// FITTING
// ============================================================================

impl DecisionTree {
    /// Fit on every row of `x`
    pub fn fit<R: Rng>(
        x: &Array2<f64>,
        y: &[usize],
        n_classes: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> ModelResult<Self> {
        let samples: Vec<usize> = (0..x.nrows()).collect();
        Self::fit_samples(x, y, &samples, n_classes, params, rng)
    }

    /// Fit on the rows listed in `samples`. Repeated indices act as sample weights.
    pub fn fit_samples<R: Rng>(
        x: &Array2<f64>,
        y: &[usize],
        samples: &[usize],
        n_classes: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> ModelResult<Self> {
        if x.nrows() != y.len() {
            return Err(ModelError::InvalidInput(format!(
                "{} rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }
        if samples.is_empty() || x.ncols() == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(ModelError::InvalidInput(format!(
                "class {} out of range for {} classes",
                bad, n_classes
            )));
        }
        if let Some(&bad) = samples.iter().find(|&&i| i >= x.nrows()) {
            return Err(ModelError::InvalidInput(format!("sample index {} out of range", bad)));
        }

        let mut builder = Builder {
            x: x.view(),
            y,
            n_classes,
            params: *params,
            nodes: Vec::new(),
        };
        let mut samples = samples.to_vec();
        builder.build(&mut samples, 0, rng);

        Ok(Self {
            nodes: builder.nodes,
            n_features: x.ncols(),
            n_classes,
        })
    }
}

struct Builder<'a> {
    x: ArrayView2<'a, f64>,
    y: &'a [usize],
    n_classes: usize,
    params: TreeParams,
    nodes: Vec<Node>,
}

impl Builder<'_> {
    /// Grow the subtree for `samples`, returning its node id
    fn build<R: Rng>(&mut self, samples: &mut [usize], depth: usize, rng: &mut R) -> usize {
        let counts = self.class_counts(samples);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);

        if pure || samples.len() < self.params.min_samples_split || depth_reached {
            return self.push_leaf(&counts, samples.len());
        }

        let Some((feature, threshold)) = self.best_split(samples, &counts, rng) else {
            return self.push_leaf(&counts, samples.len());
        };

        // Partition in place: left block is x[feature] <= threshold
        let mut mid = 0;
        for i in 0..samples.len() {
            if self.x[[samples[i], feature]] <= threshold {
                samples.swap(i, mid);
                mid += 1;
            }
        }

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { distribution: Vec::new() });

        let (left_samples, right_samples) = samples.split_at_mut(mid);
        let left = self.build(left_samples, depth + 1, rng);
        let right = self.build(right_samples, depth + 1, rng);

        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    fn push_leaf(&mut self, counts: &[usize], n: usize) -> usize {
        let total = n.max(1) as f64;
        let distribution = counts.iter().map(|&c| c as f64 / total).collect();
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in samples {
            counts[self.y[i]] += 1;
        }
        counts
    }

    /// Lowest weighted Gini split over a random subset of features
    fn best_split<R: Rng>(
        &self,
        samples: &[usize],
        parent_counts: &[usize],
        rng: &mut R,
    ) -> Option<(usize, f64)> {
        let x = self.x;
        let n = samples.len() as f64;

        let mut features: Vec<usize> = (0..x.ncols()).collect();
        features.shuffle(rng);

        let mut sorted = samples.to_vec();
        let mut best: Option<(usize, f64, f64)> = None;
        let mut visited = 0;

        for feature in features {
            if visited >= self.params.max_features {
                break;
            }

            sorted.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));
            let first = x[[sorted[0], feature]];
            let last = x[[sorted[sorted.len() - 1], feature]];
            if first == last {
                // Constant features don't count toward max_features
                continue;
            }
            visited += 1;

            let mut left = vec![0usize; self.n_classes];
            let mut right = parent_counts.to_vec();

            for k in 0..sorted.len() - 1 {
                let class = self.y[sorted[k]];
                left[class] += 1;
                right[class] -= 1;

                let value = x[[sorted[k], feature]];
                let next = x[[sorted[k + 1], feature]];
                if value == next {
                    continue;
                }

                let n_left = (k + 1) as f64;
                let n_right = n - n_left;
                let impurity = (n_left * gini(&left, n_left) + n_right * gini(&right, n_right)) / n;

                if best.map_or(true, |(_, _, b)| impurity < b) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some((feature, threshold, impurity));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

fn gini(counts: &[usize], n: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

// ============================================================================
// PREDICTION
// ============================================================================

impl DecisionTree {
    /// Class distribution of the leaf `row` falls into
    pub fn leaf_distribution(&self, row: ArrayView1<'_, f64>) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Structural check for trees that came from disk.
    ///
    /// Children must point forward in the arena, so a passing tree has no cycles.
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { distribution } => {
                    if distribution.len() != self.n_classes {
                        return Err(format!(
                            "leaf {} has {} classes, expected {}",
                            id,
                            distribution.len(),
                            self.n_classes
                        ));
                    }
                    if distribution.iter().any(|p| !p.is_finite() || *p < 0.0) {
                        return Err(format!("leaf {} has an invalid class fraction", id));
                    }
                    let total: f64 = distribution.iter().sum();
                    if (total - 1.0).abs() > 1e-9 {
                        return Err(format!("leaf {} fractions sum to {}, expected 1", id, total));
                    }
                }
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= self.n_features {
                        return Err(format!("node {} splits on unknown feature {}", id, feature));
                    }
                    for &child in [left, right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", id, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Classifier for DecisionTree {
    fn predict_proba(&self, x: &Array2<f64>) -> ModelResult<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                got: x.ncols(),
            });
        }

        let mut proba = Array2::zeros((x.nrows(), self.n_classes));
        for (row, mut out) in x.outer_iter().zip(proba.outer_iter_mut()) {
            for (o, p) in out.iter_mut().zip(self.leaf_distribution(row)) {
                *o = *p;
            }
        }
        Ok(proba)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn toy() -> (Array2<f64>, Vec<usize>) {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [10.0, 5.0], [11.0, 5.0], [12.0, 5.0]];
        let y = vec![0, 0, 0, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_separable_data_fits_exactly() {
        let (x, y) = toy();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, 2, &TreeParams::default(), &mut rng).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 1);

        match &tree.nodes()[0] {
            Node::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert_eq!(*threshold, 6.5);
            }
            other => panic!("expected split at root, got {:?}", other),
        }
    }

    #[test]
    fn test_depth_zero_is_prior() {
        let (x, y) = toy();
        let params = TreeParams {
            max_depth: Some(0),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, 2, &params, &mut rng).unwrap();

        assert_eq!(tree.node_count(), 1);
        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba.row(0).to_vec(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_duplicate_samples_weight_leaves() {
        let (x, y) = toy();
        let params = TreeParams {
            max_depth: Some(0),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit_samples(&x, &y, &[0, 0, 0, 3], 2, &params, &mut rng).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba.row(0).to_vec(), vec![0.75, 0.25]);
    }

    #[test]
    fn test_rejects_bad_targets() {
        let (x, _) = toy();
        let mut rng = StdRng::seed_from_u64(0);
        let err = DecisionTree::fit(&x, &[0, 0, 0, 1, 1, 5], 2, &TreeParams::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput(_)));
    }

    #[test]
    fn test_shape_mismatch() {
        let (x, y) = toy();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, 2, &TreeParams::default(), &mut rng).unwrap();

        let err = tree.predict_proba(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 2, got: 3 }));
    }

    #[test]
    fn test_consistency_check() {
        let (x, y) = toy();
        let mut rng = StdRng::seed_from_u64(0);
        let mut tree = DecisionTree::fit(&x, &y, 2, &TreeParams::default(), &mut rng).unwrap();
        assert!(tree.check_consistency().is_ok());

        tree.nodes[0] = Node::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 1,
        };
        assert!(tree.check_consistency().is_err());
    }

    #[test]
    fn test_consistency_rejects_bad_leaf_values() {
        let (x, y) = toy();
        let mut rng = StdRng::seed_from_u64(0);
        let fitted = DecisionTree::fit(&x, &y, 2, &TreeParams::default(), &mut rng).unwrap();
        let leaf_id = fitted
            .nodes()
            .iter()
            .position(|n| matches!(n, Node::Leaf { .. }))
            .unwrap();

        for bad in [vec![7.0, 0.0], vec![-0.5, 1.5], vec![f64::NAN, 1.0], vec![0.4, 0.4]] {
            let mut tree = fitted.clone();
            tree.nodes[leaf_id] = Node::Leaf { distribution: bad.clone() };

            let err = tree.check_consistency().unwrap_err();
            assert!(err.contains(&format!("leaf {}", leaf_id)), "{:?}: {}", bad, err);
        }
    }
}
