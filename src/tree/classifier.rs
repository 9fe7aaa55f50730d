//! Classification tree: leaves hold the fraction of class-1 samples

use crate::core::{
    collect_labels, ensure_not_empty, mean, sum_squared_deviation, Model, Result, Sample, Task,
};
use crate::tree::{predict_or_neutral, TreeNode, DEFAULT_MAX_DEPTH};
use log::debug;

/// Depth-limited classification tree
#[derive(Debug, Clone)]
pub struct ClassificationTree {
    max_depth: usize,
    root: Option<TreeNode>,
}

impl ClassificationTree {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            root: None,
        }
    }

    /// Set maximum depth; 0 yields a single leaf
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }
}

impl Default for ClassificationTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Grow a subtree over `(x, label value)` pairs
///
/// Every sample's x is a candidate threshold; samples strictly below it go left.
fn grow(points: &[(f64, f64)], depth: usize, max_depth: usize) -> TreeNode {
    let value = mean(points.iter().map(|p| p.1));
    let pure = points.iter().all(|p| p.1 == points[0].1);
    if depth >= max_depth || points.len() < 2 || pure {
        return TreeNode::leaf(value);
    }

    let mut best: Option<(f64, f64)> = None;
    for &(threshold, _) in points {
        let (left, right) = partition(points, threshold);
        if left.is_empty() || right.is_empty() {
            continue;
        }
        let err = sum_squared_deviation(&left) + sum_squared_deviation(&right);
        if best.map_or(true, |(_, best_err)| err < best_err) {
            best = Some((threshold, err));
        }
    }

    let Some((threshold, _)) = best else {
        // All inputs identical: no threshold separates them
        return TreeNode::leaf(value);
    };

    let (left, right): (Vec<(f64, f64)>, Vec<(f64, f64)>) =
        points.iter().partition(|p| p.0 < threshold);
    TreeNode::split(
        threshold,
        grow(&left, depth + 1, max_depth),
        grow(&right, depth + 1, max_depth),
    )
}

/// Label values on each side of a threshold
fn partition(points: &[(f64, f64)], threshold: f64) -> (Vec<f64>, Vec<f64>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for &(x, v) in points {
        if x < threshold {
            left.push(v);
        } else {
            right.push(v);
        }
    }
    (left, right)
}

impl Model for ClassificationTree {
    fn name(&self) -> &'static str {
        "Decision Tree"
    }

    fn task(&self) -> Task {
        Task::Classification
    }

    fn fit(&mut self, samples: &[Sample]) -> Result<()> {
        ensure_not_empty(samples)?;
        let labels = collect_labels(samples)?;

        let points: Vec<(f64, f64)> = samples
            .iter()
            .zip(labels)
            .map(|(s, label)| (s.x, label.value()))
            .collect();
        let root = grow(&points, 0, self.max_depth);

        debug!(
            "Decision Tree: depth {} with {} leaves",
            root.depth(),
            root.n_leaves()
        );
        self.root = Some(root);
        Ok(())
    }

    fn predict(&self, x: f64) -> f64 {
        predict_or_neutral(self.root.as_ref(), x)
    }
}
