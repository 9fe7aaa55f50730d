//! Regression tree: recursive mean splitting over midpoints of sorted inputs

use crate::core::{ensure_not_empty, mean, sum_squared_deviation, Model, Result, Sample, Task};
use crate::tree::{predict_or_neutral, TreeNode, DEFAULT_MAX_DEPTH};
use log::debug;

/// Depth-limited regression tree; leaves hold the mean `y` of their samples
#[derive(Debug, Clone)]
pub struct RegressionTree {
    max_depth: usize,
    root: Option<TreeNode>,
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            root: None,
        }
    }

    /// Set maximum depth; 0 yields a single leaf at the mean
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

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Grow a subtree over `(x, y)` pairs sorted by x
fn grow(sorted: &[(f64, f64)], depth: usize, max_depth: usize) -> TreeNode {
    let ys: Vec<f64> = sorted.iter().map(|p| p.1).collect();
    let value = mean(ys.iter().copied());
    if depth >= max_depth || sorted.len() <= 2 {
        return TreeNode::leaf(value);
    }

    let parent_err = sum_squared_deviation(&ys);
    let mut best: Option<(usize, f64)> = None;
    for i in 0..sorted.len() - 1 {
        // Equal neighbours give a midpoint that cannot separate them
        if sorted[i].0 == sorted[i + 1].0 {
            continue;
        }
        let err = sum_squared_deviation(&ys[..=i]) + sum_squared_deviation(&ys[i + 1..]);
        if best.map_or(true, |(_, best_err)| err < best_err) {
            best = Some((i, err));
        }
    }

    match best {
        Some((i, err)) if err < parent_err => {
            let threshold = (sorted[i].0 + sorted[i + 1].0) / 2.0;
            TreeNode::split(
                threshold,
                grow(&sorted[..=i], depth + 1, max_depth),
                grow(&sorted[i + 1..], depth + 1, max_depth),
            )
        }
        _ => TreeNode::leaf(value),
    }
}

impl Model for RegressionTree {
    fn name(&self) -> &'static str {
        "Decision Tree Regressor"
    }

    fn task(&self) -> Task {
        Task::Regression
    }

    fn fit(&mut self, samples: &[Sample]) -> Result<()> {
        ensure_not_empty(samples)?;

        let mut sorted: Vec<(f64, f64)> = samples.iter().map(|s| (s.x, s.y)).collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        let root = grow(&sorted, 0, self.max_depth);

        debug!(
            "Decision Tree Regressor: depth {} with {} leaves",
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
