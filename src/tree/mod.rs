//! Binary trees over a single input
//!
//! Splits are chosen top-down by minimising the summed squared deviation of
//! the two children. The node type is shared by the classification tree
//! (leaf = class-1 fraction), the regression tree (leaf = mean y) and the
//! bagged forest.

pub mod classifier;
pub mod forest;
pub mod regressor;

pub use self::classifier::*;
pub use self::forest::*;
pub use self::regressor::*;

use serde::{Deserialize, Serialize};

/// Default depth limit for every tree model
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64 },
    /// Internal node; inputs below the threshold go left
    Split {
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn leaf(value: f64) -> Self {
        TreeNode::Leaf { value }
    }

    pub fn split(threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split {
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Descend to a leaf and return its value
    pub fn predict(&self, x: f64) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    threshold,
                    left,
                    right,
                } => node = if x < *threshold { &**left } else { &**right },
            }
        }
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }
}

/// Prediction of an optional root; unfitted trees answer a neutral 0.5
pub(crate) fn predict_or_neutral(root: Option<&TreeNode>, x: f64) -> f64 {
    root.map_or(0.5, |node| node.predict(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> TreeNode {
        TreeNode::split(
            0.5,
            TreeNode::leaf(0.0),
            TreeNode::split(0.8, TreeNode::leaf(0.6), TreeNode::leaf(1.0)),
        )
    }

    #[test]
    fn test_descent() {
        let tree = sample_tree();
        assert_eq!(tree.predict(0.2), 0.0);
        assert_eq!(tree.predict(0.5), 0.6);
        assert_eq!(tree.predict(0.79), 0.6);
        assert_eq!(tree.predict(0.8), 1.0);
    }

    #[test]
    fn test_shape() {
        let tree = sample_tree();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.n_leaves(), 3);
        assert!(!tree.is_leaf());
        assert!(TreeNode::leaf(1.0).is_leaf());
    }

    #[test]
    fn test_unfitted_prediction_is_neutral() {
        assert_eq!(predict_or_neutral(None, 0.3), 0.5);
        assert_eq!(predict_or_neutral(Some(&TreeNode::leaf(0.9)), 0.3), 0.9);
    }
}
