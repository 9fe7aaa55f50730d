//! Small curve-fitting and classification models over one input
//!
//! A catalogue of estimators (gradient-descent curves, a step model, naive
//! Bayes, KNN, a landmark RBF SVM, decision trees and a bagged forest) that
//! share one fit/predict/score contract over normalized coordinates, plus
//! a synthetic point generator and helpers for drawing fitted models.

pub mod api;
pub mod classification;
pub mod core;
pub mod data;
pub mod kernel;
pub mod metrics;
pub mod regression;
pub mod tree;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{Experiment, ExperimentReport, ModelFamily, ModelOptions};
pub use crate::classification::{KernelSvm, KnnClassifier, NaiveBayesClassifier};
pub use crate::core::error::*;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{Generator, GeneratorConfig, PointSet};
pub use crate::kernel::{Kernel, RBFKernel};
pub use crate::metrics::Metrics;
pub use crate::regression::{CurveFamily, GradientRegressor, StepRegressor};
pub use crate::tree::{ClassificationTree, DecisionForest, RegressionTree, TreeNode};
pub use crate::utils::Normalizer;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
