//! Binary classifiers over the normalized x coordinate
//!
//! Every classifier predicts a class-1 probability in `[0, 1]`; hard labels
//! come from [`Model::classify`](crate::core::Model::classify).

pub mod knn;
pub mod naive_bayes;
pub mod svm;

pub use self::knn::*;
pub use self::naive_bayes::*;
pub use self::svm::*;
pub use crate::tree::{ClassificationTree, DecisionForest, ForestConfig};
