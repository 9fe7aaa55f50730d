//! Curve regressors over the normalized x coordinate

pub mod gradient;
pub mod step;

pub use self::gradient::*;
pub use self::step::*;
pub use crate::tree::RegressionTree;
