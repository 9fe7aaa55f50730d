//! Point sets: loading, saving and synthetic generation
//!
//! Points live in display space; the [`PointSet`] carries the normalizer that
//! maps them into the model space every estimator works in.

pub mod csv;
pub mod synthetic;

pub use self::csv::*;
pub use self::synthetic::{ground_truth, ClassLayout, Generator, GeneratorConfig};
