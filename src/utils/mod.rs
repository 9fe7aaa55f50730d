//! Utility functions shared by the models and the presentation boundary

pub mod sampling;
pub mod scaling;

pub use self::scaling::Normalizer;
