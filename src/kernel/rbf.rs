//! RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(u, v) = exp(-γ * (u - v)²)
//! where γ (gamma) is a hyperparameter that controls the kernel width.

use crate::kernel::Kernel;
use serde::{Deserialize, Serialize};

/// Gamma used by the sandbox SVM
pub const DEFAULT_GAMMA: f64 = 15.0;

/// RBF (Radial Basis Function) kernel: K(u, v) = exp(-γ * (u - v)²)
///
/// The gamma parameter controls the "reach" of each landmark:
/// - High gamma: only close inputs are similar (wiggly decision surface)
/// - Low gamma: distant inputs still interact (smooth decision surface)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    /// Default RBF kernel with gamma = 15.0
    fn default() -> Self {
        Self::new(DEFAULT_GAMMA)
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, u: f64, v: f64) -> f64 {
        let diff = u - v;
        (-self.gamma * diff * diff).exp()
    }
}
