//! Kernel trait definition

/// Kernel function trait
///
/// A kernel function K(u, v) measures the similarity of two inputs in
/// normalized model space. Implementations must be symmetric.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(u, v)
    fn compute(&self, u: f64, v: f64) -> f64;

    /// Kernel values of `x` against every landmark, in landmark order
    fn features(&self, landmarks: &[f64], x: f64) -> Vec<f64> {
        landmarks.iter().map(|&l| self.compute(l, x)).collect()
    }
}
