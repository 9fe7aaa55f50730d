//! Kernel margin classifier over fixed landmarks
//!
//! Inputs are mapped to RBF similarities against a fixed grid of landmarks in
//! `[0, 1]`, and a linear soft-margin classifier is trained on those features
//! by stochastic sub-gradient descent on the L2-regularised hinge loss.

use crate::core::{collect_labels, ensure_not_empty, Model, Result, Sample, Task};
use crate::kernel::{Kernel, RBFKernel, DEFAULT_GAMMA};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Configuration for stochastic sub-gradient training
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvmConfig {
    /// Number of evenly spaced landmarks
    pub n_landmarks: usize,
    /// RBF kernel width
    pub gamma: f64,
    /// L2 regularization strength
    pub lambda: f64,
    /// Initial learning rate
    pub learning_rate: f64,
    /// Multiplicative learning-rate decay per step
    pub decay: f64,
    /// Number of stochastic steps
    pub iterations: usize,
    /// Slope of the sigmoid that maps scores to probabilities
    pub steepness: f64,
    /// Seed for sampling training points
    pub seed: Option<u64>,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            n_landmarks: 15,
            gamma: DEFAULT_GAMMA,
            lambda: 0.001,
            learning_rate: 0.1,
            decay: 0.9999,
            iterations: 10_000,
            steepness: 2.0,
            seed: None,
        }
    }
}

/// RBF-kernel SVM with one weight per landmark
#[derive(Debug, Clone)]
pub struct KernelSvm {
    config: SvmConfig,
    kernel: RBFKernel,
    landmarks: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
}

impl KernelSvm {
    pub fn new() -> Self {
        Self::with_config(SvmConfig::default())
    }

    /// # Panics
    /// Panics if there are no landmarks or gamma is not positive
    pub fn with_config(config: SvmConfig) -> Self {
        assert!(config.n_landmarks > 0, "SVM needs at least one landmark");
        let landmarks = evenly_spaced(config.n_landmarks);
        Self {
            kernel: RBFKernel::new(config.gamma),
            weights: vec![0.0; landmarks.len()],
            landmarks,
            bias: 0.0,
            config,
        }
    }

    /// Fix the seed of the stochastic sampling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the number of stochastic steps
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    pub fn config(&self) -> &SvmConfig {
        &self.config
    }

    pub fn landmarks(&self) -> &[f64] {
        &self.landmarks
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Signed margin score: `bias + Σ wⱼ·K(landmarkⱼ, x)`
    pub fn decision_function(&self, x: f64) -> f64 {
        score(&self.kernel, &self.landmarks, &self.weights, self.bias, x)
    }

    /// Fit with a caller-provided random source
    pub fn fit_with_rng<R: Rng>(&mut self, samples: &[Sample], rng: &mut R) -> Result<()> {
        ensure_not_empty(samples)?;
        let targets: Vec<f64> = collect_labels(samples)?
            .into_iter()
            .map(|label| label.sign())
            .collect();

        let SvmConfig {
            lambda,
            decay,
            iterations,
            ..
        } = self.config;
        let mut weights = vec![0.0; self.landmarks.len()];
        let mut bias = 0.0;
        let mut lr = self.config.learning_rate;

        for _ in 0..iterations {
            let idx = rng.gen_range(0..samples.len());
            let (x, y) = (samples[idx].x, targets[idx]);
            let features = self.kernel.features(&self.landmarks, x);
            let pred = bias
                + weights
                    .iter()
                    .zip(&features)
                    .map(|(w, k)| w * k)
                    .sum::<f64>();

            if y * pred < 1.0 {
                let grad = y * (1.0 - y * pred);
                for (w, k) in weights.iter_mut().zip(&features) {
                    *w += lr * (grad * k - 2.0 * lambda * *w);
                }
                bias += lr * grad;
            } else {
                for w in weights.iter_mut() {
                    *w -= lr * 2.0 * lambda * *w;
                }
            }
            lr *= decay;
        }

        debug!(
            "SVM: {} steps over {} samples, bias {:.4}",
            iterations,
            samples.len(),
            bias
        );
        self.weights = weights;
        self.bias = bias;
        Ok(())
    }
}

impl Default for KernelSvm {
    fn default() -> Self {
        Self::new()
    }
}

fn evenly_spaced(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![0.5];
    }
    let last = (n - 1) as f64;
    (0..n).map(|i| i as f64 / last).collect()
}

fn score<K: Kernel>(kernel: &K, landmarks: &[f64], weights: &[f64], bias: f64, x: f64) -> f64 {
    bias + landmarks
        .iter()
        .zip(weights)
        .map(|(&l, w)| w * kernel.compute(l, x))
        .sum::<f64>()
}

impl Model for KernelSvm {
    fn name(&self) -> &'static str {
        "SVM"
    }

    fn task(&self) -> Task {
        Task::Classification
    }

    fn fit(&mut self, samples: &[Sample]) -> Result<()> {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.fit_with_rng(samples, &mut rng)
    }

    fn predict(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-self.decision_function(x) * self.config.steepness).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FitError, Label};

    fn split_at_half(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                let x = i as f64 / (n - 1) as f64;
                let label = if x > 0.5 { Label::Positive } else { Label::Negative };
                Sample::labeled(x, 0.5, label)
            })
            .collect()
    }

    #[test]
    fn test_landmark_grid() {
        let svm = KernelSvm::new();
        assert_eq!(svm.landmarks().len(), 15);
        assert_eq!(svm.landmarks()[0], 0.0);
        assert_eq!(svm.landmarks()[14], 1.0);
        assert_eq!(evenly_spaced(1), vec![0.5]);
    }

    #[test]
    fn test_unfitted_is_neutral() {
        let svm = KernelSvm::new();
        assert_eq!(svm.decision_function(0.3), 0.0);
        assert_eq!(svm.predict(0.3), 0.5);
    }

    #[test]
    fn test_learns_a_threshold() {
        let samples = split_at_half(40);
        let mut svm = KernelSvm::new().with_seed(42);
        svm.fit(&samples).unwrap();

        assert!(svm.predict(0.05) < 0.5);
        assert!(svm.predict(0.95) > 0.5);
        let accuracy = svm.score(&samples).unwrap();
        assert!(accuracy.as_classification().unwrap().accuracy() >= 0.9);
    }

    #[test]
    fn test_predictions_are_probabilities() {
        let samples = split_at_half(30);
        let mut svm = KernelSvm::new().with_seed(5);
        svm.fit(&samples).unwrap();

        for i in 0..=20 {
            let p = svm.predict(i as f64 / 20.0);
            assert!(p > 0.0 && p < 1.0);
        }
    }

    #[test]
    fn test_seeded_fits_are_reproducible() {
        let samples = split_at_half(20);
        let mut a = KernelSvm::new().with_seed(9).with_iterations(500);
        let mut b = KernelSvm::new().with_seed(9).with_iterations(500);
        a.fit(&samples).unwrap();
        b.fit(&samples).unwrap();

        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.bias(), b.bias());
    }

    #[test]
    fn test_fit_with_external_rng() {
        let samples = split_at_half(20);
        let mut svm = KernelSvm::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        svm.fit_with_rng(&samples, &mut rng).unwrap();

        assert!(svm.weights().iter().any(|&w| w != 0.0));
    }

    #[test]
    fn test_invalid_input() {
        let mut svm = KernelSvm::new();
        assert!(matches!(svm.fit(&[]), Err(FitError::EmptyDataset)));
        assert!(matches!(
            svm.fit(&[Sample::new(0.1, 0.1)]),
            Err(FitError::MissingLabel { index: 0 })
        ));
    }
}
