//! Synthetic point generation per model family
//!
//! Regression families sample a known ground-truth curve with uniform noise
//! and occasional uniform outliers. Classifiers get either a single split at
//! `x = 0.5` or a positive band in the middle, with jittered inputs and
//! randomly flipped labels.

use crate::api::ModelFamily;
use crate::core::{FitError, Label, Result, Sample};
use crate::data::PointSet;
use crate::utils::Normalizer;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Probability that a classification round uses the band layout
const BAND_PROBABILITY: f64 = 0.6;

/// Generator configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Points per round
    pub n_points: usize,
    /// Noise amplitude in `[0, 1]`
    pub spread: f64,
    /// Probability in `[0, 1]` of an outlier (regression) or flipped label (classification)
    pub outlier_rate: f64,
    /// Seed for reproducible rounds
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_points: 100,
            spread: 0.2,
            outlier_rate: 0.05,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Check the ranges `Generator::with_config` asserts on
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.spread) {
            return Err(FitError::InvalidParameter(format!(
                "Spread must be between 0 and 1, got: {}",
                self.spread
            )));
        }
        if !(0.0..=1.0).contains(&self.outlier_rate) {
            return Err(FitError::InvalidParameter(format!(
                "Outlier rate must be between 0 and 1, got: {}",
                self.outlier_rate
            )));
        }
        Ok(())
    }
}

/// Layout of a classification round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassLayout {
    /// Label 1 iff `x > 0.5`
    Split,
    /// Label 1 iff `0.4 < x < 0.6`
    Band,
}

impl ClassLayout {
    pub fn label(self, x: f64) -> Label {
        let positive = match self {
            ClassLayout::Split => x > 0.5,
            ClassLayout::Band => x > 0.4 && x < 0.6,
        };
        if positive {
            Label::Positive
        } else {
            Label::Negative
        }
    }
}

/// Noise-free target curve used to generate regression points
///
/// Classifier families have no curve and return `None`.
pub fn ground_truth(family: ModelFamily, x: f64) -> Option<f64> {
    let y = match family {
        ModelFamily::Linear => 0.5 * x + 0.2,
        ModelFamily::Polynomial => 2.5 * (x - 0.5).powi(2) + 0.2,
        ModelFamily::Exponential => 0.15 * (1.8 * x).exp() + 0.1,
        ModelFamily::Logarithmic => 0.5 + 0.2 * (x + 0.01).ln(),
        ModelFamily::Periodic => 0.2 * (10.0 * x).sin() + 0.5,
        ModelFamily::Step => {
            if x < 0.5 {
                0.2
            } else {
                0.8
            }
        }
        ModelFamily::Logistic => 1.0 / (1.0 + (-(x - 0.5) * 10.0).exp()),
        ModelFamily::TreeRegressor => 0.4 * (5.0 * x).sin() + 0.5,
        ModelFamily::NaiveBayes
        | ModelFamily::Knn
        | ModelFamily::Svm
        | ModelFamily::Forest => return None,
    };
    Some(y)
}

/// Synthetic point generator
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    normalizer: Normalizer,
    rng: ChaCha8Rng,
}

impl Generator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// # Panics
    /// Panics if spread or outlier rate fall outside `[0, 1]`
    pub fn with_config(config: GeneratorConfig) -> Self {
        assert!(
            (0.0..=1.0).contains(&config.spread),
            "Spread must be in [0, 1], got: {}",
            config.spread
        );
        assert!(
            (0.0..=1.0).contains(&config.outlier_rate),
            "Outlier rate must be in [0, 1], got: {}",
            config.outlier_rate
        );
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            normalizer: Normalizer::default(),
            rng,
        }
    }

    /// Use a non-default display space
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one round of points for the family
    ///
    /// Successive calls on the same generator continue the same random stream.
    pub fn generate(&mut self, family: ModelFamily) -> PointSet {
        let samples = if family.is_classifier() {
            let layout = if self.rng.gen::<f64>() < BAND_PROBABILITY {
                ClassLayout::Band
            } else {
                ClassLayout::Split
            };
            debug!("Generating {} points with {:?} layout", self.config.n_points, layout);
            self.classification_samples(layout)
        } else {
            self.regression_samples(family)
        };

        self.to_point_set(samples)
    }

    /// Generate a classification round with an explicit layout
    pub fn generate_classification(&mut self, layout: ClassLayout) -> PointSet {
        let samples = self.classification_samples(layout);
        self.to_point_set(samples)
    }

    /// Clamp to the unit square and map back to display space
    fn to_point_set(&self, samples: Vec<Sample>) -> PointSet {
        let clamped: Vec<Sample> = samples
            .into_iter()
            .map(|s| Sample {
                x: s.x.clamp(0.0, 1.0),
                y: s.y.clamp(0.0, 1.0),
                label: s.label,
            })
            .collect();
        PointSet::with_normalizer(self.normalizer.denormalize_all(&clamped), self.normalizer)
    }

    fn regression_samples(&mut self, family: ModelFamily) -> Vec<Sample> {
        let GeneratorConfig {
            n_points,
            spread,
            outlier_rate,
            ..
        } = self.config;
        (0..n_points)
            .map(|_| {
                let x: f64 = self.rng.gen();
                let mut y = ground_truth(family, x).unwrap_or(0.5);
                if self.rng.gen::<f64>() < outlier_rate {
                    y = self.rng.gen();
                } else {
                    y += (self.rng.gen::<f64>() - 0.5) * spread;
                }
                Sample::new(x, y)
            })
            .collect()
    }

    fn classification_samples(&mut self, layout: ClassLayout) -> Vec<Sample> {
        let GeneratorConfig {
            n_points,
            spread,
            outlier_rate,
            ..
        } = self.config;
        (0..n_points)
            .map(|_| {
                let x: f64 = self.rng.gen();
                let mut label = layout.label(x);
                let x = x + (self.rng.gen::<f64>() - 0.5) * spread * 0.5;
                if self.rng.gen::<f64>() < outlier_rate {
                    label = label.flipped();
                }
                let y = 0.3 + self.rng.gen::<f64>() * 0.4;
                Sample::labeled(x, y, label)
            })
            .collect()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
