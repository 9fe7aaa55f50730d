//! One-dimensional Gaussian naive Bayes

use crate::core::{collect_labels, ensure_not_empty, Label, Model, Result, Sample, Task};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Added to every class variance before taking the square root
pub const VARIANCE_SMOOTHING: f64 = 0.002;

/// Per-class Gaussian statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    pub mean: f64,
    pub std_dev: f64,
    pub prior: f64,
}

impl ClassStats {
    /// Stats used when a class has fewer than two samples
    pub fn fallback(label: Label) -> Self {
        Self {
            mean: match label {
                Label::Negative => 0.3,
                Label::Positive => 0.7,
            },
            std_dev: 0.15,
            prior: 0.5,
        }
    }

    /// Gaussian density at `x` weighted by the prior
    pub fn weighted_density(&self, x: f64) -> f64 {
        let exponent = (-(x - self.mean).powi(2) / (2.0 * self.std_dev * self.std_dev)).exp();
        self.prior * exponent / ((2.0 * PI).sqrt() * self.std_dev)
    }
}

/// Gaussian naive Bayes over the normalized x coordinate
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier {
    negative: ClassStats,
    positive: ClassStats,
}

impl NaiveBayesClassifier {
    pub fn new() -> Self {
        Self {
            negative: ClassStats::fallback(Label::Negative),
            positive: ClassStats::fallback(Label::Positive),
        }
    }

    pub fn stats(&self, label: Label) -> ClassStats {
        match label {
            Label::Negative => self.negative,
            Label::Positive => self.positive,
        }
    }

    fn class_stats(xs: &[f64], total: usize, label: Label) -> ClassStats {
        if xs.len() < 2 {
            warn!(
                "Naive Bayes: only {} samples of class {}, using default statistics",
                xs.len(),
                u8::from(label)
            );
            return ClassStats::fallback(label);
        }

        let n = xs.len() as f64;
        let mean = xs.iter().sum::<f64>() / n;
        let variance = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        ClassStats {
            mean,
            std_dev: (variance + VARIANCE_SMOOTHING).sqrt(),
            prior: n / total as f64,
        }
    }
}

impl Default for NaiveBayesClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for NaiveBayesClassifier {
    fn name(&self) -> &'static str {
        "Naive Bayes"
    }

    fn task(&self) -> Task {
        Task::Classification
    }

    fn fit(&mut self, samples: &[Sample]) -> Result<()> {
        ensure_not_empty(samples)?;
        let labels = collect_labels(samples)?;

        let xs_of = |wanted: Label| -> Vec<f64> {
            samples
                .iter()
                .zip(&labels)
                .filter(|(_, &label)| label == wanted)
                .map(|(s, _)| s.x)
                .collect()
        };

        self.negative = Self::class_stats(&xs_of(Label::Negative), samples.len(), Label::Negative);
        self.positive = Self::class_stats(&xs_of(Label::Positive), samples.len(), Label::Positive);

        debug!(
            "Naive Bayes: class 0 {:?}, class 1 {:?}",
            self.negative, self.positive
        );
        Ok(())
    }

    fn predict(&self, x: f64) -> f64 {
        let p0 = self.negative.weighted_density(x);
        let p1 = self.positive.weighted_density(x);
        let total = p0 + p1;
        if total == 0.0 {
            0.5
        } else {
            p1 / total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FitError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_class_statistics() {
        let samples = vec![
            Sample::labeled(0.1, 0.5, Label::Negative),
            Sample::labeled(0.3, 0.5, Label::Negative),
            Sample::labeled(0.7, 0.5, Label::Positive),
            Sample::labeled(0.8, 0.5, Label::Positive),
            Sample::labeled(0.9, 0.5, Label::Positive),
        ];
        let mut model = NaiveBayesClassifier::new();
        model.fit(&samples).unwrap();

        let neg = model.stats(Label::Negative);
        assert_abs_diff_eq!(neg.mean, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(neg.std_dev, (0.01_f64 + VARIANCE_SMOOTHING).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(neg.prior, 0.4, epsilon = 1e-12);

        let pos = model.stats(Label::Positive);
        assert_abs_diff_eq!(pos.mean, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(pos.prior, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_separates_classes() {
        let samples: Vec<Sample> = (0..20)
            .map(|i| {
                let x = i as f64 / 19.0;
                let label = if x > 0.5 { Label::Positive } else { Label::Negative };
                Sample::labeled(x, 0.5, label)
            })
            .collect();
        let mut model = NaiveBayesClassifier::new();
        model.fit(&samples).unwrap();

        assert!(model.predict(0.05) < 0.1);
        assert!(model.predict(0.95) > 0.9);
        assert_eq!(model.classify(0.9), Label::Positive);
    }

    #[test]
    fn test_sparse_class_uses_fallback() {
        let samples = vec![
            Sample::labeled(0.1, 0.5, Label::Negative),
            Sample::labeled(0.2, 0.5, Label::Negative),
            Sample::labeled(0.9, 0.5, Label::Positive),
        ];
        let mut model = NaiveBayesClassifier::new();
        model.fit(&samples).unwrap();

        assert_eq!(model.stats(Label::Positive), ClassStats::fallback(Label::Positive));
        assert!(model.predict(0.9) > 0.5);
    }

    #[test]
    fn test_underflow_is_maximally_uncertain() {
        let mut model = NaiveBayesClassifier::new();
        model
            .fit(&[
                Sample::labeled(0.10, 0.5, Label::Negative),
                Sample::labeled(0.11, 0.5, Label::Negative),
                Sample::labeled(0.20, 0.5, Label::Positive),
                Sample::labeled(0.21, 0.5, Label::Positive),
            ])
            .unwrap();

        // Far enough away that both densities underflow to zero
        assert_eq!(model.predict(1.0e3), 0.5);
    }

    #[test]
    fn test_requires_labels() {
        let mut model = NaiveBayesClassifier::new();
        assert!(matches!(model.fit(&[]), Err(FitError::EmptyDataset)));
        assert!(matches!(
            model.fit(&[Sample::new(0.5, 0.5)]),
            Err(FitError::MissingLabel { index: 0 })
        ));
    }
}
