//! Goodness-of-fit metrics
//!
//! Regression fits are scored with MSE, MAE and R²; classifiers are scored by
//! thresholding the predicted class-1 probability at 0.5 and counting the
//! confusion matrix. Every ratio with a zero denominator is reported as 0.

use crate::core::{collect_labels, ensure_not_empty, Label, Result, Sample, Task};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for either task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "lowercase")]
pub enum Metrics {
    Regression(RegressionMetrics),
    Classification(ClassificationMetrics),
}

impl Metrics {
    /// The three headline values as display strings
    pub fn summary(&self) -> [String; 3] {
        match self {
            Metrics::Regression(m) => [
                format!("MSE: {:.5}", m.mse),
                format!("MAE: {:.5}", m.mae),
                format!("R²: {:.3}", m.r2),
            ],
            Metrics::Classification(m) => [
                format!("ACC: {:.1}%", m.accuracy() * 100.0),
                format!("PREC: {:.2}", m.precision()),
                format!("REC: {:.2}", m.recall()),
            ],
        }
    }

    pub fn as_regression(&self) -> Option<&RegressionMetrics> {
        match self {
            Metrics::Regression(m) => Some(m),
            Metrics::Classification(_) => None,
        }
    }

    pub fn as_classification(&self) -> Option<&ClassificationMetrics> {
        match self {
            Metrics::Classification(m) => Some(m),
            Metrics::Regression(_) => None,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [m1, m2, m3] = self.summary();
        write!(f, "{m1}  {m2}  {m3}")
    }
}

/// Regression metrics over normalized space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean squared error
    pub mse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Coefficient of determination, 0 when the targets have no variance
    pub r2: f64,
}

/// Confusion counts of a thresholded classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ClassificationMetrics {
    pub fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Record one (predicted, actual) pair
    pub fn record(&mut self, predicted: Label, actual: Label) {
        match (predicted, actual) {
            (Label::Positive, Label::Positive) => self.true_positives += 1,
            (Label::Negative, Label::Negative) => self.true_negatives += 1,
            (Label::Positive, Label::Negative) => self.false_positives += 1,
            (Label::Negative, Label::Positive) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Calculate accuracy: (TP + TN) / N
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(
            self.true_negatives,
            self.true_negatives + self.false_positives,
        )
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Score `predict` against the samples for the given task
pub fn evaluate<F>(task: Task, samples: &[Sample], predict: F) -> Result<Metrics>
where
    F: Fn(f64) -> f64,
{
    match task {
        Task::Regression => regression(samples, predict).map(Metrics::Regression),
        Task::Classification => classification(samples, predict).map(Metrics::Classification),
    }
}

/// MSE, MAE and R² of `predict` against each sample's `y`
pub fn regression<F>(samples: &[Sample], predict: F) -> Result<RegressionMetrics>
where
    F: Fn(f64) -> f64,
{
    ensure_not_empty(samples)?;
    let n = samples.len() as f64;
    let y_mean = samples.iter().map(|s| s.y).sum::<f64>() / n;

    let (mut sse, mut sae, mut sst) = (0.0, 0.0, 0.0);
    for sample in samples {
        let residual = predict(sample.x) - sample.y;
        sse += residual * residual;
        sae += residual.abs();
        sst += (sample.y - y_mean).powi(2);
    }

    let r2 = if sst == 0.0 { 0.0 } else { 1.0 - sse / sst };

    Ok(RegressionMetrics {
        mse: sse / n,
        mae: sae / n,
        r2,
    })
}

/// Confusion counts of `predict` thresholded at 0.5 against each sample's label
pub fn classification<F>(samples: &[Sample], predict: F) -> Result<ClassificationMetrics>
where
    F: Fn(f64) -> f64,
{
    ensure_not_empty(samples)?;
    let labels = collect_labels(samples)?;

    let mut metrics = ClassificationMetrics::default();
    for (sample, actual) in samples.iter().zip(labels) {
        metrics.record(Label::from_probability(predict(sample.x)), actual);
    }
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FitError;
    use approx::assert_relative_eq;

    #[test]
    fn test_regression_perfect_fit() {
        let samples = vec![Sample::new(0.0, 0.0), Sample::new(0.5, 0.5), Sample::new(1.0, 1.0)];
        let m = regression(&samples, |x| x).unwrap();

        assert_eq!(m.mse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_regression_known_values() {
        let samples = vec![Sample::new(0.0, 0.0), Sample::new(1.0, 1.0)];
        // Constant prediction at the mean: residuals are ±0.5
        let m = regression(&samples, |_| 0.5).unwrap();

        assert_relative_eq!(m.mse, 0.25);
        assert_relative_eq!(m.mae, 0.5);
        assert_relative_eq!(m.r2, 0.0);
    }

    #[test]
    fn test_r2_zero_variance_targets() {
        let samples = vec![Sample::new(0.1, 0.4), Sample::new(0.5, 0.4), Sample::new(0.9, 0.4)];
        let m = regression(&samples, |x| x).unwrap();

        assert_eq!(m.r2, 0.0);
        assert!(m.mse > 0.0);
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        assert!(matches!(regression(&[], |x| x), Err(FitError::EmptyDataset)));
        assert!(matches!(
            classification(&[], |x| x),
            Err(FitError::EmptyDataset)
        ));
    }

    #[test]
    fn test_classification_counts() {
        let samples = vec![
            Sample::labeled(0.9, 0.5, Label::Positive), // TP
            Sample::labeled(0.8, 0.5, Label::Negative), // FP
            Sample::labeled(0.1, 0.5, Label::Positive), // FN
            Sample::labeled(0.2, 0.5, Label::Negative), // TN
            Sample::labeled(0.3, 0.5, Label::Negative), // TN
        ];
        let m = classification(&samples, |x| x).unwrap();

        assert_eq!(m, ClassificationMetrics::new(1, 2, 1, 1));
        assert_relative_eq!(m.accuracy(), 0.6);
        assert_relative_eq!(m.precision(), 0.5);
        assert_relative_eq!(m.recall(), 0.5);
        assert_relative_eq!(m.specificity(), 2.0 / 3.0);
    }

    #[test]
    fn test_classification_zero_denominators() {
        let samples = vec![
            Sample::labeled(0.2, 0.5, Label::Negative),
            Sample::labeled(0.4, 0.5, Label::Negative),
        ];
        // Never predicts positive and there are no positives
        let m = classification(&samples, |_| 0.0).unwrap();

        assert_eq!(m.precision(), 0.0);
        assert_eq!(m.recall(), 0.0);
        assert_eq!(m.f1_score(), 0.0);
        assert_eq!(m.accuracy(), 1.0);
    }

    #[test]
    fn test_classification_requires_labels() {
        let samples = vec![Sample::new(0.2, 0.5)];
        assert!(matches!(
            classification(&samples, |x| x),
            Err(FitError::MissingLabel { index: 0 })
        ));
    }

    #[test]
    fn test_summary_strings() {
        let m = Metrics::Regression(RegressionMetrics {
            mse: 0.001234,
            mae: 0.02,
            r2: 0.9876,
        });
        assert_eq!(
            m.summary(),
            ["MSE: 0.00123".to_string(), "MAE: 0.02000".to_string(), "R²: 0.988".to_string()]
        );

        let m = Metrics::Classification(ClassificationMetrics::new(3, 1, 1, 0));
        assert_eq!(
            m.summary(),
            ["ACC: 80.0%".to_string(), "PREC: 0.75".to_string(), "REC: 1.00".to_string()]
        );
    }
}
