//! Core traits for models and datasets

use crate::core::{Label, Result, Sample, Task};
use crate::metrics::{self, Metrics};

/// Dataset abstraction yielding normalized samples
pub trait Dataset {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Get a single normalized sample by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn get_sample(&self, i: usize) -> Sample;

    /// All samples in order
    fn samples(&self) -> Vec<Sample> {
        (0..self.len()).map(|i| self.get_sample(i)).collect()
    }

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Dataset for [Sample] {
    fn len(&self) -> usize {
        <[Sample]>::len(self)
    }

    fn get_sample(&self, i: usize) -> Sample {
        self[i]
    }
}

impl Dataset for Vec<Sample> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get_sample(&self, i: usize) -> Sample {
        self[i]
    }
}

/// Uniform fit/predict/score contract implemented by every model family
///
/// All inputs are in normalized space. `fit` replaces the previous fitted
/// state wholesale; `predict` and `score` only read it.
pub trait Model: Send + Sync {
    /// Display name of the model
    fn name(&self) -> &'static str;

    /// Regression curve or classification probability
    fn task(&self) -> Task;

    /// Fit the model to the samples
    ///
    /// Fails with `EmptyDataset` on an empty slice, leaving the model as it was.
    fn fit(&mut self, samples: &[Sample]) -> Result<()>;

    /// Predict a curve value (regression) or class-1 probability (classification)
    fn predict(&self, x: f64) -> f64;

    /// Predict a batch of inputs
    fn predict_batch(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.predict(x)).collect()
    }

    /// Hard class decision derived from `predict`
    fn classify(&self, x: f64) -> Label {
        Label::from_probability(self.predict(x))
    }

    /// Goodness-of-fit metrics over the samples, calling `predict` once per sample
    fn score(&self, samples: &[Sample]) -> Result<Metrics> {
        metrics::evaluate(self.task(), samples, |x| self.predict(x))
    }
}
