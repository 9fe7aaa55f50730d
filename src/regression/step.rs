//! Step function fitted by exhaustive threshold search

use crate::core::{ensure_not_empty, mean, Model, Result, Sample, Task};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Threshold sweep bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    /// First candidate threshold (inclusive)
    pub start: f64,
    /// Sweep stops before reaching this value
    pub end: f64,
    pub step: f64,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            start: 0.1,
            end: 0.9,
            step: 0.02,
        }
    }
}

/// Fitted step: `left` below the threshold, `right` at or above it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepParams {
    pub threshold: f64,
    pub left: f64,
    pub right: f64,
    /// Total squared error on the training set
    pub error: f64,
}

/// `y = (x < threshold) ? left : right`
#[derive(Debug, Clone)]
pub struct StepRegressor {
    config: StepConfig,
    params: StepParams,
}

impl StepRegressor {
    pub fn new() -> Self {
        Self::with_config(StepConfig::default())
    }

    /// # Panics
    /// Panics if the sweep is empty or its step is not positive
    pub fn with_config(config: StepConfig) -> Self {
        assert!(
            config.step > 0.0 && config.start < config.end,
            "Invalid threshold sweep: {config:?}"
        );
        Self {
            config,
            params: StepParams {
                threshold: 0.5,
                left: 0.0,
                right: 0.0,
                error: f64::INFINITY,
            },
        }
    }

    pub fn params(&self) -> StepParams {
        self.params
    }

    /// Every threshold the sweep tries, in order
    pub fn candidate_thresholds(&self) -> Vec<f64> {
        let StepConfig { start, end, step } = self.config;
        (0..)
            .map(|i| start + i as f64 * step)
            .take_while(|&t| t < end - 1e-12)
            .collect()
    }

    /// Means of both sides and total squared error for one threshold
    ///
    /// Returns `None` when either side is empty.
    pub fn split_error(samples: &[Sample], threshold: f64) -> Option<StepParams> {
        let (left, right): (Vec<&Sample>, Vec<&Sample>) =
            samples.iter().partition(|s| s.x < threshold);
        if left.is_empty() || right.is_empty() {
            return None;
        }

        let left_mean = mean(left.iter().map(|s| s.y));
        let right_mean = mean(right.iter().map(|s| s.y));
        let error = left.iter().map(|s| (s.y - left_mean).powi(2)).sum::<f64>()
            + right.iter().map(|s| (s.y - right_mean).powi(2)).sum::<f64>();

        Some(StepParams {
            threshold,
            left: left_mean,
            right: right_mean,
            error,
        })
    }
}

impl Default for StepRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for StepRegressor {
    fn name(&self) -> &'static str {
        "Step"
    }

    fn task(&self) -> Task {
        Task::Regression
    }

    fn fit(&mut self, samples: &[Sample]) -> Result<()> {
        ensure_not_empty(samples)?;

        let best = self
            .candidate_thresholds()
            .into_iter()
            .filter_map(|t| Self::split_error(samples, t))
            .fold(None, |best: Option<StepParams>, candidate| match best {
                Some(b) if b.error <= candidate.error => Some(b),
                _ => Some(candidate),
            });

        self.params = match best {
            Some(params) => params,
            None => {
                // Every candidate left one side empty: flat line at the global mean
                let global = mean(samples.iter().map(|s| s.y));
                warn!("Step: no valid threshold, falling back to the global mean {global:.4}");
                StepParams {
                    threshold: 0.5,
                    left: global,
                    right: global,
                    error: samples.iter().map(|s| (s.y - global).powi(2)).sum(),
                }
            }
        };

        debug!("Step: {:?}", self.params);
        Ok(())
    }

    fn predict(&self, x: f64) -> f64 {
        if x < self.params.threshold {
            self.params.left
        } else {
            self.params.right
        }
    }
}
