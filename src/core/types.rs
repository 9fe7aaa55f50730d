//! Core type definitions for points, samples and labels

use crate::core::{FitError, Result};
use serde::{Deserialize, Serialize};

/// Binary class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    /// Hard label for a class-1 probability, thresholded at 0.5
    ///
    /// A probability of exactly 0.5 is treated as the negative class.
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.5 {
            Label::Positive
        } else {
            Label::Negative
        }
    }

    /// Numeric value of the label (0.0 or 1.0)
    pub fn value(self) -> f64 {
        match self {
            Label::Negative => 0.0,
            Label::Positive => 1.0,
        }
    }

    /// Signed value of the label (-1.0 or +1.0), as used by margin classifiers
    pub fn sign(self) -> f64 {
        match self {
            Label::Negative => -1.0,
            Label::Positive => 1.0,
        }
    }

    /// Parse a numeric label, accepting only 0 and 1
    pub fn from_value(value: f64) -> Result<Self> {
        if value == 0.0 {
            Ok(Label::Negative)
        } else if value == 1.0 {
            Ok(Label::Positive)
        } else {
            Err(FitError::InvalidLabel(value))
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Label::Negative => Label::Positive,
            Label::Positive => Label::Negative,
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        match label {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }
}

impl TryFrom<u8> for Label {
    type Error = FitError;

    fn try_from(value: u8) -> Result<Self> {
        Label::from_value(value as f64)
    }
}

/// A point in display coordinates, as produced by a generator or loaded from disk
///
/// Models never see these directly; see [`crate::utils::scaling::Normalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, label: None }
    }

    pub fn labeled(x: f64, y: f64, label: Label) -> Self {
        Self {
            x,
            y,
            label: Some(label),
        }
    }
}

/// A training sample in normalized model space (`x` and `y` in `[0, 1]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

impl Sample {
    /// Create an unlabeled regression sample
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, label: None }
    }

    /// Create a labeled classification sample
    pub fn labeled(x: f64, y: f64, label: Label) -> Self {
        Self {
            x,
            y,
            label: Some(label),
        }
    }
}

/// Whether a model produces a curve value or a class-1 probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Regression,
    Classification,
}

/// Fail with [`FitError::EmptyDataset`] when there is nothing to learn from
pub fn ensure_not_empty(samples: &[Sample]) -> Result<()> {
    if samples.is_empty() {
        Err(FitError::EmptyDataset)
    } else {
        Ok(())
    }
}

/// Collect the labels of a classification dataset
///
/// Every sample must carry a label; the first unlabeled sample is reported.
pub fn collect_labels(samples: &[Sample]) -> Result<Vec<Label>> {
    samples
        .iter()
        .enumerate()
        .map(|(index, s)| s.label.ok_or(FitError::MissingLabel { index }))
        .collect()
}

/// Arithmetic mean, 0.0 for an empty iterator
pub(crate) fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Sum of squared deviations from the mean
pub(crate) fn sum_squared_deviation(values: &[f64]) -> f64 {
    let m = mean(values.iter().copied());
    values.iter().map(|v| (v - m).powi(2)).sum()
}
