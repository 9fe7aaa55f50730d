//! K-nearest-neighbours classifier
//!
//! A lazy learner: `fit` only stores the labeled inputs and every prediction
//! ranks all of them by distance along x.

use crate::core::{collect_labels, ensure_not_empty, Label, Model, Result, Sample, Task};
use serde::{Deserialize, Serialize};

/// How neighbour labels are turned into a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Voting {
    /// Fraction of neighbours labeled 1
    #[default]
    Fraction,
    /// 1 or 0 by majority, 0.5 on a tie
    Majority,
}

/// KNN configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnnConfig {
    /// Number of neighbours
    pub k: usize,
    pub voting: Voting,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            k: 5,
            voting: Voting::default(),
        }
    }
}

/// K-nearest-neighbours over the normalized x coordinate
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    config: KnnConfig,
    data: Vec<(f64, Label)>,
}

impl KnnClassifier {
    /// # Panics
    /// Panics if k is 0
    pub fn new(k: usize) -> Self {
        Self::with_config(KnnConfig {
            k,
            ..KnnConfig::default()
        })
    }

    /// # Panics
    /// Panics if k is 0
    pub fn with_config(config: KnnConfig) -> Self {
        assert!(config.k > 0, "k must be positive");
        Self {
            config,
            data: Vec::new(),
        }
    }

    /// Set the voting rule
    pub fn with_voting(mut self, voting: Voting) -> Self {
        self.config.voting = voting;
        self
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Number of stored training samples
    pub fn n_stored(&self) -> usize {
        self.data.len()
    }

    /// Labels of the `k` stored samples closest to `x`, nearest first
    pub fn neighbours(&self, x: f64) -> Vec<Label> {
        let mut ranked: Vec<(f64, Label)> = self
            .data
            .iter()
            .map(|&(xi, label)| ((x - xi).abs(), label))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked
            .into_iter()
            .take(self.config.k)
            .map(|(_, label)| label)
            .collect()
    }
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::with_config(KnnConfig::default())
    }
}

impl Model for KnnClassifier {
    fn name(&self) -> &'static str {
        "KNN"
    }

    fn task(&self) -> Task {
        Task::Classification
    }

    fn fit(&mut self, samples: &[Sample]) -> Result<()> {
        ensure_not_empty(samples)?;
        let labels = collect_labels(samples)?;
        self.data = samples.iter().map(|s| s.x).zip(labels).collect();
        Ok(())
    }

    fn predict(&self, x: f64) -> f64 {
        let neighbours = self.neighbours(x);
        if neighbours.is_empty() {
            return 0.5;
        }

        let positives = neighbours.iter().filter(|&&l| l == Label::Positive).count();
        let negatives = neighbours.len() - positives;
        match self.config.voting {
            Voting::Fraction => positives as f64 / neighbours.len() as f64,
            Voting::Majority if positives > negatives => 1.0,
            Voting::Majority if positives < negatives => 0.0,
            Voting::Majority => 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FitError;
    use approx::assert_abs_diff_eq;

    fn line(labels: &[u8]) -> Vec<Sample> {
        labels
            .iter()
            .enumerate()
            .map(|(i, &l)| {
                let label = if l == 1 { Label::Positive } else { Label::Negative };
                Sample::labeled(i as f64 / (labels.len() - 1) as f64, 0.5, label)
            })
            .collect()
    }

    #[test]
    fn test_k_equal_to_n_gives_class_frequency() {
        let samples = line(&[1, 0, 0, 1, 1, 0, 1, 1]);
        let mut model = KnnClassifier::new(samples.len());
        model.fit(&samples).unwrap();

        for x in [0.0, 0.3, 0.77, 1.0] {
            assert_abs_diff_eq!(model.predict(x), 5.0 / 8.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_local_fraction() {
        let samples = line(&[0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
        let mut model = KnnClassifier::new(3);
        model.fit(&samples).unwrap();

        assert_eq!(model.predict(0.0), 0.0);
        assert_eq!(model.predict(1.0), 1.0);
        assert_eq!(model.neighbours(1.0).len(), 3);
    }

    #[test]
    fn test_k_larger_than_dataset_uses_everything() {
        let samples = line(&[1, 0]);
        let mut model = KnnClassifier::new(5);
        model.fit(&samples).unwrap();

        assert_eq!(model.predict(0.0), 0.5);
    }

    #[test]
    fn test_majority_voting() {
        let samples = line(&[0, 1, 1, 0, 0]);
        let mut model = KnnClassifier::new(3).with_voting(Voting::Majority);
        model.fit(&samples).unwrap();

        // Neighbours of 0.3 are x=0.25, 0.5, 0.0 -> labels 1, 1, 0
        assert_eq!(model.predict(0.3), 1.0);
        // Neighbours of 0.9 are x=1.0, 0.75, 0.5 -> labels 0, 0, 1
        assert_eq!(model.predict(0.9), 0.0);

        let mut tied = KnnClassifier::new(2).with_voting(Voting::Majority);
        tied.fit(&line(&[0, 1])).unwrap();
        assert_eq!(tied.predict(0.5), 0.5);
    }

    #[test]
    fn test_unfitted_is_neutral() {
        let model = KnnClassifier::default();
        assert_eq!(model.k(), 5);
        assert_eq!(model.n_stored(), 0);
        assert_eq!(model.predict(0.4), 0.5);
    }

    #[test]
    fn test_invalid_input() {
        let mut model = KnnClassifier::default();
        assert!(matches!(model.fit(&[]), Err(FitError::EmptyDataset)));
        assert!(matches!(
            model.fit(&[Sample::new(0.1, 0.1)]),
            Err(FitError::MissingLabel { index: 0 })
        ));
    }

    #[test]
    #[should_panic(expected = "k must be positive")]
    fn test_rejects_zero_k() {
        KnnClassifier::new(0);
    }
}
