//! Bagged forest of classification trees
//!
//! Each tree trains on its own bootstrap resample of the training set and the
//! forest averages the trees' class-1 fractions (soft voting).

use crate::core::{collect_labels, ensure_not_empty, Model, Result, Sample, Task};
use crate::tree::{ClassificationTree, DEFAULT_MAX_DEPTH};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Forest configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum depth per tree
    pub max_depth: usize,
    /// Train each tree on a resample drawn with replacement; otherwise on the full set
    pub bootstrap: bool,
    /// Seed for the bootstrap draws
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 12,
            max_depth: DEFAULT_MAX_DEPTH,
            bootstrap: true,
            seed: None,
        }
    }
}

/// Ensemble of independently trained classification trees
#[derive(Debug, Clone)]
pub struct DecisionForest {
    config: ForestConfig,
    trees: Vec<ClassificationTree>,
}

impl DecisionForest {
    pub fn new() -> Self {
        Self::with_config(ForestConfig::default())
    }

    /// # Panics
    /// Panics if the forest would have no trees
    pub fn with_config(config: ForestConfig) -> Self {
        assert!(config.n_trees > 0, "Forest needs at least one tree");
        Self {
            config,
            trees: Vec::new(),
        }
    }

    /// Set the number of trees
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        assert!(n_trees > 0, "Forest needs at least one tree");
        self.config.n_trees = n_trees;
        self
    }

    /// Set maximum depth per tree
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Enable or disable bootstrap resampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.config.bootstrap = bootstrap;
        self
    }

    /// Fix the seed of the bootstrap draws
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[ClassificationTree] {
        &self.trees
    }

    /// Fit with a caller-provided random source
    pub fn fit_with_rng<R: Rng>(&mut self, samples: &[Sample], rng: &mut R) -> Result<()> {
        ensure_not_empty(samples)?;
        collect_labels(samples)?;

        let n = samples.len();
        let mut trees = Vec::with_capacity(self.config.n_trees);
        for _ in 0..self.config.n_trees {
            let mut tree = ClassificationTree::new().with_max_depth(self.config.max_depth);
            if self.config.bootstrap {
                let resample: Vec<Sample> =
                    (0..n).map(|_| samples[rng.gen_range(0..n)]).collect();
                tree.fit(&resample)?;
            } else {
                tree.fit(samples)?;
            }
            trees.push(tree);
        }

        debug!(
            "Decision Forest: trained {} trees (bootstrap: {})",
            trees.len(),
            self.config.bootstrap
        );
        self.trees = trees;
        Ok(())
    }
}

impl Default for DecisionForest {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for DecisionForest {
    fn name(&self) -> &'static str {
        "Decision Forest"
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
        if self.trees.is_empty() {
            return 0.5;
        }
        self.trees.iter().map(|t| t.predict(x)).sum::<f64>() / self.trees.len() as f64
    }
}
