//! High-level API for running the model catalogue
//!
//! This module ties the estimators, the point generator and the metrics
//! together: pick a [`ModelFamily`], build it from [`ModelOptions`], and run
//! an [`Experiment`] that generates (or loads) points, fits, scores and
//! samples the fitted model for drawing.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fitlab::api::{Experiment, ModelFamily};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = Experiment::new(ModelFamily::Periodic)
//!     .with_spread(0.1)
//!     .with_seed(42)
//!     .run()?;
//!
//! println!("{}", report.metrics);
//! # Ok(())
//! # }
//! ```

use crate::classification::{
    KernelSvm, KnnClassifier, KnnConfig, NaiveBayesClassifier, SvmConfig, Voting,
};
use crate::core::{Dataset, FitError, Model, Point, Result, Task};
use crate::data::{Generator, GeneratorConfig, PointSet};
use crate::metrics::Metrics;
use crate::regression::{CurveFamily, GradientRegressor, RegressionTree, StepRegressor};
use crate::tree::{DecisionForest, ForestConfig, DEFAULT_MAX_DEPTH};
use crate::utils::sampling;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of curve samples, one every 2 display units across 600
pub const DEFAULT_RESOLUTION: usize = 301;

/// The model families of the sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFamily {
    Linear,
    Polynomial,
    Exponential,
    Logarithmic,
    Periodic,
    Logistic,
    Step,
    NaiveBayes,
    Knn,
    Svm,
    Forest,
    TreeRegressor,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 12] = [
        ModelFamily::Linear,
        ModelFamily::Polynomial,
        ModelFamily::Exponential,
        ModelFamily::Logarithmic,
        ModelFamily::Periodic,
        ModelFamily::Logistic,
        ModelFamily::Step,
        ModelFamily::NaiveBayes,
        ModelFamily::Knn,
        ModelFamily::Svm,
        ModelFamily::Forest,
        ModelFamily::TreeRegressor,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            ModelFamily::Step => "Step",
            ModelFamily::NaiveBayes => "Naive Bayes",
            ModelFamily::Knn => "KNN",
            ModelFamily::Svm => "SVM",
            ModelFamily::Forest => "Decision Forest",
            ModelFamily::TreeRegressor => "Decision Tree Regressor",
            curve => curve.curve().map_or("", CurveFamily::name),
        }
    }

    /// Short identifier used on the command line
    pub fn id(self) -> &'static str {
        match self {
            ModelFamily::Linear => "linear",
            ModelFamily::Polynomial => "polynomial",
            ModelFamily::Exponential => "exponential",
            ModelFamily::Logarithmic => "logarithmic",
            ModelFamily::Periodic => "periodic",
            ModelFamily::Logistic => "logistic",
            ModelFamily::Step => "step",
            ModelFamily::NaiveBayes => "naive-bayes",
            ModelFamily::Knn => "knn",
            ModelFamily::Svm => "svm",
            ModelFamily::Forest => "forest",
            ModelFamily::TreeRegressor => "tree-regressor",
        }
    }

    pub fn formula(self) -> &'static str {
        match self {
            ModelFamily::Step => "y = (x < a) ? b : c",
            ModelFamily::NaiveBayes => "P(C|x) ∝ P(x|C)P(C)",
            ModelFamily::Knn => "k = 5, Neighbors",
            ModelFamily::Svm => "RBF Kernel, Soft Margin",
            ModelFamily::Forest => "Bagging & Ensemble Splits",
            ModelFamily::TreeRegressor => "Recursive Mean Splitting",
            curve => curve.curve().map_or("", CurveFamily::formula),
        }
    }

    pub fn is_classifier(self) -> bool {
        matches!(
            self,
            ModelFamily::NaiveBayes | ModelFamily::Knn | ModelFamily::Svm | ModelFamily::Forest
        )
    }

    pub fn task(self) -> Task {
        if self.is_classifier() {
            Task::Classification
        } else {
            Task::Regression
        }
    }

    /// The gradient-descent curve behind this family, if any
    pub fn curve(self) -> Option<CurveFamily> {
        match self {
            ModelFamily::Linear => Some(CurveFamily::Linear),
            ModelFamily::Polynomial => Some(CurveFamily::Polynomial),
            ModelFamily::Exponential => Some(CurveFamily::Exponential),
            ModelFamily::Logarithmic => Some(CurveFamily::Logarithmic),
            ModelFamily::Periodic => Some(CurveFamily::Periodic),
            ModelFamily::Logistic => Some(CurveFamily::Logistic),
            _ => None,
        }
    }

    /// Build an unfitted model of this family
    ///
    /// # Panics
    /// Panics if the options hold an invalid hyper-parameter (`k` or `n_trees` of 0);
    /// see [`ModelOptions::validate`]
    pub fn build(self, options: &ModelOptions) -> Box<dyn Model> {
        match self {
            ModelFamily::Linear => Box::new(GradientRegressor::new(CurveFamily::Linear)),
            ModelFamily::Polynomial => Box::new(GradientRegressor::new(CurveFamily::Polynomial)),
            ModelFamily::Exponential => Box::new(GradientRegressor::new(CurveFamily::Exponential)),
            ModelFamily::Logarithmic => Box::new(GradientRegressor::new(CurveFamily::Logarithmic)),
            ModelFamily::Periodic => Box::new(GradientRegressor::new(CurveFamily::Periodic)),
            ModelFamily::Logistic => Box::new(GradientRegressor::new(CurveFamily::Logistic)),
            ModelFamily::Step => Box::new(StepRegressor::new()),
            ModelFamily::NaiveBayes => Box::new(NaiveBayesClassifier::new()),
            ModelFamily::Knn => Box::new(KnnClassifier::with_config(KnnConfig {
                k: options.k,
                voting: options.voting,
            })),
            ModelFamily::Svm => Box::new(KernelSvm::with_config(SvmConfig {
                seed: options.seed,
                ..SvmConfig::default()
            })),
            ModelFamily::Forest => Box::new(DecisionForest::with_config(ForestConfig {
                n_trees: options.n_trees,
                max_depth: options.depth,
                seed: options.seed,
                ..ForestConfig::default()
            })),
            ModelFamily::TreeRegressor => {
                Box::new(RegressionTree::new().with_max_depth(options.depth))
            }
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelFamily {
    type Err = FitError;

    /// Accepts either the identifier (`naive-bayes`) or the display name (`Naive Bayes`)
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ModelFamily::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(wanted) || f.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FitError::InvalidParameter(format!("Unknown model family: {s}")))
    }
}

/// Hyper-parameters shared by the catalogue's configurable families
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Maximum tree depth (forest and tree regressor)
    pub depth: usize,
    /// Neighbour count (KNN)
    pub k: usize,
    pub voting: Voting,
    /// Ensemble size (forest)
    pub n_trees: usize,
    /// Seed for randomized models (SVM, forest)
    pub seed: Option<u64>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        let knn = KnnConfig::default();
        Self {
            depth: DEFAULT_MAX_DEPTH,
            k: knn.k,
            voting: knn.voting,
            n_trees: ForestConfig::default().n_trees,
            seed: None,
        }
    }
}

impl ModelOptions {
    /// Check the hyper-parameters `ModelFamily::build` asserts on
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(FitError::InvalidParameter("k must be positive".to_string()));
        }
        if self.n_trees == 0 {
            return Err(FitError::InvalidParameter(
                "Number of trees must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generate, fit, score and sample one model family
#[derive(Debug, Clone)]
pub struct Experiment {
    family: ModelFamily,
    options: ModelOptions,
    generator: GeneratorConfig,
    resolution: usize,
}

impl Experiment {
    pub fn new(family: ModelFamily) -> Self {
        Self {
            family,
            options: ModelOptions::default(),
            generator: GeneratorConfig::default(),
            resolution: DEFAULT_RESOLUTION,
        }
    }

    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    /// Set tree depth for the forest and the tree regressor
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.options.depth = depth;
        self
    }

    /// Set the KNN neighbour count
    pub fn with_k(mut self, k: usize) -> Self {
        self.options.k = k;
        self
    }

    /// Set the forest size
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.options.n_trees = n_trees;
        self
    }

    /// Seed both the point generator and randomized models
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self.generator.seed = Some(seed);
        self
    }

    pub fn with_spread(mut self, spread: f64) -> Self {
        self.generator.spread = spread;
        self
    }

    pub fn with_outlier_rate(mut self, outlier_rate: f64) -> Self {
        self.generator.outlier_rate = outlier_rate;
        self
    }

    pub fn with_n_points(mut self, n_points: usize) -> Self {
        self.generator.n_points = n_points;
        self
    }

    /// Set how many x positions the fitted model is sampled at
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Generate a fresh point set for the family
    pub fn generate(&self) -> Result<PointSet> {
        self.generator.validate()?;
        Ok(Generator::with_config(self.generator).generate(self.family))
    }

    /// Generate points, then fit and score on them
    pub fn run(&self) -> Result<ExperimentReport> {
        self.options.validate()?;
        let points = self.generate()?;
        self.run_on(&points)
    }

    /// Fit and score on a given point set
    pub fn run_on(&self, points: &PointSet) -> Result<ExperimentReport> {
        if self.resolution < 2 {
            return Err(FitError::InvalidParameter(format!(
                "Resolution must be at least 2, got: {}",
                self.resolution
            )));
        }
        self.options.validate()?;

        let samples = points.samples();
        let mut model = self.family.build(&self.options);
        info!("Fitting {} on {} points", model.name(), samples.len());
        model.fit(&samples)?;
        let metrics = model.score(&samples)?;
        info!("{}: {}", model.name(), metrics);

        let normalizer = points.normalizer();
        let (curve, boundaries) = match model.task() {
            Task::Regression => (
                sampling::sample_curve(&*model, normalizer, self.resolution),
                Vec::new(),
            ),
            Task::Classification => (
                Vec::new(),
                sampling::decision_boundaries(&*model, self.resolution)
                    .into_iter()
                    .map(|x| normalizer.denormalize_x(x))
                    .collect(),
            ),
        };

        Ok(ExperimentReport {
            family: self.family,
            model: model.name().to_string(),
            task: model.task(),
            timestamp: Utc::now(),
            summary: metrics.summary(),
            metrics,
            points: points.points().to_vec(),
            curve,
            boundaries,
        })
    }
}

/// Outcome of one experiment, ready for rendering or serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub family: ModelFamily,
    pub model: String,
    pub task: Task,
    pub timestamp: DateTime<Utc>,
    pub metrics: Metrics,
    /// Headline metric strings
    pub summary: [String; 3],
    /// Training points in display space
    pub points: Vec<Point>,
    /// Fitted curve in display space (regression only)
    pub curve: Vec<Point>,
    /// Display x positions where the class-1 probability crosses 0.5 (classification only)
    pub boundaries: Vec<f64>,
}

impl ExperimentReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| FitError::SerializationError(e.to_string()))
    }

    /// Print a human-readable summary
    pub fn print_summary(&self) {
        println!("=== {} ===", self.model);
        println!("Formula: {}", self.family.formula());
        println!("Points: {}", self.points.len());
        for line in &self.summary {
            println!("  {line}");
        }
        if let Some(m) = self.metrics.as_classification() {
            println!("  F1: {:.2}  SPEC: {:.2}", m.f1_score(), m.specificity());
            if !self.boundaries.is_empty() {
                let xs: Vec<String> = self.boundaries.iter().map(|x| format!("{x:.0}")).collect();
                println!("  Boundaries at x = {}", xs.join(", "));
            }
        }
    }
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Run one family with default settings
    pub fn run(family: ModelFamily, seed: Option<u64>) -> Result<ExperimentReport> {
        let experiment = Experiment::new(family);
        match seed {
            Some(seed) => experiment.with_seed(seed).run(),
            None => experiment.run(),
        }
    }

    /// Run every family of the catalogue with the same generator settings
    pub fn run_all(generator: GeneratorConfig, options: ModelOptions) -> Result<Vec<ExperimentReport>> {
        ModelFamily::ALL
            .into_iter()
            .map(|family| {
                Experiment::new(family)
                    .with_generator(generator)
                    .with_options(options)
                    .run()
            })
            .collect()
    }

    /// Fit a family on points loaded from a CSV file
    pub fn fit_csv<P: AsRef<std::path::Path>>(family: ModelFamily, path: P) -> Result<ExperimentReport> {
        let points = PointSet::from_file(path)?;
        Experiment::new(family).run_on(&points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Label;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_catalogue() {
        assert_eq!(ModelFamily::ALL.len(), 12);
        let classifiers = ModelFamily::ALL.iter().filter(|f| f.is_classifier()).count();
        assert_eq!(classifiers, 4);

        for family in ModelFamily::ALL {
            let model = family.build(&ModelOptions::default());
            assert_eq!(model.name(), family.name());
            assert_eq!(model.task(), family.task());
            assert!(!family.formula().is_empty());
        }
    }

    #[test]
    fn test_family_parsing() {
        assert_eq!("naive-bayes".parse::<ModelFamily>().unwrap(), ModelFamily::NaiveBayes);
        assert_eq!("Decision Forest".parse::<ModelFamily>().unwrap(), ModelFamily::Forest);
        assert_eq!("SVM".parse::<ModelFamily>().unwrap(), ModelFamily::Svm);
        assert!(matches!(
            "perceptron".parse::<ModelFamily>(),
            Err(FitError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_builder_pattern() {
        let experiment = Experiment::new(ModelFamily::Forest)
            .with_depth(6)
            .with_n_trees(3)
            .with_k(7)
            .with_seed(1);

        assert_eq!(experiment.options().depth, 6);
        assert_eq!(experiment.options().n_trees, 3);
        assert_eq!(experiment.options().k, 7);
        assert_eq!(experiment.options().seed, Some(1));
    }

    #[test]
    fn test_regression_report() {
        let report = Experiment::new(ModelFamily::Step)
            .with_seed(3)
            .with_resolution(11)
            .run()
            .unwrap();

        assert_eq!(report.task, Task::Regression);
        assert_eq!(report.points.len(), 100);
        assert_eq!(report.curve.len(), 11);
        assert!(report.boundaries.is_empty());
        assert!(report.summary[0].starts_with("MSE: "));
        assert!(report.metrics.as_regression().unwrap().r2 > 0.5);
    }

    #[test]
    fn test_classification_report() {
        let report = Experiment::new(ModelFamily::Knn).with_seed(8).run().unwrap();

        assert_eq!(report.task, Task::Classification);
        assert!(report.curve.is_empty());
        assert!(!report.boundaries.is_empty());
        assert!(report.summary[0].starts_with("ACC: "));
    }

    #[test]
    fn test_seeded_experiments_repeat() {
        let a = Experiment::new(ModelFamily::Svm).with_seed(4).run().unwrap();
        let b = Experiment::new(ModelFamily::Svm).with_seed(4).run().unwrap();

        assert_eq!(a.points, b.points);
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn test_report_serializes() {
        let report = Experiment::new(ModelFamily::Linear).with_seed(2).run().unwrap();
        let json = report.to_json().unwrap();

        assert!(json.contains("\"family\": \"linear\""));
        assert!(json.contains("\"task\": \"regression\""));
        let parsed: ExperimentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.points.len(), report.points.len());
    }

    #[test]
    fn test_fit_from_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x,y,label").unwrap();
        for i in 0..20 {
            let label = if i >= 10 { 1 } else { 0 };
            writeln!(file, "{},125,{}", i * 30, label).unwrap();
        }
        file.flush().unwrap();

        let report = quick::fit_csv(ModelFamily::NaiveBayes, file.path()).unwrap();
        let m = report.metrics.as_classification().unwrap();
        assert_eq!(m.total(), 20);
        assert!(m.accuracy() > 0.9);
        assert_eq!(report.points[19].label, Some(Label::Positive));
    }

    #[test]
    fn test_classifier_rejects_unlabeled_points() {
        let points = PointSet::new(vec![Point::new(10.0, 10.0), Point::new(20.0, 20.0)]);
        let result = Experiment::new(ModelFamily::Svm).run_on(&points);
        assert!(matches!(result, Err(FitError::MissingLabel { index: 0 })));
    }

    #[test]
    fn test_invalid_settings_are_errors() {
        let invalid = [
            Experiment::new(ModelFamily::Knn).with_k(0),
            Experiment::new(ModelFamily::Forest).with_n_trees(0),
            Experiment::new(ModelFamily::Linear).with_spread(2.0),
            Experiment::new(ModelFamily::Linear).with_outlier_rate(1.5),
            Experiment::new(ModelFamily::Svm).with_spread(-0.1),
            Experiment::new(ModelFamily::Step).with_resolution(1),
        ];
        for experiment in invalid {
            let result = experiment.clone().with_seed(1).run();
            assert!(
                matches!(result, Err(FitError::InvalidParameter(_))),
                "{experiment:?} was accepted"
            );
        }
    }

    #[test]
    fn test_run_on_rejects_invalid_options() {
        let points = Experiment::new(ModelFamily::Knn).with_seed(2).generate().unwrap();
        let result = Experiment::new(ModelFamily::Knn).with_k(0).run_on(&points);
        assert!(matches!(result, Err(FitError::InvalidParameter(_))));

        let options = ModelOptions {
            n_trees: 0,
            ..ModelOptions::default()
        };
        assert!(options.validate().is_err());
        assert!(ModelOptions::default().validate().is_ok());
    }

    #[test]
    fn test_run_all_covers_catalogue() {
        let generator = GeneratorConfig {
            n_points: 30,
            seed: Some(5),
            ..GeneratorConfig::default()
        };
        let reports = quick::run_all(generator, ModelOptions::default()).unwrap();
        assert_eq!(reports.len(), ModelFamily::ALL.len());
    }
}
