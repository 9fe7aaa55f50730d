//! Closed-form curves trained by batch gradient descent
//!
//! Each family is a small formula in up to four parameters `a, b, c, d`.
//! Training minimises squared error with the analytic partial derivatives,
//! averaged over the dataset and scaled by a family-specific learning rate,
//! for a fixed number of iterations. There is no convergence check.

use crate::core::{ensure_not_empty, Model, Result, Sample, Task};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Upper bound on the exponent of the exponential family
pub const EXP_CLAMP: f64 = 10.0;

/// Offset added to `x` before taking the logarithm
pub const LOG_OFFSET: f64 = 0.05;

/// Parametric curve families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveFamily {
    /// `a·x + b`
    Linear,
    /// `a·(x - 0.5)² + b·x + c`
    Polynomial,
    /// `a·e^(min(b·x, 10)) + c`
    Exponential,
    /// `a + b·ln(x + 0.05)`
    Logarithmic,
    /// `a·sin(b·x + c) + d`
    Periodic,
    /// `1 / (1 + e^(-(x - a)·b))`
    Logistic,
}

impl CurveFamily {
    pub const ALL: [CurveFamily; 6] = [
        CurveFamily::Linear,
        CurveFamily::Polynomial,
        CurveFamily::Exponential,
        CurveFamily::Logarithmic,
        CurveFamily::Periodic,
        CurveFamily::Logistic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CurveFamily::Linear => "Linear",
            CurveFamily::Polynomial => "Polynomial",
            CurveFamily::Exponential => "Exponential",
            CurveFamily::Logarithmic => "Logarithmic",
            CurveFamily::Periodic => "Periodic",
            CurveFamily::Logistic => "Logistic",
        }
    }

    pub fn formula(self) -> &'static str {
        match self {
            CurveFamily::Linear => "y = ax + b",
            CurveFamily::Polynomial => "y = a(x-0.5)² + bx + c",
            CurveFamily::Exponential => "y = ae^(bx) + c",
            CurveFamily::Logarithmic => "y = a + b * ln(x)",
            CurveFamily::Periodic => "y = a * sin(bx + c) + d",
            CurveFamily::Logistic => "y = 1 / (1 + e^-z)",
        }
    }

    /// Parameters every fit starts descending from
    pub fn initial_params(self) -> CurveParams {
        match self {
            CurveFamily::Exponential => CurveParams::new(0.1, 0.5, 0.0, 0.0),
            CurveFamily::Periodic => CurveParams::new(0.2, 5.0, 0.0, 0.5),
            _ => CurveParams::new(0.1, 1.0, 0.1, 0.5),
        }
    }

    /// Learning rate and iteration budget tuned to the family's gradient scale
    pub fn default_config(self) -> GradientConfig {
        let (learning_rate, iterations) = match self {
            CurveFamily::Exponential => (0.01, 6000),
            CurveFamily::Periodic => (0.02, 6000),
            CurveFamily::Logistic => (0.5, 5000),
            _ => (0.1, 4000),
        };
        GradientConfig {
            learning_rate,
            iterations,
            frequency_search: FrequencySearch::default(),
        }
    }

    /// Evaluate the curve at `x`
    pub fn evaluate(self, p: &CurveParams, x: f64) -> f64 {
        match self {
            CurveFamily::Linear => p.a * x + p.b,
            CurveFamily::Polynomial => p.a * (x - 0.5).powi(2) + p.b * x + p.c,
            CurveFamily::Exponential => p.a * clamped_exp(p.b * x) + p.c,
            CurveFamily::Logarithmic => p.a + p.b * guarded_ln(x),
            CurveFamily::Periodic => p.a * (p.b * x + p.c).sin() + p.d,
            CurveFamily::Logistic => 1.0 / (1.0 + (-(x - p.a) * p.b).exp()),
        }
    }

    /// Partial derivatives of `err²/2` at one sample, given `err = prediction - y`
    fn gradient(self, p: &CurveParams, x: f64, prediction: f64, err: f64) -> CurveParams {
        match self {
            CurveFamily::Linear => CurveParams::new(err * x, err, 0.0, 0.0),
            CurveFamily::Polynomial => {
                CurveParams::new(err * (x - 0.5).powi(2), err * x, err, 0.0)
            }
            CurveFamily::Exponential => {
                let ex = clamped_exp(p.b * x);
                CurveParams::new(err * ex, err * p.a * x * ex, err, 0.0)
            }
            CurveFamily::Logarithmic => CurveParams::new(err, err * guarded_ln(x), 0.0, 0.0),
            CurveFamily::Periodic => {
                let arg = p.b * x + p.c;
                let cos = arg.cos();
                CurveParams::new(err * arg.sin(), err * p.a * x * cos, err * p.a * cos, err)
            }
            CurveFamily::Logistic => {
                let slope = prediction * (1.0 - prediction);
                CurveParams::new(err * slope * -p.b, err * slope * (x - p.a), 0.0, 0.0)
            }
        }
    }

    /// Sum of squared errors of the curve over the samples
    pub fn sse(self, p: &CurveParams, samples: &[Sample]) -> f64 {
        samples
            .iter()
            .map(|s| (self.evaluate(p, s.x) - s.y).powi(2))
            .sum()
    }
}

impl fmt::Display for CurveFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn clamped_exp(z: f64) -> f64 {
    z.min(EXP_CLAMP).exp()
}

fn guarded_ln(x: f64) -> f64 {
    (x + LOG_OFFSET).max(f64::MIN_POSITIVE).ln()
}

/// Snapshot of curve parameters produced by one fit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CurveParams {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Move against the gradient by `scale`
    fn descend(&mut self, gradient: &CurveParams, scale: f64) {
        self.a -= gradient.a * scale;
        self.b -= gradient.b * scale;
        self.c -= gradient.c * scale;
        self.d -= gradient.d * scale;
    }
}

impl AddAssign for CurveParams {
    fn add_assign(&mut self, other: Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
        self.d += other.d;
    }
}

/// Candidate frequencies tried before descending on the periodic family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrequencySearch {
    /// Every frequency from `start` to `end` inclusive, `step` apart
    Sweep { start: f64, end: f64, step: f64 },
    /// A fixed list of candidates
    Candidates(Vec<f64>),
}

impl FrequencySearch {
    pub fn candidates(&self) -> Vec<f64> {
        match self {
            FrequencySearch::Sweep { start, end, step } => {
                assert!(*step > 0.0, "Sweep step must be positive, got: {step}");
                let count = ((end - start) / step + 1e-9).floor() as usize + 1;
                (0..count).map(|i| start + i as f64 * step).collect()
            }
            FrequencySearch::Candidates(values) => values.clone(),
        }
    }
}

impl Default for FrequencySearch {
    fn default() -> Self {
        FrequencySearch::Sweep {
            start: 1.0,
            end: 25.0,
            step: 0.5,
        }
    }
}

/// Configuration for gradient descent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientConfig {
    pub learning_rate: f64,
    pub iterations: usize,
    /// Only consulted by the periodic family
    pub frequency_search: FrequencySearch,
}

/// A curve family together with its fitted parameters
#[derive(Debug, Clone)]
pub struct GradientRegressor {
    family: CurveFamily,
    config: GradientConfig,
    params: CurveParams,
}

impl GradientRegressor {
    /// Create an unfitted regressor with the family's default configuration
    pub fn new(family: CurveFamily) -> Self {
        Self::with_config(family, family.default_config())
    }

    pub fn with_config(family: CurveFamily, config: GradientConfig) -> Self {
        Self {
            family,
            config,
            params: family.initial_params(),
        }
    }

    /// Set the learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    /// Set the number of descent iterations
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Set the periodic frequency pre-search
    pub fn with_frequency_search(mut self, search: FrequencySearch) -> Self {
        self.config.frequency_search = search;
        self
    }

    pub fn family(&self) -> CurveFamily {
        self.family
    }

    pub fn config(&self) -> &GradientConfig {
        &self.config
    }

    /// Parameters of the latest fit (the start parameters before any fit)
    pub fn params(&self) -> CurveParams {
        self.params
    }

    /// Sum of squared errors of the current parameters
    pub fn loss(&self, samples: &[Sample]) -> f64 {
        self.family.sse(&self.params, samples)
    }

    /// Pick the periodic frequency with the least squared error
    fn warm_start(&self, samples: &[Sample]) -> CurveParams {
        let mut best_b = self.family.initial_params().b;
        let mut best_err = f64::INFINITY;

        for b in self.config.frequency_search.candidates() {
            let err = self
                .family
                .sse(&CurveParams::new(0.3, b, 0.0, 0.5), samples);
            if err < best_err {
                best_err = err;
                best_b = b;
            }
        }

        debug!("{}: frequency search chose b={best_b} (sse={best_err:.5})", self.family);
        CurveParams::new(0.2, best_b, 0.0, 0.5)
    }

    fn descend(&self, mut params: CurveParams, samples: &[Sample]) -> CurveParams {
        let scale = self.config.learning_rate / samples.len() as f64;

        for _ in 0..self.config.iterations {
            let mut gradient = CurveParams::default();
            for sample in samples {
                let prediction = self.family.evaluate(&params, sample.x);
                let err = prediction - sample.y;
                gradient += self.family.gradient(&params, sample.x, prediction, err);
            }
            params.descend(&gradient, scale);
        }

        params
    }
}

impl Model for GradientRegressor {
    fn name(&self) -> &'static str {
        self.family.name()
    }

    fn task(&self) -> Task {
        Task::Regression
    }

    fn fit(&mut self, samples: &[Sample]) -> Result<()> {
        ensure_not_empty(samples)?;

        let start = match self.family {
            CurveFamily::Periodic => self.warm_start(samples),
            _ => self.family.initial_params(),
        };
        let initial_loss = self.family.sse(&start, samples);
        let params = self.descend(start, samples);

        debug!(
            "{}: sse {:.5} -> {:.5} after {} iterations, params {:?}",
            self.family,
            initial_loss,
            self.family.sse(&params, samples),
            self.config.iterations,
            params
        );

        self.params = params;
        Ok(())
    }

    fn predict(&self, x: f64) -> f64 {
        self.family.evaluate(&self.params, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FitError;
    use approx::assert_abs_diff_eq;

    fn sample_curve(f: impl Fn(f64) -> f64, n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                let x = i as f64 / (n - 1) as f64;
                Sample::new(x, f(x))
            })
            .collect()
    }

    #[test]
    fn test_formulas() {
        let p = CurveParams::new(2.0, 3.0, 4.0, 5.0);

        assert_eq!(CurveFamily::Linear.evaluate(&p, 0.5), 4.0);
        assert_eq!(CurveFamily::Polynomial.evaluate(&p, 1.0), 2.0 * 0.25 + 3.0 + 4.0);
        assert_abs_diff_eq!(
            CurveFamily::Periodic.evaluate(&p, 0.0),
            2.0 * 4.0_f64.sin() + 5.0,
            epsilon = 1e-12
        );
        assert_eq!(CurveFamily::Logistic.evaluate(&p, 2.0), 0.5);
    }

    #[test]
    fn test_exponential_clamps_exponent() {
        let p = CurveParams::new(1.0, 1000.0, 0.0, 0.0);
        let y = CurveFamily::Exponential.evaluate(&p, 1.0);

        assert!(y.is_finite());
        assert_abs_diff_eq!(y, EXP_CLAMP.exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_logarithm_is_defined_at_zero() {
        let p = CurveParams::new(0.0, 1.0, 0.0, 0.0);
        assert_abs_diff_eq!(
            CurveFamily::Logarithmic.evaluate(&p, 0.0),
            LOG_OFFSET.ln(),
            epsilon = 1e-12
        );
        assert!(CurveFamily::Logarithmic.evaluate(&p, -1.0).is_finite());
    }

    #[test]
    fn test_linear_training_reduces_loss() {
        let samples = sample_curve(|x| 0.5 * x + 0.2, 25);
        let mut model = GradientRegressor::new(CurveFamily::Linear);
        let initial = model.loss(&samples);

        model.fit(&samples).unwrap();

        assert!(model.loss(&samples) <= initial);
        assert_abs_diff_eq!(model.params().a, 0.5, epsilon = 0.02);
        assert_abs_diff_eq!(model.params().b, 0.2, epsilon = 0.02);
    }

    #[test]
    fn test_every_family_reduces_loss_on_its_own_shape() {
        let shapes: [(CurveFamily, fn(f64) -> f64); 5] = [
            (CurveFamily::Polynomial, |x| 2.5 * (x - 0.5).powi(2) + 0.2),
            (CurveFamily::Exponential, |x| 0.15 * (1.8 * x).exp() + 0.1),
            (CurveFamily::Logarithmic, |x| 0.5 + 0.2 * (x + 0.01).ln()),
            (CurveFamily::Logistic, |x| 1.0 / (1.0 + (-(x - 0.5) * 10.0).exp())),
            (CurveFamily::Linear, |x| 1.0 - x),
        ];

        for (family, shape) in shapes {
            let samples = sample_curve(shape, 30);
            let mut model = GradientRegressor::new(family);
            let initial = model.loss(&samples);
            model.fit(&samples).unwrap();
            let fitted = model.loss(&samples);

            assert!(
                fitted < initial,
                "{family}: loss went from {initial} to {fitted}"
            );
        }
    }

    #[test]
    fn test_periodic_recovers_frequency() {
        let samples = sample_curve(|x| 0.2 * (10.0 * x).sin() + 0.5, 60);
        let mut model = GradientRegressor::new(CurveFamily::Periodic);
        model.fit(&samples).unwrap();

        assert_abs_diff_eq!(model.params().b, 10.0, epsilon = 0.5);
        assert!(model.loss(&samples) < 0.01);
    }

    #[test]
    fn test_frequency_candidates() {
        let sweep = FrequencySearch::default().candidates();
        assert_eq!(sweep.len(), 49);
        assert_eq!(sweep[0], 1.0);
        assert_eq!(sweep[48], 25.0);

        let fixed = FrequencySearch::Candidates(vec![5.0, 10.0, 15.0, 20.0]);
        assert_eq!(fixed.candidates(), vec![5.0, 10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_periodic_with_fixed_candidates() {
        let samples = sample_curve(|x| 0.2 * (15.0 * x).sin() + 0.5, 80);
        let mut model = GradientRegressor::new(CurveFamily::Periodic)
            .with_frequency_search(FrequencySearch::Candidates(vec![5.0, 10.0, 15.0, 20.0]));
        model.fit(&samples).unwrap();

        assert_abs_diff_eq!(model.params().b, 15.0, epsilon = 0.5);
    }

    #[test]
    fn test_refit_starts_from_initial_params() {
        let samples = sample_curve(|x| 0.5 * x + 0.2, 10);
        let mut once = GradientRegressor::new(CurveFamily::Linear).with_iterations(100);
        once.fit(&samples).unwrap();
        let first = once.params();
        once.fit(&samples).unwrap();

        assert_eq!(once.params(), first);
    }

    #[test]
    fn test_empty_fit_keeps_params() {
        let mut model = GradientRegressor::new(CurveFamily::Linear);
        let before = model.params();

        assert!(matches!(model.fit(&[]), Err(FitError::EmptyDataset)));
        assert_eq!(model.params(), before);
    }

    #[test]
    fn test_builder() {
        let model = GradientRegressor::new(CurveFamily::Logistic)
            .with_learning_rate(0.3)
            .with_iterations(10);

        assert_eq!(model.config().learning_rate, 0.3);
        assert_eq!(model.config().iterations, 10);
        assert_eq!(model.family(), CurveFamily::Logistic);
        assert_eq!(model.name(), "Logistic");
    }
}
