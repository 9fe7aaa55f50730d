//! Sampling a fitted model for drawing
//!
//! A renderer only needs `predict` evaluated on a grid; these helpers do the
//! evaluation and hand back display-space coordinates.

use crate::core::{Model, Point, Sample};
use crate::utils::scaling::Normalizer;

/// Evenly spaced inputs covering `[0, 1]`, endpoints included
///
/// # Panics
/// Panics if resolution < 2
pub fn grid(resolution: usize) -> Vec<f64> {
    assert!(resolution >= 2, "Resolution must be at least 2, got: {resolution}");
    let last = (resolution - 1) as f64;
    (0..resolution).map(|i| i as f64 / last).collect()
}

/// Evaluate `predict` on the grid and map the curve into display space
pub fn sample_curve<M: Model + ?Sized>(
    model: &M,
    normalizer: &Normalizer,
    resolution: usize,
) -> Vec<Point> {
    grid(resolution)
        .into_iter()
        .map(|x| normalizer.denormalize(&Sample::new(x, model.predict(x))))
        .collect()
}

/// Normalized x positions where the class-1 probability crosses 0.5
pub fn decision_boundaries<M: Model + ?Sized>(model: &M, resolution: usize) -> Vec<f64> {
    let xs = grid(resolution);
    let mut boundaries = Vec::new();
    let mut last = model.predict(xs[0]);

    for &x in &xs[1..] {
        let probability = model.predict(x);
        if (last <= 0.5 && probability > 0.5) || (last >= 0.5 && probability < 0.5) {
            boundaries.push(x);
        }
        last = probability;
    }

    boundaries
}
