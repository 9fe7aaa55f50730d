//! Coordinate scaling between display space and normalized model space

use crate::core::{Point, Sample};
use serde::{Deserialize, Serialize};

/// Default display width
pub const X_RANGE: f64 = 600.0;
/// Default display height
pub const Y_RANGE: f64 = 250.0;

/// Maps display coordinates into the unit square and back
///
/// `x_norm = x / x_range`, `y_norm = (y_range - y) / y_range`; the y-axis is
/// inverted because display coordinates grow downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    pub x_range: f64,
    pub y_range: f64,
}

impl Normalizer {
    /// # Panics
    /// Panics if either range is not positive
    pub fn new(x_range: f64, y_range: f64) -> Self {
        assert!(
            x_range > 0.0 && y_range > 0.0,
            "Ranges must be positive, got: {x_range}x{y_range}"
        );
        Self { x_range, y_range }
    }

    pub fn normalize_x(&self, x: f64) -> f64 {
        x / self.x_range
    }

    pub fn normalize_y(&self, y: f64) -> f64 {
        (self.y_range - y) / self.y_range
    }

    pub fn denormalize_x(&self, x: f64) -> f64 {
        x * self.x_range
    }

    pub fn denormalize_y(&self, y: f64) -> f64 {
        self.y_range - y * self.y_range
    }

    /// Point in display space to a sample in model space
    pub fn normalize(&self, point: &Point) -> Sample {
        Sample {
            x: self.normalize_x(point.x),
            y: self.normalize_y(point.y),
            label: point.label,
        }
    }

    /// Sample in model space back to display space
    pub fn denormalize(&self, sample: &Sample) -> Point {
        Point {
            x: self.denormalize_x(sample.x),
            y: self.denormalize_y(sample.y),
            label: sample.label,
        }
    }

    pub fn normalize_all(&self, points: &[Point]) -> Vec<Sample> {
        points.iter().map(|p| self.normalize(p)).collect()
    }

    pub fn denormalize_all(&self, samples: &[Sample]) -> Vec<Point> {
        samples.iter().map(|s| self.denormalize(s)).collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(X_RANGE, Y_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Label;
    use approx::assert_relative_eq;

    #[test]
    fn test_corner_points() {
        let normalizer = Normalizer::default();
        let points = [
            Point::new(0.0, 250.0),
            Point::new(300.0, 125.0),
            Point::new(600.0, 0.0),
        ];
        let samples = normalizer.normalize_all(&points);

        assert_eq!((samples[0].x, samples[0].y), (0.0, 0.0));
        assert_eq!((samples[1].x, samples[1].y), (0.5, 0.5));
        assert_eq!((samples[2].x, samples[2].y), (1.0, 1.0));
    }

    #[test]
    fn test_round_trip_keeps_label() {
        let normalizer = Normalizer::new(200.0, 100.0);
        let point = Point::labeled(50.0, 30.0, Label::Positive);
        let back = normalizer.denormalize(&normalizer.normalize(&point));

        assert_relative_eq!(back.x, point.x);
        assert_relative_eq!(back.y, point.y);
        assert_eq!(back.label, Some(Label::Positive));
    }

    #[test]
    #[should_panic(expected = "Ranges must be positive")]
    fn test_rejects_zero_range() {
        Normalizer::new(0.0, 10.0);
    }
}
