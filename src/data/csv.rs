//! CSV point sets
//!
//! Supports loading and saving point sets where:
//! - Each row is `x,y` (regression) or `x,y,label` (classification)
//! - Coordinates are in display space
//! - Labels must be 0 or 1
//! - First row can be headers (automatically detected)

use crate::core::{Dataset, FitError, Label, Point, Result, Sample};
use crate::utils::Normalizer;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Display-space points together with the normalizer that maps them into model space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    points: Vec<Point>,
    #[serde(default)]
    normalizer: Normalizer,
}

impl PointSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self::with_normalizer(points, Normalizer::default())
    }

    pub fn with_normalizer(points: Vec<Point>, normalizer: Normalizer) -> Self {
        Self { points, normalizer }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// True when every point carries a label
    pub fn is_labeled(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.label.is_some())
    }

    /// Load a point set from a CSV file
    ///
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a point set from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut points = Vec::new();
        let mut first_data_line = true;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first_data_line {
                first_data_line = false;
                if Self::is_header_line(line) {
                    continue;
                }
            }
            points.push(Self::parse_data_line(line)?);
        }

        if points.is_empty() {
            return Err(FitError::EmptyDataset);
        }

        let labeled = points.iter().filter(|p| p.label.is_some()).count();
        if labeled != 0 && labeled != points.len() {
            return Err(FitError::ParseError(format!(
                "Mixed labeled and unlabeled rows ({labeled} of {} labeled)",
                points.len()
            )));
        }

        Ok(Self::new(points))
    }

    /// Load a point set from a JSON array of points
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let points: Vec<Point> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| FitError::SerializationError(e.to_string()))?;
        if points.is_empty() {
            return Err(FitError::EmptyDataset);
        }
        Ok(Self::new(points))
    }

    /// Write the points as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = BufWriter::new(writer);
        if self.is_labeled() {
            writeln!(writer, "x,y,label")?;
        } else {
            writeln!(writer, "x,y")?;
        }

        for point in &self.points {
            match point.label {
                Some(label) => writeln!(writer, "{},{},{}", point.x, point.y, u8::from(label))?,
                None => writeln!(writer, "{},{}", point.x, point.y)?,
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Save the points to a CSV file
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_csv(File::create(path)?)
    }

    /// Save the points to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.points)
            .map_err(|e| FitError::SerializationError(e.to_string()))
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        line.split(',')
            .next()
            .map_or(false, |field| field.trim().parse::<f64>().is_err())
    }

    /// Parse a CSV data line into a Point
    fn parse_data_line(line: &str) -> Result<Point> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let parse = |field: &str, what: &str| -> Result<f64> {
            field
                .parse::<f64>()
                .map_err(|_| FitError::ParseError(format!("Invalid {what} value: {field}")))
        };

        match fields.as_slice() {
            [x, y] => Ok(Point::new(parse(x, "x")?, parse(y, "y")?)),
            [x, y, label] => {
                let label = Label::from_value(parse(label, "label")?)?;
                Ok(Point::labeled(parse(x, "x")?, parse(y, "y")?, label))
            }
            _ => Err(FitError::ParseError(format!(
                "Expected 2 or 3 fields, got {}: {line}",
                fields.len()
            ))),
        }
    }
}

impl Dataset for PointSet {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.normalizer.normalize(&self.points[i])
    }
}
