//! Bundled Iris dataset for the toy decision-tree task

use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::io::Cursor;

use crate::error::Result;
use crate::features::frame_to_matrix;

const IRIS_CSV: &str = include_str!("../../data/iris.csv");

/// Measurement columns, in model input order
pub const IRIS_FEATURES: [&str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Species names indexed by class code
pub const IRIS_SPECIES: [&str; 3] = ["setosa", "versicolor", "virginica"];

const TARGET: &str = "species";

/// Load the 150-row Iris table as a feature matrix and class vector
pub fn load_iris() -> Result<(Array2<f64>, Array1<f64>)> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(IRIS_CSV.as_bytes()))
        .finish()?;

    let features: Vec<String> = IRIS_FEATURES.iter().map(|s| s.to_string()).collect();
    let x = frame_to_matrix(&df, &features)?;
    let y = frame_to_matrix(&df, &[TARGET.to_string()])?.column(0).to_owned();
    Ok((x, y))
}

/// Species name for a predicted class code
pub fn species_name(class: usize) -> Option<&'static str> {
    IRIS_SPECIES.get(class).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_iris_shape() {
        let (x, y) = load_iris().unwrap();
        assert_eq!(x.dim(), (150, 4));
        assert_eq!(y.len(), 150);
        for class in 0..3 {
            let count = y.iter().filter(|&&v| v == class as f64).count();
            assert_eq!(count, 50);
        }
    }

    #[test]
    fn test_species_name() {
        assert_eq!(species_name(0), Some("setosa"));
        assert_eq!(species_name(2), Some("virginica"));
        assert_eq!(species_name(3), None);
    }
}
