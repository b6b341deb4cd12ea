//! Seeded train/test partitioning

use crate::error::{FinHealthError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Row partition of a feature matrix and its labels
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffle rows with `seed` and hold out `ceil(test_size * n)` of them.
///
/// The same inputs and seed always produce the same partition.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    let n = x.nrows();
    if n != y.len() {
        return Err(FinHealthError::ShapeError {
            expected: format!("y length = {}", n),
            actual: format!("y length = {}", y.len()),
        });
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(FinHealthError::ValidationError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    // Absorb float noise such as 0.3 * 100 = 30.000000000000004
    let n_test = (test_size * n as f64 - 1e-9).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(FinHealthError::ValidationError(format!(
            "cannot split {} rows with test_size {}",
            n, test_size
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let test_indices = order[..n_test].to_vec();
    let train_indices = order[n_test..].to_vec();

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64);
        let y = Array1::from_shape_fn(n, |i| (i % 2) as f64);
        (x, y)
    }

    #[test]
    fn test_sizes() {
        let (x, y) = data(10);
        let split = train_test_split(&x, &y, 0.3, 12).unwrap();
        assert_eq!(split.x_test.nrows(), 3);
        assert_eq!(split.x_train.nrows(), 7);
        assert_eq!(split.y_test.len(), 3);
    }

    #[test]
    fn test_rounds_test_size_up() {
        let (x, y) = data(11);
        let split = train_test_split(&x, &y, 0.3, 12).unwrap();
        assert_eq!(split.test_indices.len(), 4);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let (x, y) = data(40);
        let a = train_test_split(&x, &y, 0.3, 12).unwrap();
        let b = train_test_split(&x, &y, 0.3, 12).unwrap();
        assert_eq!(a.test_indices, b.test_indices);
        assert_eq!(a.x_train, b.x_train);
    }

    #[test]
    fn test_rows_stay_paired() {
        let (x, y) = data(20);
        let split = train_test_split(&x, &y, 0.25, 7).unwrap();
        for (pos, &idx) in split.test_indices.iter().enumerate() {
            assert_eq!(split.x_test.row(pos), x.row(idx));
            assert_eq!(split.y_test[pos], y[idx]);
        }
        let mut all: Vec<usize> = split.train_indices.iter().chain(&split.test_indices).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_test_size() {
        let (x, y) = data(10);
        assert!(train_test_split(&x, &y, 0.0, 1).is_err());
        assert!(train_test_split(&x, &y, 1.0, 1).is_err());
        let (x, y) = data(1);
        assert!(train_test_split(&x, &y, 0.5, 1).is_err());
    }
}
