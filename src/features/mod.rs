//! Feature and target engineering
//!
//! The rules here run on both sides of the model: once over the training
//! table, and again over every inference request. Everything that decides
//! which columns reach the model, and in what order, lives in this module so
//! the two paths cannot drift apart.
//!
//! - [`LabelDeriver`] - composite "good financial condition" label
//! - [`FeatureSelector`] - drops identifier and leakage columns
//! - [`CategoricalEncoder`] - ordinal codes with a `-1` unknown sentinel
//! - [`Trainer`] / [`Server`] - the two variants of the shared gateway

mod encoder;
mod gateway;
mod label;
mod selector;

pub use encoder::{CategoricalEncoder, CategoryMapping, UNKNOWN_CODE};
pub use gateway::{engineer, EngineeredBatch, Mode, Server, ServingBatch, Trainer, TrainingBatch};
pub use label::{derive_labels, LabelDeriver, LabelThresholds};
pub use selector::FeatureSelector;

use ndarray::Array2;
use polars::prelude::*;

use crate::error::{FinHealthError, Result};

pub const ID_COLUMN: &str = "user_id";
pub const RECORD_DATE_COLUMN: &str = "record_date";
pub const CREDIT_SCORE_COLUMN: &str = "credit_score";
pub const SAVINGS_RATIO_COLUMN: &str = "savings_to_income_ratio";
pub const DEBT_RATIO_COLUMN: &str = "debt_to_income_ratio";

/// Columns removed before encoding
pub const DROPPED_COLUMNS: [&str; 5] = [
    ID_COLUMN,
    RECORD_DATE_COLUMN,
    CREDIT_SCORE_COLUMN,
    SAVINGS_RATIO_COLUMN,
    DEBT_RATIO_COLUMN,
];

/// Categorical columns, in encoding order
pub const CATEGORICAL_COLUMNS: [&str; 7] = [
    "gender",
    "education_level",
    "employment_status",
    "job_title",
    "has_loan",
    "loan_type",
    "region",
];

/// Category substituted for null categorical cells on both paths
pub const MISSING_CATEGORY: &str = "None";

/// Extract named columns into a row-major `Array2<f64>`.
///
/// Columns are cast strictly, so a leftover string column is an error rather
/// than a silent column of zeros. Null numeric cells become `0.0`.
pub fn frame_to_matrix(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| FinHealthError::FeatureNotFound(col_name.clone()))?;
            let as_f64 = column.strict_cast(&DataType::Float64).map_err(|e| {
                FinHealthError::DataError(format!("column {} is not numeric: {}", col_name, e))
            })?;
            let values: Vec<f64> = as_f64
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}

/// Column names of a frame, in order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}
