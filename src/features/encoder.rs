//! Ordinal encoding of categorical columns

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::{column_names, MISSING_CATEGORY};
use crate::artifacts::{self, ArtifactKey, ArtifactStore};
use crate::error::Result;

/// Code assigned to categories never seen during fitting
pub const UNKNOWN_CODE: i64 = -1;

/// Fitted categories for one column; a category's code is its index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub column: String,
    /// Sorted, unique
    pub categories: Vec<String>,
}

impl CategoryMapping {
    fn fit(column: &str, series: &Column) -> Result<Self> {
        let values = string_values(series)?;
        let categories: BTreeSet<String> = values.into_iter().collect();
        Ok(Self {
            column: column.to_string(),
            categories: categories.into_iter().collect(),
        })
    }

    /// Code for `value`, or [`UNKNOWN_CODE`]
    pub fn code(&self, value: &str) -> i64 {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .map(|idx| idx as i64)
            .unwrap_or(UNKNOWN_CODE)
    }

    fn encode(&self, series: &Column) -> Result<Column> {
        let codes: Vec<i64> = string_values(series)?
            .iter()
            .map(|v| self.code(v))
            .collect();
        Ok(Column::new(self.column.as_str().into(), codes))
    }
}

/// Categorical encoding table shared by training and inference.
///
/// Besides the per-column categories it records the encoded feature schema
/// seen at fit time (column order and dtype), which serving enforces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    mappings: Vec<CategoryMapping>,
    feature_columns: Vec<String>,
    /// Dtype of each feature column after encoding, parallel to `feature_columns`
    feature_dtypes: Vec<DataType>,
}

impl CategoricalEncoder {
    /// Fit on `df`, restricted to the entries of `columns` that are present
    pub fn fit(df: &DataFrame, columns: &[&str]) -> Result<Self> {
        let mut mappings = Vec::new();
        for &name in columns {
            let Ok(column) = df.column(name) else {
                debug!(column = name, "Categorical column absent, skipping");
                continue;
            };
            let mapping = CategoryMapping::fit(name, column)?;
            debug!(column = name, categories = mapping.categories.len(), "Fitted column");
            mappings.push(mapping);
        }

        let feature_dtypes = df
            .get_columns()
            .iter()
            .map(|c| {
                if mappings.iter().any(|m| m.column == c.name().as_str()) {
                    DataType::Int64
                } else {
                    c.dtype().clone()
                }
            })
            .collect();

        Ok(Self {
            mappings,
            feature_columns: column_names(df),
            feature_dtypes,
        })
    }

    /// Replace every fitted column present in `df` with its codes, in place
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();
        for mapping in &self.mappings {
            if let Ok(column) = df.column(&mapping.column) {
                let encoded = mapping.encode(column)?;
                result.with_column(encoded)?;
            }
        }
        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(df: &DataFrame, columns: &[&str]) -> Result<(Self, DataFrame)> {
        let encoder = Self::fit(df, columns)?;
        let encoded = encoder.transform(df)?;
        Ok((encoder, encoded))
    }

    pub fn mappings(&self) -> &[CategoryMapping] {
        &self.mappings
    }

    /// Categorical columns this encoder was fitted on, in order
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.column.as_str()).collect()
    }

    /// Feature columns in training order
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Encoded feature columns with their dtypes, in training order
    pub fn schema(&self) -> impl Iterator<Item = (&String, &DataType)> {
        self.feature_columns.iter().zip(&self.feature_dtypes)
    }

    /// Code for a single value, `None` if `column` was not fitted
    pub fn code_for(&self, column: &str, value: &str) -> Option<i64> {
        self.mappings
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.code(value))
    }

    /// SHA-256 of the table contents; models record it to detect a stale pairing
    pub fn fingerprint(&self) -> Result<String> {
        artifacts::fingerprint(self)
    }

    /// Persist as the `categorical_encoder` artifact, replacing any prior version
    pub fn save(&self, store: &dyn ArtifactStore) -> Result<()> {
        artifacts::save_artifact(store, ArtifactKey::CategoricalEncoder, self)?;
        info!(
            columns = self.mappings.len(),
            features = self.feature_columns.len(),
            "Saved categorical encoder"
        );
        Ok(())
    }

    /// Load the persisted table; `MissingArtifact` before the first training run
    pub fn load(store: &dyn ArtifactStore) -> Result<Self> {
        artifacts::load_artifact(store, ArtifactKey::CategoricalEncoder)
    }
}

/// Cell values as strings, with nulls mapped to the missing category
fn string_values(column: &Column) -> Result<Vec<String>> {
    let as_str = column.cast(&DataType::String)?;
    Ok(as_str
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(MISSING_CATEGORY).to_string())
        .collect())
}
