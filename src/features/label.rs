//! Composite target derivation

use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::{CREDIT_SCORE_COLUMN, DEBT_RATIO_COLUMN, SAVINGS_RATIO_COLUMN};
use crate::error::{FinHealthError, Result};

/// Thresholds defining "good financial condition"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    /// Inclusive lower bound on credit score
    pub min_credit_score: f64,
    /// Exclusive lower bound on savings-to-income ratio
    pub min_savings_ratio: f64,
    /// Exclusive upper bound on debt-to-income ratio
    pub max_debt_ratio: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            min_credit_score: 700.0,
            min_savings_ratio: 3.5,
            max_debt_ratio: 3.0,
        }
    }
}

/// Computes the binary label from the three leakage columns
#[derive(Debug, Clone, Default)]
pub struct LabelDeriver {
    thresholds: LabelThresholds,
}

impl LabelDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: LabelThresholds) -> Self {
        Self { thresholds }
    }

    /// Label for a single record. A missing value disqualifies.
    pub fn label(
        &self,
        credit_score: Option<f64>,
        savings_ratio: Option<f64>,
        debt_ratio: Option<f64>,
    ) -> f64 {
        match (credit_score, savings_ratio, debt_ratio) {
            (Some(cs), Some(sr), Some(dr))
                if cs >= self.thresholds.min_credit_score
                    && sr > self.thresholds.min_savings_ratio
                    && dr < self.thresholds.max_debt_ratio =>
            {
                1.0
            }
            _ => 0.0,
        }
    }

    /// One label per row of `df`
    pub fn derive(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let credit = numeric_values(df, CREDIT_SCORE_COLUMN)?;
        let savings = numeric_values(df, SAVINGS_RATIO_COLUMN)?;
        let debt = numeric_values(df, DEBT_RATIO_COLUMN)?;

        Ok(credit
            .into_iter()
            .zip(savings)
            .zip(debt)
            .map(|((cs, sr), dr)| self.label(cs, sr, dr))
            .collect())
    }
}

/// Derive labels with the default thresholds
pub fn derive_labels(df: &DataFrame) -> Result<Array1<f64>> {
    LabelDeriver::new().derive(df)
}

fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| FinHealthError::FeatureNotFound(name.to_string()))?;
    let as_f64 = column.cast(&DataType::Float64)?;
    Ok(as_f64.f64()?.into_iter().collect())
}
