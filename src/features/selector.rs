//! Identifier and leakage column removal

use polars::prelude::*;
use tracing::debug;

use super::DROPPED_COLUMNS;
use crate::error::Result;

/// Drops a fixed set of columns, skipping any that are absent
#[derive(Debug, Clone)]
pub struct FeatureSelector {
    drop: Vec<String>,
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self {
            drop: DROPPED_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FeatureSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `df` without the dropped columns. Absent columns are not an
    /// error: inference payloads never carry them.
    pub fn select(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();
        for name in &self.drop {
            if result.column(name).is_ok() {
                result = result.drop(name)?;
                debug!(column = %name, "Dropped column");
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::column_names;

    fn raw() -> DataFrame {
        df!(
            "user_id" => &[1i64, 2],
            "record_date" => &["2024-01-01", "2024-02-01"],
            "age" => &[30i64, 40],
            "credit_score" => &[700.0f64, 650.0],
            "savings_to_income_ratio" => &[4.0f64, 2.0],
            "debt_to_income_ratio" => &[1.0f64, 4.0],
            "region" => &["North", "South"],
        )
        .unwrap()
    }

    #[test]
    fn test_drops_leakage_and_identifiers() {
        let selected = FeatureSelector::new().select(&raw()).unwrap();
        assert_eq!(column_names(&selected), vec!["age", "region"]);
        assert_eq!(selected.height(), 2);
    }

    #[test]
    fn test_selection_is_idempotent() {
        let selector = FeatureSelector::new();
        let once = selector.select(&raw()).unwrap();
        let twice = selector.select(&once).unwrap();
        assert!(once.equals(&twice));
    }

    #[test]
    fn test_absent_columns_skipped() {
        let df = df!("age" => &[30i64], "region" => &["North"]).unwrap();
        let selected = FeatureSelector::new().select(&df).unwrap();
        assert_eq!(column_names(&selected), vec!["age", "region"]);
    }
}
