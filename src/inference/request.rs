//! Request and response payloads

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dataset::species_name;
use crate::error::{FinHealthError, Result};
use crate::features::MISSING_CATEGORY;

fn default_loan_type() -> Option<String> {
    Some(MISSING_CATEGORY.to_string())
}

/// One applicant's raw attributes, as accepted by the prediction endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRequest {
    pub age: i64,
    pub gender: String,
    pub education_level: String,
    pub employment_status: String,
    pub job_title: String,
    pub monthly_income_usd: f64,
    pub monthly_expenses_usd: f64,
    pub savings_usd: f64,
    pub has_loan: String,
    #[serde(default = "default_loan_type")]
    pub loan_type: Option<String>,
    pub loan_amount_usd: f64,
    pub loan_term_months: i64,
    pub monthly_emi_usd: f64,
    pub loan_interest_rate_pct: f64,
    pub region: String,
}

impl FinancialRequest {
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        requests_to_dataframe(std::slice::from_ref(self))
    }
}

/// Build a table with one row per request, columns in request field order
pub fn requests_to_dataframe(requests: &[FinancialRequest]) -> Result<DataFrame> {
    if requests.is_empty() {
        return Err(FinHealthError::InvalidInput("no records to score".to_string()));
    }

    macro_rules! col {
        ($field:ident) => {
            requests.iter().map(|r| r.$field.clone()).collect::<Vec<_>>()
        };
    }

    let df = df!(
        "age" => col!(age),
        "gender" => col!(gender),
        "education_level" => col!(education_level),
        "employment_status" => col!(employment_status),
        "job_title" => col!(job_title),
        "monthly_income_usd" => col!(monthly_income_usd),
        "monthly_expenses_usd" => col!(monthly_expenses_usd),
        "savings_usd" => col!(savings_usd),
        "has_loan" => col!(has_loan),
        "loan_type" => col!(loan_type),
        "loan_amount_usd" => col!(loan_amount_usd),
        "loan_term_months" => col!(loan_term_months),
        "monthly_emi_usd" => col!(monthly_emi_usd),
        "loan_interest_rate_pct" => col!(loan_interest_rate_pct),
        "region" => col!(region),
    )?;
    Ok(df)
}

/// Binary verdict with its human-readable label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialResponse {
    pub prediction: u8,
    pub status_label: String,
}

impl FinancialResponse {
    pub const GOOD: &'static str = "Good";
    pub const NEEDS_IMPROVEMENT: &'static str = "Needs Improvement";

    pub fn from_prediction(value: f64) -> Self {
        let prediction = u8::from(value >= 0.5);
        let status_label = if prediction == 1 {
            Self::GOOD
        } else {
            Self::NEEDS_IMPROVEMENT
        };
        Self {
            prediction,
            status_label: status_label.to_string(),
        }
    }
}

/// Four Iris measurements in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrisRequest {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl IrisRequest {
    pub fn to_row(&self) -> [f64; 4] {
        [self.sepal_length, self.sepal_width, self.petal_length, self.petal_width]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrisResponse {
    pub prediction: usize,
    pub species: String,
}

impl IrisResponse {
    pub fn from_class(class: usize) -> Result<Self> {
        let species = species_name(class)
            .ok_or_else(|| FinHealthError::InferenceError(format!("unknown iris class {}", class)))?;
        Ok(Self {
            prediction: class,
            species: species.to_string(),
        })
    }
}
