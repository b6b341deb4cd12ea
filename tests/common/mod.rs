//! Shared fixtures for integration tests
#![allow(dead_code)]

use finhealth::inference::FinancialRequest;
use polars::prelude::*;

const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
const EDUCATION: [&str; 4] = ["High School", "Bachelor", "Master", "PhD"];
const EMPLOYMENT: [&str; 3] = ["Employed", "Self-employed", "Unemployed"];
const JOBS: [&str; 5] = ["Engineer", "Teacher", "Clerk", "Manager", "Nurse"];
const LOAN_TYPES: [&str; 4] = ["Home", "Auto", "Personal", "Education"];
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

/// Deterministic raw table shaped like the production training CSV
pub fn synthetic_table(n: usize) -> DataFrame {
    let idx: Vec<usize> = (0..n).collect();
    let has_loan: Vec<bool> = idx.iter().map(|i| i % 2 == 0).collect();
    let income: Vec<f64> = idx.iter().map(|i| 2000.0 + ((i * 137) % 50) as f64 * 100.0).collect();
    let savings_ratio: Vec<f64> = idx.iter().map(|i| ((i * 11) % 60) as f64 / 10.0).collect();

    df!(
        "user_id" => idx.iter().map(|i| *i as i64 + 1).collect::<Vec<_>>(),
        "record_date" => idx.iter().map(|i| format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1)).collect::<Vec<_>>(),
        "age" => idx.iter().map(|i| 22 + ((i * 7) % 40) as i64).collect::<Vec<_>>(),
        "gender" => idx.iter().map(|i| GENDERS[i % 3]).collect::<Vec<_>>(),
        "education_level" => idx.iter().map(|i| EDUCATION[i % 4]).collect::<Vec<_>>(),
        "employment_status" => idx.iter().map(|i| EMPLOYMENT[(i / 3) % 3]).collect::<Vec<_>>(),
        "job_title" => idx.iter().map(|i| JOBS[i % 5]).collect::<Vec<_>>(),
        "monthly_income_usd" => income.clone(),
        "monthly_expenses_usd" => idx.iter().map(|i| income[*i] * 0.5 + (i % 7) as f64 * 50.0).collect::<Vec<_>>(),
        "savings_usd" => idx.iter().map(|i| income[*i] * savings_ratio[*i]).collect::<Vec<_>>(),
        "has_loan" => has_loan.iter().map(|&l| if l { "Yes" } else { "No" }).collect::<Vec<_>>(),
        "loan_type" => idx.iter().map(|i| has_loan[*i].then(|| LOAN_TYPES[(i / 2) % 4])).collect::<Vec<_>>(),
        "loan_amount_usd" => idx.iter().map(|i| if has_loan[*i] { 5000.0 + (i % 10) as f64 * 1000.0 } else { 0.0 }).collect::<Vec<_>>(),
        "loan_term_months" => idx.iter().map(|i| if has_loan[*i] { 12 * (1 + (i % 5) as i64) } else { 0 }).collect::<Vec<_>>(),
        "monthly_emi_usd" => idx.iter().map(|i| if has_loan[*i] { 150.0 + (i % 6) as f64 * 40.0 } else { 0.0 }).collect::<Vec<_>>(),
        "loan_interest_rate_pct" => idx.iter().map(|i| if has_loan[*i] { 4.0 + (i % 8) as f64 * 0.75 } else { 0.0 }).collect::<Vec<_>>(),
        "debt_to_income_ratio" => idx.iter().map(|i| ((i * 13) % 50) as f64 / 10.0).collect::<Vec<_>>(),
        "credit_score" => idx.iter().map(|i| 550 + ((i * 37) % 300) as i64).collect::<Vec<_>>(),
        "savings_to_income_ratio" => savings_ratio,
        "region" => idx.iter().map(|i| REGIONS[i % 4]).collect::<Vec<_>>(),
    )
    .unwrap()
}

pub fn sample_request() -> FinancialRequest {
    FinancialRequest {
        age: 41,
        gender: "Female".to_string(),
        education_level: "Master".to_string(),
        employment_status: "Employed".to_string(),
        job_title: "Engineer".to_string(),
        monthly_income_usd: 6200.0,
        monthly_expenses_usd: 2800.0,
        savings_usd: 30000.0,
        has_loan: "Yes".to_string(),
        loan_type: Some("Home".to_string()),
        loan_amount_usd: 9000.0,
        loan_term_months: 36,
        monthly_emi_usd: 270.0,
        loan_interest_rate_pct: 5.5,
        region: "North".to_string(),
    }
}

pub fn sample_request_json() -> serde_json::Value {
    serde_json::to_value(sample_request()).unwrap()
}
