//! Classification metrics

use crate::error::{FinHealthError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Precision, recall and F1 for one class (or an average over classes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Accuracy, confusion matrix and per-class breakdown.
///
/// Classes are the sorted union of the values found in `y_true` and
/// `y_pred`. `confusion_matrix[i][j]` counts samples of true class `i`
/// predicted as class `j`. Undefined ratios (zero denominators) are 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<i64>,
    pub accuracy: f64,
    pub confusion_matrix: Vec<Vec<usize>>,
    pub per_class: Vec<ClassMetrics>,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub n_samples: usize,
}

impl ClassificationReport {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(FinHealthError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(FinHealthError::ValidationError(
                "cannot score an empty prediction set".into(),
            ));
        }

        let truth: Vec<i64> = y_true.iter().map(|v| v.round() as i64).collect();
        let preds: Vec<i64> = y_pred.iter().map(|v| v.round() as i64).collect();

        let classes: Vec<i64> = truth
            .iter()
            .chain(preds.iter())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let k = classes.len();
        let position = |c: i64| classes.binary_search(&c).unwrap_or(0);

        let mut matrix = vec![vec![0usize; k]; k];
        for (&t, &p) in truth.iter().zip(preds.iter()) {
            matrix[position(t)][position(p)] += 1;
        }

        let n = truth.len();
        let correct: usize = (0..k).map(|i| matrix[i][i]).sum();

        let per_class: Vec<ClassMetrics> = classes
            .iter()
            .enumerate()
            .map(|(i, &class)| {
                let tp = matrix[i][i];
                let predicted: usize = (0..k).map(|r| matrix[r][i]).sum();
                let support: usize = matrix[i].iter().sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                ClassMetrics {
                    label: class.to_string(),
                    precision,
                    recall,
                    f1_score: f1(precision, recall),
                    support,
                }
            })
            .collect();

        let macro_avg = average(&per_class, "macro avg", |_| 1.0 / k as f64, n);
        let weighted_avg = average(&per_class, "weighted avg", |m| m.support as f64 / n as f64, n);

        Ok(Self {
            classes,
            accuracy: correct as f64 / n as f64,
            confusion_matrix: matrix,
            per_class,
            macro_avg,
            weighted_avg,
            n_samples: n,
        })
    }

    /// Metrics for a single class, if it occurred
    pub fn class(&self, class: i64) -> Option<&ClassMetrics> {
        self.classes
            .binary_search(&class)
            .ok()
            .map(|i| &self.per_class[i])
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

fn average(per_class: &[ClassMetrics], label: &str, weight: impl Fn(&ClassMetrics) -> f64, n: usize) -> ClassMetrics {
    let sum = |f: fn(&ClassMetrics) -> f64| per_class.iter().map(|m| weight(m) * f(m)).sum::<f64>();
    ClassMetrics {
        label: label.to_string(),
        precision: sum(|m| m.precision),
        recall: sum(|m| m.recall),
        f1_score: sum(|m| m.f1_score),
        support: n,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = true, columns = predicted):")?;
        for row in &self.confusion_matrix {
            let cells: Vec<String> = row.iter().map(|c| format!("{:>6}", c)).collect();
            writeln!(f, "  [{}]", cells.join(""))?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for m in &self.per_class {
            write_row(f, m)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.n_samples
        )?;
        write_row(f, &self.macro_avg)?;
        write_row(f, &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
        m.label, m.precision, m.recall, m.f1_score, m.support
    )
}
