//! Classification and regression metrics
//!
//! Classification scores are macro-averaged: every class observed in either
//! the true or the predicted labels counts once, whatever its support.

use crate::error::{HeveaError, Result};
use serde::{Deserialize, Serialize};

/// Scores derived from one (true, predicted) label pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    /// Fraction of exact matches
    pub accuracy: f64,
    /// Mean of per-class (tp + tn) / total
    pub balanced_accuracy: f64,
    /// Macro precision
    pub precision: f64,
    /// Macro recall
    pub recall: f64,
    /// Macro F1
    pub f1_score: f64,
    /// Rows = true class, columns = predicted class, both in `classes` order
    pub confusion_matrix: Vec<Vec<usize>>,
    /// Sorted union of observed labels
    pub classes: Vec<usize>,
}

/// Per-class counts read off the confusion matrix
#[derive(Debug, Clone, Copy, PartialEq)]
struct ClassCounts {
    tp: usize,
    fp: usize,
    fn_: usize,
    tn: usize,
}

impl ClassificationMetrics {
    /// Score predicted labels against the truth
    pub fn compute(y_true: &[usize], y_pred: &[usize]) -> Result<Self> {
        check_lengths(y_true.len(), y_pred.len())?;

        let classes = class_set(y_true, y_pred);
        let confusion_matrix = confusion_matrix(y_true, y_pred, &classes);
        let total = y_true.len();
        let n_classes = classes.len() as f64;

        let mut balanced = 0.0;
        let mut precision = 0.0;
        let mut recall = 0.0;
        let mut f1 = 0.0;

        for c in 0..classes.len() {
            let counts = class_counts(&confusion_matrix, c, total);
            let p = ratio(counts.tp, counts.tp + counts.fp);
            let r = ratio(counts.tp, counts.tp + counts.fn_);
            precision += p;
            recall += r;
            f1 += if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };
            balanced += ratio(counts.tp + counts.tn, total);
        }

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();

        Ok(Self {
            accuracy: ratio(correct, total),
            balanced_accuracy: balanced / n_classes,
            precision: precision / n_classes,
            recall: recall / n_classes,
            f1_score: f1 / n_classes,
            confusion_matrix,
            classes,
        })
    }
}

/// Sorted union of the distinct labels in both vectors
pub fn class_set(y_true: &[usize], y_pred: &[usize]) -> Vec<usize> {
    let mut classes: Vec<usize> = y_true.iter().chain(y_pred).copied().collect();
    classes.sort_unstable();
    classes.dedup();
    classes
}

/// Square count grid indexed by position in `classes`
///
/// Labels absent from `classes` are ignored.
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], classes: &[usize]) -> Vec<Vec<usize>> {
    let n = classes.len();
    let mut matrix = vec![vec![0usize; n]; n];
    for (t, p) in y_true.iter().zip(y_pred) {
        if let (Ok(ti), Ok(pi)) = (classes.binary_search(t), classes.binary_search(p)) {
            matrix[ti][pi] += 1;
        }
    }
    matrix
}

fn class_counts(matrix: &[Vec<usize>], c: usize, total: usize) -> ClassCounts {
    let tp = matrix[c][c];
    let fp = matrix.iter().map(|row| row[c]).sum::<usize>() - tp;
    let fn_ = matrix[c].iter().sum::<usize>() - tp;
    ClassCounts {
        tp,
        fp,
        fn_,
        tn: total - tp - fp - fn_,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Scores for continuous predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Coefficient of determination; 0.0 when the truth has no variance
    pub r2: f64,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        check_lengths(y_true.len(), y_pred.len())?;

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true.iter().zip(y_pred).map(|(t, p)| t - p).collect();

        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let mse = ss_res / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();

        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Ok(Self {
            r2,
            mse,
            rmse: mse.sqrt(),
            mae,
        })
    }
}

fn check_lengths(n_true: usize, n_pred: usize) -> Result<()> {
    if n_true != n_pred {
        return Err(HeveaError::ShapeError {
            expected: format!("{} predictions", n_true),
            actual: format!("{} predictions", n_pred),
        });
    }
    if n_true == 0 {
        return Err(HeveaError::ValidationError(
            "cannot score an empty prediction set".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_scenario() {
        let m = ClassificationMetrics::compute(&[0, 0, 1, 1], &[0, 1, 1, 1]).unwrap();
        assert_eq!(m.confusion_matrix, vec![vec![1, 1], vec![0, 2]]);
        assert_eq!(m.accuracy, 0.75);
        // class 0: p=1, r=0.5; class 1: p=2/3, r=1
        assert!((m.precision - (1.0 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
        assert!((m.recall - 0.75).abs() < 1e-12);
        // per-class accuracy is 0.75 for both classes
        assert!((m.balanced_accuracy - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_prediction_is_diagonal() {
        let y = [3, 1, 4, 1, 5, 9, 2, 6];
        let m = ClassificationMetrics::compute(&y, &y).unwrap();
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.f1_score, 1.0);
        for (i, row) in m.confusion_matrix.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if i != j {
                    assert_eq!(v, 0);
                }
            }
        }
    }

    #[test]
    fn test_class_set_is_union_of_labels() {
        let m = ClassificationMetrics::compute(&[0, 0, 0], &[0, 7, 0]).unwrap();
        assert_eq!(m.classes, vec![0, 7]);
        // class 7 has no true support: precision 0, recall 0
        assert!((m.precision - 0.5).abs() < 1e-12);
        assert!((m.recall - (2.0 / 3.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ignored_rare_class_is_penalized() {
        let y_true = [0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let y_pred = [0; 10];
        let m = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();
        assert_eq!(m.accuracy, 0.9);
        assert!(m.recall < m.accuracy);
        assert!(m.f1_score < m.accuracy);
    }

    #[test]
    fn test_metrics_are_deterministic() {
        let y_true = [0, 1, 2, 2, 1, 0, 1];
        let y_pred = [0, 2, 2, 1, 1, 0, 0];
        let a = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();
        let b = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ClassificationMetrics::compute(&[0, 1], &[0]).is_err());
        assert!(RegressionMetrics::compute(&[], &[]).is_err());
    }

    #[test]
    fn test_regression_perfect_and_mean() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let m = RegressionMetrics::compute(&y, &y).unwrap();
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);

        let m = RegressionMetrics::compute(&y, &[2.5, 2.5, 2.5, 2.5]).unwrap();
        assert!(m.r2.abs() < 1e-12);

        let m = RegressionMetrics::compute(&y, &[2.0, 2.0, 2.0, 2.0]).unwrap();
        assert!(m.r2 < 0.0);
        assert!((m.mae - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_regression_zero_variance_truth() {
        let m = RegressionMetrics::compute(&[5.0, 5.0, 5.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.r2, 0.0);
        assert!(m.r2.is_finite());
    }
}
