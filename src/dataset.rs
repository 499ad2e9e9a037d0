//! Input preparation and validation
//!
//! Everything here runs before a training request reaches the estimators.
//! Failures are [`HeveaError::ValidationError`]s: the caller has to fix the
//! input and no model is trained.

use crate::error::{HeveaError, Result};
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Most marker columns fed to the phenotype regressors
pub const MAX_MARKER_COLUMNS: usize = 5000;

/// Principal components used as features for clone-group models
pub const DEFAULT_COMPONENTS: usize = 3;

/// Clone-name fragments and the group they map to, checked in order
pub const CLONE_GROUPS: [(&str, usize); 6] = [
    ("RRIM", 0),
    ("GT1", 1),
    ("PB235", 2),
    ("IAN", 3),
    ("PR107", 4),
    ("AVROS", 5),
];

/// Tabular input as stored on disk
///
/// Only `features` is mandatory; a file carries either class `labels`,
/// clone names to derive them from, or a regression `target`. Named
/// phenotype `traits` may hold `null` for missing measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clones: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traits: BTreeMap<String, Vec<Option<f64>>>,
}

impl Dataset {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn feature_matrix(&self) -> Result<Array2<f64>> {
        matrix_from_rows(&self.features)
    }

    /// Explicit labels, or clone groups when only clone names are present
    pub fn class_labels(&self) -> Result<Array1<usize>> {
        if !self.labels.is_empty() {
            Ok(Array1::from_vec(self.labels.clone()))
        } else if !self.clones.is_empty() {
            Ok(encode_clone_groups(&self.clones))
        } else {
            Err(HeveaError::ValidationError(
                "dataset has neither labels nor clone names".to_string(),
            ))
        }
    }

    pub fn regression_target(&self) -> Result<Array1<f64>> {
        if self.target.is_empty() {
            return Err(HeveaError::ValidationError(
                "dataset has no regression target".to_string(),
            ));
        }
        Ok(Array1::from_vec(self.target.clone()))
    }

    /// The regression target (as `"target"`) followed by the named traits;
    /// missing values become NaN
    pub fn phenotype_columns(&self) -> Vec<(String, Vec<f64>)> {
        let mut columns = Vec::with_capacity(self.traits.len() + 1);
        if !self.target.is_empty() && !self.traits.contains_key("target") {
            columns.push(("target".to_string(), self.target.clone()));
        }
        for (name, values) in &self.traits {
            columns.push((name.clone(), values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()));
        }
        columns
    }
}

/// Descriptive statistics of one phenotype trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSummary {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Number of finite values the statistics cover
    pub count: usize,
}

/// Summarize the finite values of a trait; `None` when there are none
pub fn trait_summary(values: &[f64]) -> Option<TraitSummary> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(TraitSummary {
        mean,
        std: variance.sqrt(),
        min: finite.iter().copied().fold(f64::INFINITY, f64::min),
        max: finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        count: finite.len(),
    })
}

/// Pearson correlation over the rows where both values are finite
///
/// Returns 0.0 when either side has no variance or no rows are shared.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if pairs.is_empty() {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut num, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (da, db) = (x - mean_a, y - mean_b);
        num += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom > 0.0 {
        num / denom
    } else {
        0.0
    }
}

/// Symmetric matrix of pairwise trait correlations, in column order
pub fn trait_correlations<S: AsRef<str>>(columns: &[(S, Vec<f64>)]) -> Array2<f64> {
    let n = columns.len();
    let mut matrix = Array2::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i].1, &columns[j].1);
            matrix[[i, j]] = r;
            matrix[[j, i]] = r;
        }
    }
    matrix
}

/// Build a matrix from row vectors, rejecting ragged input
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let n_cols = match rows.first() {
        Some(first) => first.len(),
        None => return Err(HeveaError::ValidationError("empty feature matrix".to_string())),
    };

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(HeveaError::ShapeError {
            expected: format!("{} columns in every row", n_cols),
            actual: format!("{} columns in row {}", row.len(), i),
        });
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Array2::from_shape_vec((rows.len(), n_cols), flat)?)
}

fn check_common(x: &Array2<f64>, n_targets: usize, min_samples: usize) -> Result<()> {
    if x.nrows() != n_targets {
        return Err(HeveaError::ValidationError(format!(
            "features and labels must have the same length ({} vs {})",
            x.nrows(),
            n_targets
        )));
    }
    if x.nrows() < min_samples {
        return Err(HeveaError::ValidationError(format!(
            "insufficient samples: need at least {}, got {}",
            min_samples,
            x.nrows()
        )));
    }
    if x.ncols() == 0 {
        return Err(HeveaError::ValidationError("no feature columns".to_string()));
    }
    if let Some(pos) = x.iter().position(|v| !v.is_finite()) {
        return Err(HeveaError::ValidationError(format!(
            "non-finite value at row {}, column {}",
            pos / x.ncols(),
            pos % x.ncols()
        )));
    }
    Ok(())
}

/// Checks a classification request must pass before any model runs
pub fn validate_classification(x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
    check_common(x, y.len(), 2)?;

    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    if classes.len() < 2 {
        return Err(HeveaError::ValidationError(format!(
            "insufficient classes: need at least 2, got {}",
            classes.len()
        )));
    }
    Ok(())
}

/// Checks a regression request must pass before any model runs
pub fn validate_regression(x: &Array2<f64>, y: &Array1<f64>, min_samples: usize) -> Result<()> {
    check_common(x, y.len(), min_samples.max(2))?;
    if y.iter().any(|v| !v.is_finite()) {
        return Err(HeveaError::ValidationError(
            "regression target contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

/// Cut markers and phenotype values to the rows they have in common
///
/// Non-finite phenotype values are dropped first, then both sides are
/// truncated to the shorter length.
pub fn align_markers_and_phenotype(
    markers: &Array2<f64>,
    phenotype: &[f64],
) -> (Array2<f64>, Array1<f64>) {
    let target: Vec<f64> = phenotype.iter().copied().filter(|v| v.is_finite()).collect();
    let n = markers.nrows().min(target.len());
    if n != markers.nrows() || n != target.len() {
        warn!(
            markers = markers.nrows(),
            phenotypes = target.len(),
            kept = n,
            "marker and phenotype row counts differ, truncating"
        );
    }
    (
        markers.slice(s![..n, ..]).to_owned(),
        Array1::from_iter(target.into_iter().take(n)),
    )
}

/// Keep at most the first `max_columns` columns
pub fn limit_columns(x: &Array2<f64>, max_columns: usize) -> Array2<f64> {
    let n = x.ncols().min(max_columns);
    x.slice(s![.., ..n]).to_owned()
}

/// Leading `k` principal-component scores (fewer if the input is narrower)
pub fn leading_components(scores: &Array2<f64>, k: usize) -> Array2<f64> {
    limit_columns(scores, k)
}

/// Group index for a clone name; unknown names fall into group 0
pub fn clone_group(name: &str) -> usize {
    CLONE_GROUPS
        .iter()
        .find(|(fragment, _)| name.contains(fragment))
        .map_or(0, |&(_, group)| group)
}

pub fn encode_clone_groups<S: AsRef<str>>(names: &[S]) -> Array1<usize> {
    names.iter().map(|n| clone_group(n.as_ref())).collect()
}
