//! Similarity tables and variance scoring.
//!
//! A [`CorrelationTable`] scores every pair of labeled columns with a
//! caller-supplied metric. For co-occurrence counts the metric is
//! [`histogram_intersection`]: two columns are treated as count
//! distributions and their overlap is measured.
//!
//! Scoring then asks, for each `(question, answer)` row: among the answers
//! of every *other* question, how spread out are their similarities to this
//! row? A question whose answers all look alike carries little information;
//! one whose answers differ a lot discriminates. The spreads (population
//! variance) are normalized per row so they sum to one.

use crate::error::{QuerentError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2, Zip};
use querent_core::types::QaKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// `other question -> normalized variance`.
pub type QuestionScores = BTreeMap<String, f64>;

/// `question -> answer -> other question -> normalized variance`.
pub type CorrelationScores = BTreeMap<String, BTreeMap<String, QuestionScores>>;

/// What to do when every variance in a row is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZeroVariancePolicy {
    /// Spread the weight evenly over the other questions.
    #[default]
    Uniform,
    /// Fail with [`QuerentError::ZeroVariance`].
    Error,
}

/// Scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub zero_variance: ZeroVariancePolicy,
    /// Decimal places the similarity metric rounds to.
    pub decimals: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            zero_variance: ZeroVariancePolicy::Uniform,
            decimals: 1,
        }
    }
}

/// Largest rounding precision [`ScoringConfig`] accepts; `f64` carries
/// no more significant decimal digits than this.
pub const MAX_DECIMALS: u32 = 15;

impl ScoringConfig {
    /// Reject settings that cannot produce finite scores.
    pub fn validate(&self) -> Result<()> {
        if self.decimals > MAX_DECIMALS {
            return Err(QuerentError::InvalidConfig(format!(
                "decimals must be at most {}, got {}",
                MAX_DECIMALS, self.decimals
            )));
        }
        Ok(())
    }

    pub fn with_zero_variance(mut self, policy: ZeroVariancePolicy) -> Self {
        self.zero_variance = policy;
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }
}

/// Sum of the elementwise minimum of two count vectors, rounded to one
/// decimal place. Halves round to even.
///
/// # Panics
///
/// Panics if the vectors differ in length.
pub fn histogram_intersection(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    histogram_intersection_with(a, b, 1)
}

/// [`histogram_intersection`] rounded to `decimals` places, capped at
/// [`MAX_DECIMALS`].
pub fn histogram_intersection_with(a: ArrayView1<f64>, b: ArrayView1<f64>, decimals: u32) -> f64 {
    let overlap = Zip::from(&a).and(&b).map_collect(|&x, &y| x.min(y)).sum();
    round_to(overlap, decimals)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    (value * scale).round_ties_even() / scale
}

/// Population variance; zero for fewer than two values.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Labeled square table of pairwise column similarities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationTable {
    labels: Vec<QaKey>,
    values: Array2<f64>,
}

impl CorrelationTable {
    /// Score every pair of columns of `data` with `metric`.
    ///
    /// Each unordered pair is evaluated once and mirrored, so the table is
    /// symmetric; the diagonal holds each column scored against itself.
    pub fn compute<F>(labels: Vec<QaKey>, data: ArrayView2<f64>, mut metric: F) -> Result<Self>
    where
        F: FnMut(ArrayView1<f64>, ArrayView1<f64>) -> f64,
    {
        let n = data.ncols();
        if labels.len() != n {
            return Err(QuerentError::ShapeMismatch {
                labels: labels.len(),
                columns: n,
            });
        }

        let mut values = Array2::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let score = metric(data.column(i), data.column(j));
                values[[i, j]] = score;
                values[[j, i]] = score;
            }
        }
        Ok(Self { labels, values })
    }

    pub fn labels(&self) -> &[QaKey] {
        &self.labels
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn get(&self, a: &QaKey, b: &QaKey) -> Option<f64> {
        let i = self.labels.iter().position(|k| k == a)?;
        let j = self.labels.iter().position(|k| k == b)?;
        Some(self.values[[i, j]])
    }

    pub fn row(&self, key: &QaKey) -> Option<ArrayView1<'_, f64>> {
        let i = self.labels.iter().position(|k| k == key)?;
        Some(self.values.row(i))
    }
}

impl fmt::Display for CorrelationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.labels.iter().map(QaKey::to_string).collect();
        let width = names.iter().map(String::len).max().unwrap_or(0).max(6);

        write!(f, "{:width$}", "", width = width)?;
        for name in &names {
            write!(f, " {:>width$}", name, width = width)?;
        }
        writeln!(f)?;
        for (i, name) in names.iter().enumerate() {
            write!(f, "{:width$}", name, width = width)?;
            for j in 0..names.len() {
                write!(f, " {:>width$.1}", self.values[[i, j]], width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Normalized variance scores for every row of `table`.
pub fn score_rows(table: &CorrelationTable, config: &ScoringConfig) -> Result<CorrelationScores> {
    config.validate()?;
    let mut scores = CorrelationScores::new();
    for (i, key) in table.labels.iter().enumerate() {
        let row = score_row(table, i, config)?;
        scores
            .entry(key.question.clone())
            .or_default()
            .insert(key.answer.clone(), row);
    }
    Ok(scores)
}

fn score_row(table: &CorrelationTable, row: usize, config: &ScoringConfig) -> Result<QuestionScores> {
    let own = &table.labels[row];

    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (j, other) in table.labels.iter().enumerate() {
        if other.question == own.question {
            continue;
        }
        grouped
            .entry(other.question.as_str())
            .or_default()
            .push(table.values[[row, j]]);
    }

    let mut spread: QuestionScores = grouped
        .into_iter()
        .map(|(question, values)| (question.to_string(), variance(&values)))
        .collect();
    let total: f64 = spread.values().sum();
    if !total.is_finite() {
        return Err(QuerentError::NonFiniteVariance(own.clone()));
    }

    if total > 0.0 {
        for value in spread.values_mut() {
            *value /= total;
        }
        return Ok(spread);
    }

    match config.zero_variance {
        ZeroVariancePolicy::Error => Err(QuerentError::ZeroVariance(own.clone())),
        ZeroVariancePolicy::Uniform => {
            if !spread.is_empty() {
                warn!(row = %own, questions = spread.len(), "zero total variance, using uniform scores");
                let share = 1.0 / spread.len() as f64;
                for value in spread.values_mut() {
                    *value = share;
                }
            }
            Ok(spread)
        }
    }
}
