//! Per-conclusion co-occurrence counts.
//!
//! Every `(question, answer)` pair of the graph gets a stable QA-index when
//! the matrix is created. Cell `[i][j]` counts the sessions in which both
//! QA-index `i` and QA-index `j` were observed; the diagonal stays zero.

use crate::correlation::{self, CorrelationScores, CorrelationTable, ScoringConfig};
use crate::error::{QuerentError, Result};
use ndarray::{Array2, ArrayView2};
use querent_core::graph::QueryGraph;
use querent_core::node::QueryNode;
use querent_core::types::QaKey;
use std::collections::HashMap;
use tracing::debug;

/// Symmetric co-occurrence matrix over QA-indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMatrix {
    keys: Vec<QaKey>,
    index: HashMap<QaKey, usize>,
    data: Array2<u64>,
    sessions: u64,
}

impl ResultMatrix {
    /// Index every answer of every node: nodes in the given order, answers
    /// in label order.
    pub fn new<'a, I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = &'a QueryNode>,
    {
        let keys: Vec<QaKey> = nodes
            .into_iter()
            .flat_map(|node| node.answers().map(|answer| answer.key()))
            .collect();
        let index = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), i))
            .collect();
        let n = keys.len();

        Self {
            keys,
            index,
            data: Array2::zeros((n, n)),
            sessions: 0,
        }
    }

    pub fn from_graph(graph: &QueryGraph) -> Self {
        Self::new(graph.nodes())
    }

    /// Fold one session into the counts.
    ///
    /// Every unordered pair of distinct positions `(p, q)` increments both
    /// `[idx(p)][idx(q)]` and `[idx(q)][idx(p)]`. All pairs are validated
    /// before any cell changes, so a failed update leaves the matrix as it
    /// was.
    pub fn update_matrix(&mut self, questions: &[String], answers: &[String]) -> Result<()> {
        if questions.len() != answers.len() {
            return Err(QuerentError::LengthMismatch {
                questions: questions.len(),
                answers: answers.len(),
            });
        }

        let mut indices = Vec::with_capacity(questions.len());
        for (pos, (question, answer)) in questions.iter().zip(answers).enumerate() {
            if questions[..pos].contains(question) {
                return Err(QuerentError::RepeatedQuestion(question.clone()));
            }
            let key = QaKey::new(question.clone(), answer.clone());
            match self.index.get(&key) {
                Some(&i) => indices.push(i),
                None => return Err(QuerentError::UnknownQaPair(key)),
            }
        }

        for p in 0..indices.len() {
            for q in (p + 1)..indices.len() {
                let (i, j) = (indices[p], indices[q]);
                self.data[[i, j]] += 1;
                self.data[[j, i]] += 1;
            }
        }
        self.sessions += 1;

        debug!(pairs = indices.len(), sessions = self.sessions, "matrix updated");
        Ok(())
    }

    /// QA-index of a pair.
    pub fn index_of(&self, key: &QaKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Pairs in QA-index order.
    pub fn keys(&self) -> &[QaKey] {
        &self.keys
    }

    /// Number of QA-indices.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Co-occurrence count of two pairs.
    pub fn count(&self, a: &QaKey, b: &QaKey) -> Option<u64> {
        Some(self.data[[self.index_of(a)?, self.index_of(b)?]])
    }

    pub fn data(&self) -> ArrayView2<'_, u64> {
        self.data.view()
    }

    /// Sessions folded in so far.
    pub fn session_count(&self) -> u64 {
        self.sessions
    }

    /// Pairwise histogram-intersection similarity between columns.
    pub fn correlation_table(&self, config: &ScoringConfig) -> Result<CorrelationTable> {
        config.validate()?;
        let counts = self.data.mapv(|c| c as f64);
        let decimals = config.decimals;
        CorrelationTable::compute(self.keys.clone(), counts.view(), |a, b| {
            correlation::histogram_intersection_with(a, b, decimals)
        })
    }

    /// Normalized variance scores with the default [`ScoringConfig`].
    pub fn get_correlation(&self) -> Result<CorrelationScores> {
        self.get_correlation_with(&ScoringConfig::default())
    }

    /// For each `(question, answer)`: how much each other question's answer
    /// similarities vary, normalized to sum to one.
    pub fn get_correlation_with(&self, config: &ScoringConfig) -> Result<CorrelationScores> {
        let table = self.correlation_table(config)?;
        correlation::score_rows(&table, config)
    }
}
