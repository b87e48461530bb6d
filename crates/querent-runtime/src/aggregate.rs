//! Session aggregation: routes finished sessions into per-conclusion
//! co-occurrence matrices.
//!
//! The set of conclusions is fixed when the aggregator is created. Each
//! conclusion owns its own [`ResultMatrix`]; the aggregator is the only
//! writer of those matrices.

use crate::correlation::{CorrelationScores, ScoringConfig};
use crate::error::{QuerentError, Result};
use crate::matrix::ResultMatrix;
use crate::session::{QuerySession, SessionResult};
use querent_core::graph::QueryGraph;
use querent_core::node::QueryNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Owns one [`ResultMatrix`] per conclusion and the history of results.
#[derive(Debug, Clone)]
pub struct SessionResults {
    results: Vec<SessionResult>,
    matrices: BTreeMap<String, ResultMatrix>,
}

impl SessionResults {
    pub fn new<C, S>(nodes: &[QueryNode], conclusions: C) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let matrices = conclusions
            .into_iter()
            .map(|c| (c.into(), ResultMatrix::new(nodes)))
            .collect();
        Self {
            results: Vec::new(),
            matrices,
        }
    }

    pub fn from_graph<C, S>(graph: &QueryGraph, conclusions: C) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(graph.nodes(), conclusions)
    }

    /// Fold `result` into the matrix of its conclusion and keep it.
    ///
    /// The result is only recorded if the matrix accepted it.
    pub fn add_result(&mut self, result: SessionResult) -> Result<()> {
        let conclusion = result.conclusion().ok_or(QuerentError::MissingConclusion)?;
        let matrix = self
            .matrices
            .get_mut(conclusion)
            .ok_or_else(|| QuerentError::UnknownConclusion(conclusion.to_string()))?;
        matrix.update_matrix(result.questions(), result.answers())?;

        info!(
            session = %result.id,
            conclusion,
            asked = result.len(),
            total = self.results.len() + 1,
            "session aggregated"
        );
        self.results.push(result);
        Ok(())
    }

    /// Add the result of a session that has run to completion.
    pub fn record(&mut self, session: &QuerySession<'_>) -> Result<()> {
        self.add_result(session.finish()?)
    }

    pub fn matrix(&self, conclusion: &str) -> Option<&ResultMatrix> {
        self.matrices.get(conclusion)
    }

    /// Registered conclusions, in label order.
    pub fn conclusions(&self) -> impl Iterator<Item = &str> {
        self.matrices.keys().map(String::as_str)
    }

    pub fn results(&self) -> &[SessionResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Scores for every conclusion.
    pub fn correlations(&self, config: &ScoringConfig) -> Result<BTreeMap<String, CorrelationScores>> {
        self.matrices
            .iter()
            .map(|(conclusion, matrix)| -> Result<(String, CorrelationScores)> {
                Ok((conclusion.clone(), matrix.get_correlation_with(config)?))
            })
            .collect()
    }

    /// Serializable summary of every conclusion's scores.
    pub fn report(&self, config: &ScoringConfig) -> Result<CorrelationReport> {
        let conclusions = self
            .matrices
            .iter()
            .map(|(conclusion, matrix)| -> Result<ConclusionReport> {
                Ok(ConclusionReport {
                    conclusion: conclusion.clone(),
                    sessions: matrix.session_count(),
                    scores: matrix.get_correlation_with(config)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CorrelationReport {
            total_sessions: self.results.len(),
            config: config.clone(),
            conclusions,
        })
    }
}

/// Scores of one conclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConclusionReport {
    pub conclusion: String,
    pub sessions: u64,
    pub scores: CorrelationScores,
}

/// Snapshot of all conclusions' scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub total_sessions: usize,
    pub config: ScoringConfig,
    pub conclusions: Vec<ConclusionReport>,
}

impl CorrelationReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn conclusion(&self, label: &str) -> Option<&ConclusionReport> {
        self.conclusions.iter().find(|c| c.conclusion == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querent_core::types::QaKey;

    fn nodes() -> Vec<QueryNode> {
        vec![
            QueryNode::new("Q1").with_answers(["a", "b"]),
            QueryNode::new("Q2").with_answers(["c", "d"]),
            QueryNode::new("Q3").with_answers(["e", "f"]),
        ]
    }

    #[test]
    fn results_route_to_their_conclusion() {
        let mut results = SessionResults::new(&nodes(), ["flu", "cold"]);
        results
            .add_result(SessionResult::new(Some("flu"), ["Q1", "Q2"], ["a", "c"]))
            .unwrap();

        let qa = |q: &str, a: &str| QaKey::new(q, a);
        let flu = results.matrix("flu").unwrap();
        let cold = results.matrix("cold").unwrap();
        assert_eq!(flu.count(&qa("Q1", "a"), &qa("Q2", "c")), Some(1));
        assert_eq!(cold.count(&qa("Q1", "a"), &qa("Q2", "c")), Some(0));
        assert_eq!(flu.session_count(), 1);
        assert_eq!(cold.session_count(), 0);
        assert_eq!(results.len(), 1);
        assert_eq!(results.conclusions().collect::<Vec<_>>(), vec!["cold", "flu"]);
    }

    #[test]
    fn unknown_conclusion_is_rejected_without_recording() {
        let mut results = SessionResults::new(&nodes(), ["flu"]);
        let err = results
            .add_result(SessionResult::new(Some("measles"), ["Q1"], ["a"]))
            .unwrap_err();
        assert_eq!(err, QuerentError::UnknownConclusion("measles".into()));

        let err = results
            .add_result(SessionResult::new(None, ["Q1"], ["a"]))
            .unwrap_err();
        assert_eq!(err, QuerentError::MissingConclusion);
        assert!(results.is_empty());
    }

    #[test]
    fn rejected_update_is_not_recorded() {
        let mut results = SessionResults::new(&nodes(), ["flu"]);
        let err = results
            .add_result(SessionResult::new(Some("flu"), ["Q1", "Q2"], ["a"]))
            .unwrap_err();
        assert_eq!(err, QuerentError::LengthMismatch { questions: 2, answers: 1 });
        assert!(results.is_empty());
        assert_eq!(results.matrix("flu").unwrap().session_count(), 0);
    }

    #[test]
    fn record_rejects_unfinished_sessions() {
        let mut graph = QueryGraph::new(nodes()).unwrap();
        let mut results = SessionResults::from_graph(&graph, ["flu"]);

        let mut session = QuerySession::new(&mut graph, Some("flu")).unwrap();
        session.receive_answer_for_next_question("a").unwrap();
        let err = results.record(&session).unwrap_err();
        assert_eq!(err, QuerentError::SessionNotTerminal(session.id()));
        assert!(results.is_empty());
        assert_eq!(results.matrix("flu").unwrap().session_count(), 0);
    }

    #[test]
    fn record_rejects_aborted_sessions() {
        let mut graph = QueryGraph::new(nodes()).unwrap();
        let mut results = SessionResults::from_graph(&graph, ["flu"]);

        let stuck = |_: &QueryGraph, answer: &querent_core::node::AnswerNode, _: &[String]| {
            Some(if answer.is_root() { "Q1".to_string() } else { answer.question().to_string() })
        };
        let mut session = QuerySession::with_selector(&mut graph, Some("flu"), stuck).unwrap();
        assert!(session.receive_answer_for_next_question("a").is_err());

        let err = results.record(&session).unwrap_err();
        assert_eq!(err, QuerentError::SessionAborted(session.id()));
        assert!(results.is_empty());
        assert!(results.matrix("flu").unwrap().data().iter().all(|&c| c == 0));
    }

    #[test]
    fn report_covers_every_conclusion() {
        let mut results = SessionResults::new(&nodes(), ["flu", "cold"]);
        results
            .add_result(SessionResult::new(Some("flu"), ["Q1", "Q2", "Q3"], ["a", "c", "e"]))
            .unwrap();

        let report = results.report(&ScoringConfig::default()).unwrap();
        assert_eq!(report.total_sessions, 1);
        assert_eq!(report.conclusions.len(), 2);
        assert_eq!(report.conclusion("flu").unwrap().sessions, 1);
        assert_eq!(report.conclusion("cold").unwrap().sessions, 0);

        let json = report.to_json().unwrap();
        let parsed: CorrelationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.conclusions.len(), 2);
        assert!(json.contains("\"flu\""));

        let all = results.correlations(&ScoringConfig::default()).unwrap();
        assert_eq!(all["flu"], report.conclusion("flu").unwrap().scores);
    }
}
