//! Error types for sessions, matrices and scoring.
//!
//! Three kinds of failure are distinguished:
//! - usage errors (bad answer label, mismatched input, unknown conclusion)
//!   leave all state untouched and can be retried,
//! - invariant violations (a question asked twice, a traversal that fails
//!   to advance) abort the session they occur in,
//! - numeric errors raised by scoring when configured to fail.

use querent_core::error::GraphError;
use querent_core::types::{QaKey, SessionId};
use thiserror::Error;

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, QuerentError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuerentError {
    /// Graph construction or lookup failed.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Answer label not offered by the current question.
    #[error("Unknown answer {answer} for question {question}")]
    UnknownAnswer { question: String, answer: String },

    /// Question and answer lists differ in length.
    #[error("Length mismatch: {questions} questions but {answers} answers")]
    LengthMismatch { questions: usize, answers: usize },

    /// Conclusion has no registered matrix.
    #[error("Unknown conclusion: {0}")]
    UnknownConclusion(String),

    /// Result carries no conclusion to route by.
    #[error("Session result has no conclusion")]
    MissingConclusion,

    /// Pair outside the matrix's QA-index space.
    #[error("Unknown question/answer pair: {0}")]
    UnknownQaPair(QaKey),

    /// Session already terminal.
    #[error("Session {0} already reached a terminal state")]
    SessionFinished(SessionId),

    /// Session still active where a complete result is required.
    #[error("Session {0} has not reached a terminal state")]
    SessionNotTerminal(SessionId),

    /// Question asked twice in one session.
    #[error("Question asked twice: {0}")]
    RepeatedQuestion(String),

    /// Selector returned the current or an already asked question.
    #[error("Traversal stalled after {question}: selector returned {next}")]
    StalledTraversal { question: String, next: String },

    /// Session rejected further input after an invariant violation.
    #[error("Session {0} was aborted after an invariant violation")]
    SessionAborted(SessionId),

    /// Label count does not match the table's column count.
    #[error("Shape mismatch: {labels} labels for {columns} columns")]
    ShapeMismatch { labels: usize, columns: usize },

    /// Every variance in a row is zero and the policy is strict.
    #[error("Zero total variance in row {0}")]
    ZeroVariance(QaKey),

    /// A row's variances do not sum to a finite number.
    #[error("Non-finite total variance in row {0}")]
    NonFiniteVariance(QaKey),

    /// Scoring configuration out of range.
    #[error("Invalid scoring config: {0}")]
    InvalidConfig(String),

    /// Report export failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for QuerentError {
    fn from(e: serde_json::Error) -> Self {
        QuerentError::Serialization(e.to_string())
    }
}

impl QuerentError {
    /// Whether this error reports a broken traversal invariant rather than
    /// bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            QuerentError::RepeatedQuestion(_)
                | QuerentError::StalledTraversal { .. }
                | QuerentError::SessionAborted(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_violations_are_fatal() {
        assert!(QuerentError::RepeatedQuestion("Q1".into()).is_fatal());
        assert!(QuerentError::StalledTraversal {
            question: "Q1".into(),
            next: "Q1".into()
        }
        .is_fatal());
        assert!(!QuerentError::UnknownConclusion("flu".into()).is_fatal());
        assert!(!QuerentError::LengthMismatch { questions: 2, answers: 1 }.is_fatal());
    }

    #[test]
    fn numeric_and_config_errors_name_their_cause() {
        let err = QuerentError::NonFiniteVariance(QaKey::new("Q1", "a"));
        assert_eq!(err.to_string(), "Non-finite total variance in row Q1=a");
        assert!(!err.is_fatal());

        let err = QuerentError::InvalidConfig("decimals must be at most 15, got 400".into());
        assert!(err.to_string().contains("400"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn graph_errors_convert() {
        let err: QuerentError = GraphError::QuestionNotFound("Q9".into()).into();
        assert_eq!(err.to_string(), "Graph error: Question not found: Q9");
    }
}
