//! Error types for graph construction and lookup.

use thiserror::Error;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while assembling or querying a [`QueryGraph`](crate::graph::QueryGraph).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Question label used twice.
    #[error("Duplicate question: {0}")]
    DuplicateQuestion(String),

    /// Answer label used twice within one question.
    #[error("Duplicate answer {answer} for question {question}")]
    DuplicateAnswer { question: String, answer: String },

    /// Question labeled with the root label.
    #[error("Label is reserved for the synthetic root: {0}")]
    ReservedLabel(String),

    /// Follow-up names a question missing from the graph.
    #[error("Follow-up {follow_up} of {question}/{answer} does not name a question")]
    DanglingFollowUp {
        question: String,
        answer: String,
        follow_up: String,
    },

    /// Relevance weight negative or not finite.
    #[error("Invalid relevance {weight} for question {question} (must be finite and non-negative)")]
    InvalidRelevance { question: String, weight: f64 },

    /// Question not found.
    #[error("Question not found: {0}")]
    QuestionNotFound(String),
}

impl GraphError {
    pub fn question_not_found(label: impl Into<String>) -> Self {
        GraphError::QuestionNotFound(label.into())
    }
}
