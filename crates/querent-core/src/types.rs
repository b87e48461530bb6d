//! Shared types used across the graph model and the runtime.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Label of the synthetic root question and of its only answer.
pub const ROOT_LABEL: &str = "root";

/// Unique identifier for a questionnaire session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic ID, for tests and reproducible runs.
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `(question, answer)` pair.
///
/// Both labels are kept as separate fields so that labels containing any
/// character can be used without colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QaKey {
    pub question: String,
    pub answer: String,
}

impl QaKey {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

impl fmt::Display for QaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.question, self.answer)
    }
}

/// Relevance weighting applied to questions that do not list a conclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceConfig {
    /// Weight used when no conclusion is targeted, or the targeted
    /// conclusion is not listed on the question.
    pub default_relevance: f64,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            default_relevance: 1.0,
        }
    }
}

impl RelevanceConfig {
    pub fn with_default_relevance(mut self, weight: f64) -> Self {
        self.default_relevance = weight;
        self
    }

    /// Reject weights that cannot be used for selection.
    pub fn validate(&self) -> Result<()> {
        check_weight("<default>", self.default_relevance)
    }
}

pub(crate) fn check_weight(question: &str, weight: f64) -> Result<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidRelevance {
            question: question.to_string(),
            weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn qa_keys_with_delimiters_stay_distinct() {
        // "a|b" + "c" and "a" + "b|c" would collide as "a|b|c" strings.
        let first = QaKey::new("a|b", "c");
        let second = QaKey::new("a", "b|c");
        assert_ne!(first, second);

        let mut map = HashMap::new();
        map.insert(first.clone(), 1);
        map.insert(second.clone(), 2);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&first], 1);
    }

    #[test]
    fn qa_key_serializes_as_two_fields() {
        let key = QaKey::new("Q1", "yes");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"question":"Q1","answer":"yes"}"#);
    }

    #[test]
    fn relevance_config_rejects_negative_and_nan() {
        assert!(RelevanceConfig::default().validate().is_ok());
        assert!(RelevanceConfig::default().with_default_relevance(-0.5).validate().is_err());
        assert!(RelevanceConfig::default().with_default_relevance(f64::NAN).validate().is_err());
    }

    #[test]
    fn seeded_session_ids_are_stable() {
        assert_eq!(SessionId::from_u128(7), SessionId::from_u128(7));
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
