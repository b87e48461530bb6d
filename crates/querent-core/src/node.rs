//! Questions and their answers.
//!
//! A [`QueryNode`] is one question of the questionnaire. It owns its
//! [`AnswerNode`]s, keyed by answer label. Answers of ordinary questions may
//! name follow-up questions to steer the traversal; only the answer of the
//! synthetic root carries relevance-weighted candidates.

use crate::error::{GraphError, Result};
use crate::select::NextQuestion;
use crate::graph::QueryGraph;
use crate::types::{QaKey, RelevanceConfig, ROOT_LABEL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One answer to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerNode {
    label: String,
    /// Label of the owning question.
    question: String,
    /// Candidate questions weighted by relevance. Root answer only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    next_questions: BTreeMap<String, f64>,
    /// Questions to prefer next when this answer is given.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    follow_ups: Vec<String>,
}

impl AnswerNode {
    pub fn new(question: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            question: question.into(),
            next_questions: BTreeMap::new(),
            follow_ups: Vec::new(),
        }
    }

    /// Build the root answer from `(question, relevance)` candidates.
    pub(crate) fn root<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            label: ROOT_LABEL.to_string(),
            question: ROOT_LABEL.to_string(),
            next_questions: candidates.into_iter().collect(),
            follow_ups: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn key(&self) -> QaKey {
        QaKey::new(self.question.clone(), self.label.clone())
    }

    /// Whether this is the answer of the synthetic root.
    pub fn is_root(&self) -> bool {
        self.question == ROOT_LABEL
    }

    /// Relevance-weighted candidates; empty for every non-root answer.
    pub fn next_questions(&self) -> &BTreeMap<String, f64> {
        &self.next_questions
    }

    pub fn follow_ups(&self) -> &[String] {
        &self.follow_ups
    }

    /// Ask `selector` for the question to pose after this answer.
    ///
    /// The selector must return a question outside `asked`, or `None` when
    /// the questionnaire is exhausted.
    pub fn pick_next_question(
        &self,
        graph: &QueryGraph,
        asked: &[String],
        selector: &mut dyn NextQuestion,
    ) -> Option<String> {
        selector.select(graph, self, asked)
    }
}

/// A question and its possible answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryNode {
    question: String,
    answers: BTreeMap<String, AnswerNode>,
    /// Per-conclusion relevance weights.
    #[serde(default)]
    relevance: BTreeMap<String, f64>,
    default_relevance: f64,
}

impl QueryNode {
    pub fn new(question: impl Into<String>) -> Self {
        Self::with_config(question, &RelevanceConfig::default())
    }

    pub fn with_config(question: impl Into<String>, config: &RelevanceConfig) -> Self {
        Self {
            question: question.into(),
            answers: BTreeMap::new(),
            relevance: BTreeMap::new(),
            default_relevance: config.default_relevance,
        }
    }

    /// Add an answer. Adding an existing label is a no-op.
    pub fn with_answer(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        let question = self.question.clone();
        self.answers
            .entry(label.clone())
            .or_insert_with(|| AnswerNode::new(question, label));
        self
    }

    pub fn with_answers<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        labels.into_iter().fold(self, |node, label| node.with_answer(label))
    }

    /// Make `follow_up` the preferred next question after `answer`.
    /// The answer is created if missing.
    pub fn with_follow_up(mut self, answer: impl Into<String>, follow_up: impl Into<String>) -> Self {
        let answer = answer.into();
        self = self.with_answer(answer.clone());
        if let Some(node) = self.answers.get_mut(&answer) {
            node.follow_ups.push(follow_up.into());
        }
        self
    }

    /// Weight this question for a conclusion.
    pub fn with_relevance(mut self, conclusion: impl Into<String>, weight: f64) -> Self {
        self.relevance.insert(conclusion.into(), weight);
        self
    }

    pub fn with_default_relevance(mut self, weight: f64) -> Self {
        self.default_relevance = weight;
        self
    }

    /// Add an answer, failing if the label is taken.
    pub fn add_answer(&mut self, label: impl Into<String>) -> Result<&AnswerNode> {
        let label = label.into();
        if self.answers.contains_key(&label) {
            return Err(GraphError::DuplicateAnswer {
                question: self.question.clone(),
                answer: label,
            });
        }
        let node = AnswerNode::new(self.question.clone(), label.clone());
        Ok(self.answers.entry(label).or_insert(node))
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self, label: &str) -> Option<&AnswerNode> {
        self.answers.get(label)
    }

    /// Answers in label order.
    pub fn answers(&self) -> impl Iterator<Item = &AnswerNode> {
        self.answers.values()
    }

    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    /// How pertinent this question is toward `conclusion`.
    ///
    /// Falls back to the default relevance when no conclusion is targeted or
    /// the conclusion is not listed.
    pub fn relevance(&self, conclusion: Option<&str>) -> f64 {
        conclusion
            .and_then(|c| self.relevance.get(c))
            .copied()
            .unwrap_or(self.default_relevance)
    }

    pub fn relevance_table(&self) -> &BTreeMap<String, f64> {
        &self.relevance
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.question == ROOT_LABEL {
            return Err(GraphError::ReservedLabel(self.question.clone()));
        }
        crate::types::check_weight(&self.question, self.default_relevance)?;
        for weight in self.relevance.values() {
            crate::types::check_weight(&self.question, *weight)?;
        }
        Ok(())
    }

    /// Only valid on the node built by [`QueryNode::root`].
    pub(crate) fn root_answer(&self) -> &AnswerNode {
        &self.answers[ROOT_LABEL]
    }

    pub(crate) fn root(answer: AnswerNode) -> Self {
        let mut answers = BTreeMap::new();
        answers.insert(ROOT_LABEL.to_string(), answer);
        Self {
            question: ROOT_LABEL.to_string(),
            answers,
            relevance: BTreeMap::new(),
            default_relevance: 0.0,
        }
    }
}
