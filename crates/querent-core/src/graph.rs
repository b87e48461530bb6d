//! The questionnaire graph.
//!
//! Holds the non-root questions in definition order plus a synthetic root
//! question whose single answer fans out to every question, weighted by its
//! relevance to the targeted conclusion. Follow-up links between questions
//! are mirrored into a petgraph `DiGraph` (question -> question, edge labeled
//! with the answer). One HashMap resolves a label to both its position and
//! its petgraph index.

use crate::error::{GraphError, Result};
use crate::node::{AnswerNode, QueryNode};
use crate::types::QaKey;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::debug;

/// Question/answer graph with a relevance-weighted synthetic root.
#[derive(Debug, Clone)]
pub struct QueryGraph {
    root: QueryNode,
    nodes: Vec<QueryNode>,
    /// Question label -> (position in `nodes`, petgraph index).
    index: HashMap<String, (usize, NodeIndex)>,
    follow_ups: DiGraph<String, String>,
    conclusion: Option<String>,
}

impl QueryGraph {
    /// Assemble a graph from its questions and attach the root with no
    /// targeted conclusion.
    pub fn new(nodes: Vec<QueryNode>) -> Result<Self> {
        let mut index: HashMap<String, (usize, NodeIndex)> = HashMap::with_capacity(nodes.len());
        let mut follow_ups = DiGraph::new();

        for (pos, node) in nodes.iter().enumerate() {
            node.validate()?;
            let label = node.question().to_string();
            if index.contains_key(&label) {
                return Err(GraphError::DuplicateQuestion(label));
            }
            let idx = follow_ups.add_node(label.clone());
            index.insert(label, (pos, idx));
        }

        for node in &nodes {
            let (_, from) = index[node.question()];
            for answer in node.answers() {
                for target in answer.follow_ups() {
                    let Some(&(_, to)) = index.get(target) else {
                        return Err(GraphError::DanglingFollowUp {
                            question: node.question().to_string(),
                            answer: answer.label().to_string(),
                            follow_up: target.clone(),
                        });
                    };
                    follow_ups.add_edge(from, to, answer.label().to_string());
                }
            }
        }

        let mut graph = Self {
            root: QueryNode::root(AnswerNode::root(std::iter::empty())),
            nodes,
            index,
            follow_ups,
            conclusion: None,
        };
        graph.build(None);
        Ok(graph)
    }

    /// Rebuild the root answer so that every question is weighted by its
    /// relevance toward `conclusion`.
    pub fn build(&mut self, conclusion: Option<&str>) {
        let candidates = self
            .nodes
            .iter()
            .map(|node| (node.question().to_string(), node.relevance(conclusion)));
        self.root = QueryNode::root(AnswerNode::root(candidates));
        self.conclusion = conclusion.map(str::to_string);
        debug!(
            conclusion = ?self.conclusion,
            questions = self.nodes.len(),
            "attached questions to root"
        );
    }

    pub fn root(&self) -> &QueryNode {
        &self.root
    }

    /// The root's single answer; its candidates cover every question.
    pub fn root_answer(&self) -> &AnswerNode {
        self.root.root_answer()
    }

    /// Conclusion the root is currently weighted toward.
    pub fn conclusion(&self) -> Option<&str> {
        self.conclusion.as_deref()
    }

    /// Non-root questions in definition order.
    pub fn nodes(&self) -> &[QueryNode] {
        &self.nodes
    }

    pub fn node(&self, question: &str) -> Option<&QueryNode> {
        self.index.get(question).map(|&(pos, _)| &self.nodes[pos])
    }

    /// Like [`node`](Self::node), but a missing question is an error.
    pub fn require(&self, question: &str) -> Result<&QueryNode> {
        self.node(question)
            .ok_or_else(|| GraphError::question_not_found(question))
    }

    pub fn contains(&self, question: &str) -> bool {
        self.index.contains_key(question)
    }

    /// Position of a question in definition order.
    pub fn position(&self, question: &str) -> Option<usize> {
        self.index.get(question).map(|&(pos, _)| pos)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(QueryNode::question)
    }

    /// Every `(question, answer)` pair, questions in definition order and
    /// answers in label order.
    pub fn qa_keys(&self) -> Vec<QaKey> {
        self.nodes
            .iter()
            .flat_map(|node| node.answers().map(AnswerNode::key))
            .collect()
    }

    /// `(answer, follow-up question)` links leaving `question`.
    pub fn follow_ups_of(&self, question: &str) -> Vec<(String, String)> {
        let Some(&(_, idx)) = self.index.get(question) else {
            return Vec::new();
        };
        let mut links: Vec<(String, String)> = self
            .follow_ups
            .edges(idx)
            .map(|edge| (edge.weight().clone(), self.follow_ups[edge.target()].clone()))
            .collect();
        links.sort();
        links
    }

    /// Number of follow-up links.
    pub fn edge_count(&self) -> usize {
        self.follow_ups.edge_count()
    }
}
