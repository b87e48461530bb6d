//! Next-question selection.
//!
//! Choosing what to ask after an answer is a capability, not a property of
//! the node types: the traversal hands the graph, the answer just given and
//! the questions already asked to a [`NextQuestion`] implementation and gets
//! back a question label (or `None` when nothing is left to ask).
//!
//! Implementations must never return a label contained in `asked`. The
//! session re-checks this after every step and aborts if it is violated.

use crate::graph::QueryGraph;
use crate::node::AnswerNode;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Picks the next question given the answer just received.
pub trait NextQuestion {
    fn select(&mut self, graph: &QueryGraph, answer: &AnswerNode, asked: &[String]) -> Option<String>;
}

impl<F> NextQuestion for F
where
    F: FnMut(&QueryGraph, &AnswerNode, &[String]) -> Option<String>,
{
    fn select(&mut self, graph: &QueryGraph, answer: &AnswerNode, asked: &[String]) -> Option<String> {
        self(graph, answer, asked)
    }
}

fn is_asked(asked: &[String], question: &str) -> bool {
    asked.iter().any(|q| q == question)
}

/// Unasked root candidates with their relevance weight.
fn open_candidates<'g>(graph: &'g QueryGraph, asked: &[String]) -> Vec<(&'g str, f64)> {
    graph
        .root_answer()
        .next_questions()
        .iter()
        .filter(|(question, _)| !is_asked(asked, question))
        .map(|(question, weight)| (question.as_str(), *weight))
        .collect()
}

/// Follow-ups first, then the most relevant remaining question.
///
/// Ties on relevance go to the lexicographically smallest label, so the
/// traversal is fully deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceSelector;

impl NextQuestion for RelevanceSelector {
    fn select(&mut self, graph: &QueryGraph, answer: &AnswerNode, asked: &[String]) -> Option<String> {
        if let Some(follow_up) = answer
            .follow_ups()
            .iter()
            .find(|q| graph.contains(q) && !is_asked(asked, q))
        {
            return Some(follow_up.clone());
        }

        // Candidates iterate in label order; keep the first of equal weights.
        open_candidates(graph, asked)
            .into_iter()
            .fold(None, |best: Option<(&str, f64)>, (question, weight)| match best {
                Some((_, best_weight)) if best_weight >= weight => best,
                _ => Some((question, weight)),
            })
            .map(|(question, _)| question.to_string())
    }
}

/// Asks questions in definition order, ignoring weights and follow-ups.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialSelector;

impl NextQuestion for SequentialSelector {
    fn select(&mut self, graph: &QueryGraph, _answer: &AnswerNode, asked: &[String]) -> Option<String> {
        graph
            .questions()
            .find(|q| !is_asked(asked, q))
            .map(str::to_string)
    }
}

/// Samples the next question with probability proportional to relevance.
///
/// Follow-ups are honored first, as with [`RelevanceSelector`]. When every
/// remaining candidate has zero weight the draw is uniform.
#[derive(Debug, Clone)]
pub struct WeightedRandomSelector {
    rng: StdRng,
}

impl WeightedRandomSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for WeightedRandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl NextQuestion for WeightedRandomSelector {
    fn select(&mut self, graph: &QueryGraph, answer: &AnswerNode, asked: &[String]) -> Option<String> {
        if let Some(follow_up) = answer
            .follow_ups()
            .iter()
            .find(|q| graph.contains(q) && !is_asked(asked, q))
        {
            return Some(follow_up.clone());
        }

        let candidates = open_candidates(graph, asked);
        if candidates.is_empty() {
            return None;
        }

        let picked = match WeightedIndex::new(candidates.iter().map(|(_, w)| *w)) {
            Ok(dist) => candidates[dist.sample(&mut self.rng)].0,
            // All weights zero.
            Err(_) => candidates.choose(&mut self.rng)?.0,
        };
        Some(picked.to_string())
    }
}
