//! # Querent
//!
//! Branching questionnaires that learn which questions discriminate.
//!
//! A questionnaire is a graph of questions. Each answer may name follow-up
//! questions, and each question carries a relevance weight per conclusion.
//! Respondents walk the graph one answer at a time; every finished walk is
//! labeled with a conclusion and folded into that conclusion's co-occurrence
//! matrix. From those counts Querent scores, for each answer, how strongly
//! each other question separates respondents.
//!
//! ## Quick Start
//!
//! ```rust
//! use querent::prelude::*;
//!
//! let mut graph = QueryGraph::new(vec![
//!     QueryNode::new("fever").with_answers(["yes", "no"]).with_relevance("flu", 3.0),
//!     QueryNode::new("cough").with_answers(["yes", "no"]).with_relevance("flu", 2.0),
//! ])
//! .unwrap();
//! let mut results = SessionResults::from_graph(&graph, ["flu", "cold"]);
//!
//! let mut session = QuerySession::new(&mut graph, Some("flu")).unwrap();
//! assert_eq!(session.current_query().map(|q| q.question()), Some("fever"));
//! session.receive_answer_for_next_question("yes").unwrap();
//! session.receive_answer_for_next_question("no").unwrap();
//! results.record(&session).unwrap();
//!
//! let report = results.report(&ScoringConfig::default()).unwrap();
//! println!("{}", report.to_json().unwrap());
//! ```
//!
//! ## Architecture
//!
//! - [`querent_core`] - Question/answer nodes, the graph, next-question selectors
//! - [`querent_runtime`] - Sessions, per-conclusion matrices, correlation scoring
//!
//! ## Scoring
//!
//! | Step | Input | Output |
//! |------|-------|--------|
//! | Count | finished sessions | symmetric co-occurrence matrix per conclusion |
//! | Compare | matrix columns | histogram-intersection similarity table |
//! | Score | similarity rows | population variance per other question, normalized to 1 |

// Re-export all subcrates
pub use querent_core as core;
pub use querent_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use querent::prelude::*;
/// ```
pub mod prelude {
    pub use querent_core::prelude::*;
    pub use querent_runtime::prelude::*;
}
