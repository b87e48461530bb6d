//! # Querent Runtime
//!
//! Questionnaire sessions, result aggregation, and correlation scoring.
//!
//! A [`session::QuerySession`] walks a built [`querent_core::graph::QueryGraph`]
//! one answer at a time. Finished sessions are handed to
//! [`aggregate::SessionResults`], which keeps one co-occurrence
//! [`matrix::ResultMatrix`] per conclusion and turns each into normalized
//! variance scores on demand.
//!
//! ## Quick Start
//!
//! ```rust
//! use querent_runtime::prelude::*;
//!
//! let mut graph = QueryGraph::new(vec![
//!     QueryNode::new("Q1").with_answers(["a", "b"]),
//!     QueryNode::new("Q2").with_answers(["c", "d"]),
//! ])
//! .unwrap();
//! let mut results = SessionResults::from_graph(&graph, ["flu"]);
//!
//! let mut session = QuerySession::new(&mut graph, Some("flu")).unwrap();
//! session.receive_answer_for_next_question("a").unwrap();
//! session.receive_answer_for_next_question("c").unwrap();
//! assert!(session.is_terminal());
//!
//! results.record(&session).unwrap();
//! let scores = results.matrix("flu").unwrap().get_correlation().unwrap();
//! assert!(scores["Q1"]["a"].contains_key("Q2"));
//! ```

pub mod aggregate;
pub mod correlation;
pub mod error;
pub mod matrix;
pub mod prelude;
pub mod session;
