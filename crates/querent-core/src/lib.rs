//! # Querent Core
//!
//! Graph model for branching questionnaires.
//!
//! - **QueryNode / AnswerNode** - a question with its answers and per-conclusion relevance
//! - **QueryGraph** - all questions plus a synthetic root weighted toward a conclusion
//! - **NextQuestion** - the pluggable capability that decides what to ask next
//!
//! ## Quick Start
//!
//! ```rust
//! use querent_core::prelude::*;
//!
//! let mut graph = QueryGraph::new(vec![
//!     QueryNode::new("fever").with_answers(["yes", "no"]).with_relevance("flu", 3.0),
//!     QueryNode::new("rash").with_answers(["yes", "no"]),
//! ])
//! .unwrap();
//! graph.build(Some("flu"));
//!
//! let first = RelevanceSelector.select(&graph, graph.root_answer(), &[]);
//! assert_eq!(first.as_deref(), Some("fever"));
//! ```

pub mod error;
pub mod graph;
pub mod node;
pub mod prelude;
pub mod select;
pub mod types;
