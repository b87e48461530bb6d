//! Querent Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use querent_core::prelude::*;
//! ```

pub use crate::types::{QaKey, RelevanceConfig, SessionId, ROOT_LABEL};

pub use crate::node::{AnswerNode, QueryNode};

pub use crate::graph::QueryGraph;

pub use crate::select::{NextQuestion, RelevanceSelector, SequentialSelector, WeightedRandomSelector};

pub use crate::error::{GraphError, Result};
