//! Querent Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use querent_runtime::prelude::*;
//! ```

// Re-export sessions
pub use crate::session::{QuerySession, SessionResult, SessionState};

// Re-export aggregation
pub use crate::aggregate::{ConclusionReport, CorrelationReport, SessionResults};

// Re-export matrix and scoring
pub use crate::matrix::ResultMatrix;
pub use crate::correlation::{
    CorrelationScores, CorrelationTable, QuestionScores, ScoringConfig, ZeroVariancePolicy,
    histogram_intersection,
};

pub use crate::error::QuerentError;

// Re-export from core
pub use querent_core::prelude::{
    AnswerNode, GraphError, NextQuestion, QaKey, QueryGraph, QueryNode, RelevanceConfig,
    RelevanceSelector, SequentialSelector, SessionId, WeightedRandomSelector, ROOT_LABEL,
};
