//! Domain-level errors (no external dependencies)

use itertools::Itertools;
use thiserror::Error;

use crate::domain::validator::Defect;

/// Domain errors represent engine rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Recoverable: the call was ignored and history is unchanged.
    #[error("invalid transition: {from} -> {target}")]
    InvalidTransition { from: String, target: String },

    /// Fatal until the history is restarted.
    #[error("current step no longer in tree: {0}")]
    UnknownCurrentStep(String),

    #[error("invalid tree: {}", .0.iter().join("; "))]
    InvalidTree(Vec<Defect>),

    #[error("malformed step {id}: {reason}")]
    MalformedStep { id: String, reason: String },
}

impl DomainError {
    /// Whether the engine instance must be restarted to continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::UnknownCurrentStep(_))
    }
}
