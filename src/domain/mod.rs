//! Domain layer: the decision-tree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod description;
pub mod entities;
pub mod error;
pub mod traversal;
pub mod tree;
pub mod validator;

pub use description::{OptionDescription, StepDescription, TreeDescription};
pub use entities::*;
pub use error::DomainError;
pub use traversal::{History, Session};
pub use tree::DecisionTree;
pub use validator::{lint, validate, Defect, Warning};
