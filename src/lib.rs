//! diagtree: a diagnostic decision-tree engine.
//!
//! - [`domain`]: step and tree model, validator, traversal state machine
//! - [`application`]: loading, batch validation, terminal walkthrough
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: the `diagtree` command

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
