//! Infrastructure layer: the filesystem boundary and service wiring
//!
//! `traits` holds the seam services read trees through; `di` builds the
//! services for one CLI invocation.

pub mod di;
pub mod error;
pub mod traits;

pub use error::{InfraError, InfraResult};
