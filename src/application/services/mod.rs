//! Application services
//!
//! Concrete service implementations that orchestrate the engine.
//! Services depend on I/O boundary traits (FileSystem, BufRead/Write)
//! but are themselves concrete structs, not traits.

mod batch;
mod loader;
mod walkthrough;

pub use batch::{BatchReport, BatchValidator, FileReport, FileStatus};
pub use loader::{TreeFormat, TreeLoader};
pub use walkthrough::{WalkOutcome, WalkSummary, Walkthrough};
