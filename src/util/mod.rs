//! Shared helpers for tests and tooling

pub mod testing;
