//! Test support: logging setup, fixture trees and an in-memory filesystem.

use std::collections::BTreeMap;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{StepDescription, TreeDescription};
use crate::infrastructure::traits::FileSystem;

static TEST_SETUP: Once = Once::new();

/// Install a global tracing subscriber once per test binary.
/// `RUST_LOG` controls verbosity; default is `debug`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter),
        );

        if tracing::dispatcher::has_been_set() {
            debug!("Tracing subscriber already set");
        } else if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
        info!("Test setup complete (RUST_LOG={:?})", env::var("RUST_LOG").ok());
    });
}

/// The reference tree: start asks a question, A and C are solutions, B is a
/// check leading to C.
pub fn scenario_description() -> TreeDescription {
    TreeDescription {
        id: Some("no-crank".into()),
        title: Some("Engine does not crank".into()),
        description: None,
        steps: vec![
            StepDescription::question("start", "Does the engine crank?", &[("Yes", "A"), ("No", "B")]),
            StepDescription::solution("A", "Fuel delivery problem", "Inspect the fuel pump")
                .with_safety("yellow"),
            StepDescription::check("B", "Check the battery voltage", Some("C")),
            StepDescription::solution("C", "Battery is flat", "Charge or replace the battery")
                .with_safety("red"),
        ],
    }
}

/// Filesystem held in memory, keyed by path. Directories are implied by the
/// files below them.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), content.into());
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let files = self
            .files
            .lock()
            .map_err(|_| io::Error::other("memory filesystem poisoned"))?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map(|files| files.keys().any(|p| p != path && p.starts_with(path)))
            .unwrap_or(false)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let files = self
            .files
            .lock()
            .map_err(|_| io::Error::other("memory filesystem poisoned"))?;
        Ok(files
            .keys()
            .filter(|p| p.starts_with(dir) && p.as_path() != dir)
            .cloned()
            .collect())
    }
}
