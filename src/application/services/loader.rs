//! Tree loading service
//!
//! Reads tree description files (JSON or TOML), parses them and, on request,
//! builds a validated `DecisionTree` ready for traversal.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, ParseResultExt};
use crate::domain::{DecisionTree, DomainError, TreeDescription};
use crate::infrastructure::traits::FileSystem;

/// Serialization format of a tree description file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    Json,
    Toml,
}

impl TreeFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(TreeFormat::Json),
            "toml" => Some(TreeFormat::Toml),
            _ => None,
        }
    }

    pub fn parse(self, content: &str, path: &Path) -> ApplicationResult<TreeDescription> {
        match self {
            TreeFormat::Json => serde_json::from_str(content).with_parse_context(path),
            TreeFormat::Toml => toml::from_str(content).with_parse_context(path),
        }
    }
}

/// Service for reading tree descriptions from disk.
pub struct TreeLoader {
    fs: Arc<dyn FileSystem>,
}

impl TreeLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Whether `path` has one of the configured tree extensions.
    pub fn is_tree_file(path: &Path, extensions: &[String]) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
    }

    /// Read and parse a description without validating it.
    #[instrument(level = "debug", skip(self))]
    pub fn load_description(&self, path: &Path) -> ApplicationResult<TreeDescription> {
        let format = TreeFormat::from_path(path)
            .ok_or_else(|| ApplicationError::UnsupportedFormat(path.to_path_buf()))?;
        if !self.fs.is_file(path) {
            return Err(ApplicationError::NotFound(path.to_path_buf()));
        }
        let content = self.fs.read_to_string(path).with_path_context("read tree", path)?;
        let desc = format.parse(&content, path)?;
        debug!("load_description: {} step(s) in {}", desc.steps.len(), path.display());
        Ok(desc)
    }

    /// Load a tree for traversal. Any validation defect rejects the file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, path: &Path) -> ApplicationResult<Arc<DecisionTree>> {
        let desc = self.load_description(path)?;
        match DecisionTree::from_description(&desc) {
            Ok(tree) => Ok(Arc::new(tree)),
            Err(DomainError::InvalidTree(defects)) => Err(ApplicationError::InvalidTree {
                path: path.to_path_buf(),
                defects,
            }),
            Err(e) => Err(e.into()),
        }
    }
}
