//! Batch validation service
//!
//! Validates every tree description below a directory and produces a per-file
//! report: validity, defects, warnings and node count.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument, warn};

use crate::application::services::TreeLoader;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{lint, validate, Defect, Warning};
use crate::infrastructure::traits::FileSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Valid,
    Invalid,
    /// Could not be read or parsed at all
    Unreadable,
}

/// Outcome for a single tree file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    #[serde(serialize_with = "display_list")]
    pub defects: Vec<Defect>,
    #[serde(serialize_with = "display_list")]
    pub warnings: Vec<Warning>,
    pub node_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.status == FileStatus::Valid
    }
}

/// Reports for every file in a batch, sorted by path.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub root: PathBuf,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn valid_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_valid()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.files.len() - self.valid_count()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.warnings.len()).sum()
    }

    /// Every file is valid; in strict mode warnings also fail the batch.
    pub fn is_success(&self, strict: bool) -> bool {
        self.invalid_count() == 0 && (!strict || self.warning_count() == 0)
    }

    pub fn to_json(&self) -> ApplicationResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize report".to_string(),
            source: Box::new(e),
        })
    }
}

#[allow(clippy::ptr_arg)]
fn display_list<T: Display, S: Serializer>(items: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(items.iter().map(ToString::to_string))
}

/// Service validating many tree files in one pass.
pub struct BatchValidator {
    fs: Arc<dyn FileSystem>,
    loader: TreeLoader,
    extensions: Vec<String>,
}

impl BatchValidator {
    pub fn new(fs: Arc<dyn FileSystem>, extensions: Vec<String>) -> Self {
        Self {
            loader: TreeLoader::new(fs.clone()),
            fs,
            extensions,
        }
    }

    /// Validate a directory recursively, or a single file.
    #[instrument(level = "debug", skip(self))]
    pub fn validate_path(&self, path: &Path) -> ApplicationResult<BatchReport> {
        let files = if self.fs.is_dir(path) {
            self.collect_tree_files(path)?
        } else if self.fs.is_file(path) {
            vec![path.to_path_buf()]
        } else {
            return Err(ApplicationError::NotFound(path.to_path_buf()));
        };

        if files.is_empty() {
            warn!("no tree files found in {}", path.display());
        }
        debug!("validate_path: {} file(s)", files.len());

        let reports: Vec<FileReport> = files.par_iter().map(|f| self.validate_file(f)).collect();
        let report = BatchReport {
            root: path.to_path_buf(),
            files: reports,
        };
        info!(
            "validated {} file(s): {} valid, {} invalid",
            report.files.len(),
            report.valid_count(),
            report.invalid_count()
        );
        Ok(report)
    }

    fn collect_tree_files(&self, dir: &Path) -> ApplicationResult<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = self
            .fs
            .list_files(dir)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("scan directory {}", dir.display()),
                source: Box::new(e),
            })?
            .into_iter()
            .filter(|p| TreeLoader::is_tree_file(p, &self.extensions))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Validate one file. Never fails: unreadable files are reported as such.
    pub fn validate_file(&self, path: &Path) -> FileReport {
        match self.loader.load_description(path) {
            Ok(desc) => {
                let defects = validate(&desc);
                let warnings = lint(&desc);
                let status = if defects.is_empty() {
                    FileStatus::Valid
                } else {
                    FileStatus::Invalid
                };
                FileReport {
                    path: path.to_path_buf(),
                    status,
                    defects,
                    warnings,
                    node_count: desc.steps.len(),
                    error: None,
                }
            }
            Err(e) => {
                debug!("validate_file: unreadable {}: {}", path.display(), e);
                FileReport {
                    path: path.to_path_buf(),
                    status: FileStatus::Unreadable,
                    defects: Vec::new(),
                    warnings: Vec::new(),
                    node_count: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::MemoryFileSystem;

    const VALID: &str = r#"{"steps": [
        {"id": "start", "kind": "question", "text": "Lights on?",
         "options": [{"label": "No", "targetId": "fuse"}]},
        {"id": "fuse", "kind": "solution", "text": "Fuse blown", "action": "Replace fuse"}
    ]}"#;

    fn validator(fs: MemoryFileSystem) -> BatchValidator {
        BatchValidator::new(Arc::new(fs), vec!["json".into(), "toml".into()])
    }

    #[test]
    fn given_memory_tree_set_when_validating_dir_then_reports_sorted_by_path() {
        let fs = MemoryFileSystem::new()
            .with_file("/trees/b.json", VALID)
            .with_file("/trees/a.json", r#"{"steps": []}"#)
            .with_file("/trees/readme.txt", "not a tree");

        let report = validator(fs).validate_path(Path::new("/trees")).unwrap();

        let paths: Vec<_> = report.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("/trees/a.json"), PathBuf::from("/trees/b.json")]);
        assert_eq!(report.files[0].defects, vec![Defect::MissingStartNode]);
        assert_eq!(report.files[1].node_count, 2);
        assert_eq!(report.invalid_count(), 1);
    }

    #[test]
    fn given_unparsable_file_when_validating_then_marks_unreadable() {
        let fs = MemoryFileSystem::new().with_file("/t/bad.toml", "steps = [");

        let report = validator(fs).validate_file(Path::new("/t/bad.toml"));

        assert_eq!(report.status, FileStatus::Unreadable);
        assert!(report.error.as_deref().is_some_and(|e| e.contains("bad.toml")));
        assert!(!report.is_valid());
    }
}
