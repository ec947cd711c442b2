//! Error types for survey runs.
//!
//! Only preconditions and configuration problems surface as
//! [`AnalysisError`]. Failures reading or parsing an individual input file
//! are captured as [`FileError`] values and end up in the report.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a survey run before a report is produced.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input directory does not exist or is not a directory.
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The filename pattern is not a valid glob.
    #[error("invalid filename pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    /// The lookup-name heuristic could not be compiled.
    #[error("invalid lookup name pattern: {0}")]
    InvalidLookupPattern(#[from] regex::Error),

    /// File I/O failure outside per-document processing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results with [`AnalysisError`].
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// A single input file that could not be read or parsed.
///
/// Displays as `"{file_name}: {message}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

impl FileError {
    pub fn new(path: &Path, message: impl fmt::Display) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// File name without its directory, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_name(), self.message)
    }
}
