//! Library error type.
//!
//! Only the ignore-file editor and the configuration loader can fail from
//! the caller's point of view. Path resolution and work-tree probes degrade
//! to benign fallbacks instead of returning errors.

use std::path::PathBuf;

/// Errors reported by diskcase operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An absolute entry path does not live under the ignore-file's base.
    #[error("file is outside the work tree: {}", path.display())]
    OutsideWorkspace { path: PathBuf },
    /// The configuration file exists but cannot be parsed.
    #[error("config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl Error {
    /// Create an "io" error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an "outside workspace" error.
    pub fn outside_workspace(path: impl Into<PathBuf>) -> Self {
        Error::OutsideWorkspace { path: path.into() }
    }

    /// Create a "config" error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this is an Io error.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }

    /// Check if this is an OutsideWorkspace error.
    pub fn is_outside_workspace(&self) -> bool {
        matches!(self, Error::OutsideWorkspace { .. })
    }

    /// Check if this is a Config error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }
}
