//! Errors carrying a reason, for operations that return a value

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Temporary directories must be absolute
    #[error("Temporary directory must be an absolute path: {0}")]
    RelativeTmpDir(PathBuf),

    #[error("You do not have the required permission to write at this location")]
    PermissionDenied,

    /// Filesystem failure with the OS error text
    #[error("{path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// The session writes to a physical disc, not to a file
    #[error("Session output is not an image file")]
    NotFileOutput,

    /// Neither an image nor a toc path can be derived
    #[error("No output path specified")]
    NoOutput,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Translate an I/O failure on `path`; permission problems get a fixed message
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            SessionError::PermissionDenied
        } else {
            SessionError::Io {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        }
    }
}
