//! Error types for point cloud and mesh I/O.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use cloudconv_filters::FaceIndexOutOfRange;

/// Result type for point cloud and mesh I/O.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading, writing or rewriting files.
#[derive(Debug, Error)]
pub enum IoError {
    /// An empty file name was given.
    #[error("file name must have at least one character")]
    EmptyPath,

    /// The input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The file content does not match the expected structure.
    #[error("malformed {format} data: {message}")]
    MalformedFormat {
        /// Format being parsed, e.g. `OFF`.
        format: &'static str,
        /// What was wrong.
        message: String,
    },

    /// A recognised format variant this crate does not handle.
    #[error("unsupported {format} variant: {message}")]
    UnsupportedFormat {
        /// Format being parsed.
        format: &'static str,
        /// The unsupported variant.
        message: String,
    },

    /// A face refers to a point that does not exist.
    #[error(transparent)]
    FaceIndexOutOfRange(#[from] FaceIndexOutOfRange),

    /// OBJ loading failed inside `tobj`.
    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),

    /// Replacing a file with its rewritten copy failed.
    #[error("failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Create a `MalformedFormat` error.
    pub fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedFormat {
            format,
            message: message.into(),
        }
    }

    /// Create an `UnsupportedFormat` error.
    pub fn unsupported(format: &'static str, message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format,
            message: message.into(),
        }
    }

    /// Wraps an open/read failure, turning `NotFound` into [`IoError::FileNotFound`].
    pub fn from_open(err: std::io::Error, path: &Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}

/// Rejects empty file names before any file is touched.
pub(crate) fn ensure_path(path: &Path) -> IoResult<()> {
    if path.as_os_str().is_empty() {
        return Err(IoError::EmptyPath);
    }
    Ok(())
}

/// Reads a whole file, mapping a missing file to [`IoError::FileNotFound`].
pub(crate) fn read_file(path: &Path) -> IoResult<Vec<u8>> {
    ensure_path(path)?;
    std::fs::read(path).map_err(|e| IoError::from_open(e, path))
}
