//! Error types shared by the bzauth crates.

use std::path::{Path, PathBuf};

/// Errors that can occur while resolving, reading or writing credential files.
///
/// A lookup that finds nothing is never an error: callers get an empty
/// mapping or `None` instead.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A file exists but its content is not in the expected format.
    #[error("{}:{line}: {message}", path.display())]
    ConfigFormat {
        /// The file that failed to parse.
        path: PathBuf,
        /// One-based line number of the offending line (0 when unknown).
        line: usize,
        /// What was wrong with the content.
        message: String,
    },

    /// A filesystem operation failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// The path being read, written or created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The home directory could not be determined.
    #[error("could not determine home directory (HOME is not set)")]
    NoHomeDir,

    /// A cookie record was rejected before it reached the jar.
    #[error("invalid cookie: {0}")]
    InvalidCookie(String),

    /// A section name or value would not read back as written.
    #[error("cannot store {0}")]
    Unstorable(String),
}

/// Convenience alias used throughout the bzauth crates.
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    // -- Constructors --------------------------------------------------------

    /// Creates an [`AuthError::ConfigFormat`] for `path` at `line`.
    pub fn format(path: impl AsRef<Path>, line: usize, message: impl Into<String>) -> Self {
        Self::ConfigFormat {
            path: path.as_ref().to_path_buf(),
            line,
            message: message.into(),
        }
    }

    /// Creates an [`AuthError::Io`] attaching `path` to `source`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    // -- Predicates ----------------------------------------------------------

    /// Returns `true` if this is an [`AuthError::ConfigFormat`].
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::ConfigFormat { .. })
    }

    /// Returns `true` if this is an [`AuthError::Unstorable`].
    pub fn is_unstorable(&self) -> bool {
        matches!(self, Self::Unstorable(_))
    }

    /// Returns `true` if the underlying cause is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
