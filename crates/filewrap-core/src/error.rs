//! Error types for the filewrap-core library.
//!
//! Every variant is fatal to the run that produced it. The library never
//! retries; the build system that invoked the tool decides whether to.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for filewrap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all filewrap operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to open or read an input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create, write or flush an output artifact
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The logical name cannot be turned into accessor function names
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The name as given on the command line
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Two inputs map to the same generated data identifier
    #[error("identifier '{identifier}' generated for both '{first}' and '{second}'")]
    IdentifierCollision {
        /// The colliding identifier
        identifier: String,
        /// Name of the input that claimed the identifier first
        first: String,
        /// Name of the input that collided with it
        second: String,
    },

    /// An input path has no final component to use as the lookup key
    #[error("input path '{path}' has no file name")]
    MissingFileName {
        /// The offending path
        path: PathBuf,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Creates a new identifier collision error
    pub fn identifier_collision(
        identifier: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::IdentifierCollision {
            identifier: identifier.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Creates a new missing file name error
    pub fn missing_file_name(path: impl Into<PathBuf>) -> Self {
        Self::MissingFileName { path: path.into() }
    }

    /// Returns true if the error stems from the invocation rather than from I/O
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. } | Self::IdentifierCollision { .. } | Self::MissingFileName { .. }
        )
    }

    /// Returns the path involved in the failure, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::FileRead { path, .. }
            | Self::FileWrite { path, .. }
            | Self::MissingFileName { path } => Some(path.as_path()),
            Self::InvalidName { .. } | Self::IdentifierCollision { .. } => None,
        }
    }
}
