// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for index and resolution operations
//!
//! Only conditions that abort an operation live here. Partial-data
//! conditions (unresolved sub-files, malformed lines, unreadable sub-files)
//! are counted by the caller, never raised.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading or saving an index
#[derive(Error, Debug)]
pub enum Error {
    /// A required input (index document, root file) does not exist
    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    /// IO failure on a specific path
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted index document could not be decoded or encoded
    #[error("Invalid index document: {0}")]
    IndexFormat(String),

    /// Operation was cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a missing input error
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Error::MissingInput(path.into())
    }

    /// Create an IO error, mapping `NotFound` to [`Error::MissingInput`]
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Error::MissingInput(path.to_path_buf());
        }
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create an index format error
    pub fn index_format(msg: impl Into<String>) -> Self {
        Error::IndexFormat(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_missing_input() {
        let err = Error::io(
            Path::new("parts/3001.dat"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, Error::MissingInput(ref p) if p == Path::new("parts/3001.dat")));
    }

    #[test]
    fn test_other_io_kept() {
        let err = Error::io(
            Path::new("parts/3001.dat"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("parts/3001.dat"));
    }
}
