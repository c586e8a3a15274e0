// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry expansion
//!
//! Only failures on the root of an expansion are errors. Everything that
//! goes wrong below the root is counted in `ExpansionStats` instead.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Geometry expansion result type
pub type Result<T> = std::result::Result<T, Error>;

/// Geometry expansion errors
#[derive(Error, Debug)]
pub enum Error {
    /// Root file (or root name) does not exist
    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    /// Root file exists but could not be read
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Expansion was cancelled; partial output is discarded
    #[error("Expansion cancelled")]
    Cancelled,

    /// Index loading or lookup failure
    #[error(transparent)]
    Index(#[from] ldraw_lite_model::Error),
}

impl Error {
    /// Create a missing input error
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Error::MissingInput(path.into())
    }

    /// Create an IO error for the root file, `NotFound` becomes [`Error::MissingInput`]
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Error::MissingInput(path.to_path_buf());
        }
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
