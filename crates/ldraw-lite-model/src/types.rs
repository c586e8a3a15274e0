// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for part resolution
//!
//! This module defines the index record, match outcome and relationship
//! hint types shared by the parser and geometry crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Geometry file extension recognized by the index (without the dot)
pub const GEOMETRY_FILE_EXTENSION: &str = "dat";

/// Millimeters per LDraw unit (LDU)
pub const LDU_TO_MM: f64 = 0.4;

/// One indexed geometry file
///
/// The stem is the map key and is not part of the persisted value; it is
/// restored from the key when an index document is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryFileRecord {
    /// Normalized (lower-case, extension-free) file stem
    #[serde(skip)]
    pub stem: String,
    /// Location of the file, as scanned
    pub path: PathBuf,
    /// File name including extension, original case
    pub file_name: String,
    /// First `0` line of the file, trimmed
    pub header_comment: Option<String>,
    /// `0 !LDRAW_ORG ...` line, trimmed, if declared in the header
    pub org_tag: Option<String>,
    /// File size in bytes
    pub size_bytes: u64,
    /// Modification time, whole seconds since the Unix epoch
    pub modified_time: u64,
}

impl GeometryFileRecord {
    /// Which library the file was indexed from, judged by its path
    pub fn source(&self) -> LibrarySource {
        LibrarySource::from_path(&self.path)
    }
}

/// Official library vs. unofficial/override content
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibrarySource {
    Official,
    Unofficial,
}

impl LibrarySource {
    /// Classify a path: unofficial iff it has an `unofficial` directory segment
    pub fn from_path(path: &Path) -> Self {
        let normalized = path.to_string_lossy().replace('\\', "/").to_ascii_lowercase();
        if normalized.contains("/unofficial/") || normalized.starts_with("unofficial/") {
            LibrarySource::Unofficial
        } else {
            LibrarySource::Official
        }
    }
}

/// Why a match was made
///
/// Each tier carries a fixed confidence; nothing is computed per input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// The identifier (or a `-`/`_`/alphanumeric variant) is indexed
    ExactOrAlt,
    /// A printed-from/modified-from parent is indexed
    ParentGeometry,
    /// The identifier with its variant suffix removed is indexed
    BaseCore,
    /// No tier matched
    None,
}

impl MatchReason {
    /// Fixed confidence for this tier
    pub fn confidence(self) -> f64 {
        match self {
            MatchReason::ExactOrAlt => 1.0,
            MatchReason::ParentGeometry => 0.90,
            MatchReason::BaseCore => 0.85,
            MatchReason::None => 0.0,
        }
    }

    /// Snake-case name as used in catalog records
    pub fn as_str(self) -> &'static str {
        match self {
            MatchReason::ExactOrAlt => "exact_or_alt",
            MatchReason::ParentGeometry => "parent_geometry",
            MatchReason::BaseCore => "base_core",
            MatchReason::None => "none",
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one identifier
///
/// `reason == None` iff there is no record iff confidence is 0. The
/// constructors are the only way to build one, so the three always agree.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    record: Option<Arc<GeometryFileRecord>>,
    reason: MatchReason,
}

impl MatchResult {
    /// Identifier matched directly or through an alternate form
    pub fn exact_or_alt(record: Arc<GeometryFileRecord>) -> Self {
        Self {
            record: Some(record),
            reason: MatchReason::ExactOrAlt,
        }
    }

    /// Matched through a relationship hint
    pub fn parent_geometry(record: Arc<GeometryFileRecord>) -> Self {
        Self {
            record: Some(record),
            reason: MatchReason::ParentGeometry,
        }
    }

    /// Matched after stripping a variant suffix
    pub fn base_core(record: Arc<GeometryFileRecord>) -> Self {
        Self {
            record: Some(record),
            reason: MatchReason::BaseCore,
        }
    }

    /// No match
    pub fn none() -> Self {
        Self {
            record: None,
            reason: MatchReason::None,
        }
    }

    /// Matched geometry file, if any
    pub fn record(&self) -> Option<&Arc<GeometryFileRecord>> {
        self.record.as_ref()
    }

    /// Path of the matched geometry file, if any
    pub fn path(&self) -> Option<&Path> {
        self.record.as_deref().map(|r| r.path.as_path())
    }

    pub fn reason(&self) -> MatchReason {
        self.reason
    }

    pub fn confidence(&self) -> f64 {
        self.reason.confidence()
    }

    pub fn is_match(&self) -> bool {
        self.record.is_some()
    }
}

impl Default for MatchResult {
    fn default() -> Self {
        Self::none()
    }
}

/// Kind of catalog relationship between two part identifiers
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Subject is a print of the related part (`P`)
    PrintedFrom,
    /// Subject is a mold/modification of the related part (`M`)
    ModifiedFrom,
    /// Subject is a pattern variant (`T`)
    Pattern,
    /// Interchangeable alternate (`A`)
    Alternate,
    /// Subject is a sub-part (`B`)
    SubPart,
    /// Left/right pair (`R`)
    Pair,
    /// Anything else, kept verbatim
    Other(String),
}

impl RelationKind {
    /// Map a single-letter catalog relationship code
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "P" => RelationKind::PrintedFrom,
            "M" => RelationKind::ModifiedFrom,
            "T" => RelationKind::Pattern,
            "A" => RelationKind::Alternate,
            "B" => RelationKind::SubPart,
            "R" => RelationKind::Pair,
            _ => RelationKind::Other(code.trim().to_string()),
        }
    }

    /// Whether the related part can lend its geometry to the subject
    pub fn carries_parent_geometry(&self) -> bool {
        matches!(self, RelationKind::PrintedFrom | RelationKind::ModifiedFrom)
    }
}

impl FromStr for RelationKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RelationKind::from_code(s))
    }
}

/// "Subject is a `kind` variant of `related`"
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct RelationshipHint {
    pub kind: RelationKind,
    pub related: String,
}

impl RelationshipHint {
    pub fn new(kind: RelationKind, related: impl Into<String>) -> Self {
        Self {
            kind,
            related: related.into(),
        }
    }

    pub fn printed_from(related: impl Into<String>) -> Self {
        Self::new(RelationKind::PrintedFrom, related)
    }

    pub fn modified_from(related: impl Into<String>) -> Self {
        Self::new(RelationKind::ModifiedFrom, related)
    }
}
