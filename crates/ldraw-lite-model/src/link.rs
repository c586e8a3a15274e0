// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry link attached to a catalog record after resolution

use crate::{LibrarySource, MatchReason, MatchResult, LDU_TO_MM};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Native length unit of the linked geometry
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitScale {
    /// Unit name, always `"LDU"`
    pub unit: LengthUnit,
    /// Millimeters per unit
    pub to_mm: f64,
}

impl Default for UnitScale {
    fn default() -> Self {
        Self {
            unit: LengthUnit::Ldu,
            to_mm: LDU_TO_MM,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    #[serde(rename = "LDU")]
    Ldu,
}

/// Why an identifier is unmatched
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    NoMatch,
}

/// Matched/unmatched geometry state of one catalog record
///
/// Serializes with a `status` tag:
///
/// ```json
/// {"status":"matched","file":"parts/3001.dat","confidence":1.0,
///  "match_reason":"exact_or_alt","source":"official",
///  "scale":{"unit":"LDU","to_mm":0.4}}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeometryLink {
    Matched {
        file: PathBuf,
        confidence: f64,
        match_reason: MatchReason,
        source: LibrarySource,
        scale: UnitScale,
    },
    Unmatched {
        /// Always `None`; written as `"file": null` so flat records keep the key
        #[serde(default)]
        file: Option<PathBuf>,
        reason: UnmatchedReason,
    },
}

impl GeometryLink {
    /// Build the link for a resolution outcome
    pub fn from_match(result: &MatchResult) -> Self {
        match result.record() {
            Some(record) => GeometryLink::Matched {
                file: record.path.clone(),
                confidence: result.confidence(),
                match_reason: result.reason(),
                source: record.source(),
                scale: UnitScale::default(),
            },
            None => GeometryLink::Unmatched {
                file: None,
                reason: UnmatchedReason::NoMatch,
            },
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, GeometryLink::Matched { .. })
    }

    /// Linked file, if matched
    pub fn file(&self) -> Option<&PathBuf> {
        match self {
            GeometryLink::Matched { file, .. } => Some(file),
            GeometryLink::Unmatched { .. } => None,
        }
    }
}

impl From<&MatchResult> for GeometryLink {
    fn from(result: &MatchResult) -> Self {
        GeometryLink::from_match(result)
    }
}
