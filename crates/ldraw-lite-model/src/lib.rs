// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LDraw-Lite Model - Shared types for part resolution and geometry expansion
//!
//! This crate provides the types and the lookup trait shared by the parser
//! (index building, identifier resolution) and the geometry crate
//! (sub-file expansion, bounds). It has no file-system or parsing logic of
//! its own.
//!
//! # Architecture
//!
//! - [`GeometryIndex`] - read-only stem -> [`GeometryFileRecord`] lookup
//! - [`MatchResult`] / [`MatchReason`] - tiered resolution outcome
//! - [`RelationshipHint`] - printed-from / modified-from catalog relations
//! - [`TriangleSoup`] / [`BoundingBox`] - flat expansion output
//! - [`GeometryLink`] - matched/unmatched record attached to a catalog entry
//!
//! # Example
//!
//! ```ignore
//! use ldraw_lite_model::{GeometryIndex, GeometryLink};
//!
//! let index: Box<dyn GeometryIndex> = load_index();
//! let result = resolver.resolve("3001", &[]);
//! let link = GeometryLink::from_match(&result);
//! println!("{}", serde_json::to_string(&link)?);
//! ```

pub mod error;
pub mod geometry;
pub mod link;
pub mod resolver;
pub mod types;

// Re-export all public types
pub use error::*;
pub use geometry::*;
pub use link::*;
pub use resolver::*;
pub use types::*;
