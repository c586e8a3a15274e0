// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # LDraw-Lite Geometry Expansion
//!
//! Turns a hierarchical LDraw geometry file into a flat triangle soup.
//! This crate uses the `GeometryIndex` trait from `ldraw-lite-model` for
//! sub-file lookup, making it independent of how the index was built.
//!
//! ## Overview
//!
//! - **Expansion**: depth-first walk of sub-references with composed transforms
//! - **Quads**: always split into `(0, 1, 2)` and `(0, 2, 3)`
//! - **Bounds**: axis-aligned box over every emitted vertex
//! - **Batching**: independent roots expanded in parallel with rayon
//!
//! Output coordinates are LDraw units (LDU); multiply by
//! [`LDU_TO_MM`](ldraw_lite_model::LDU_TO_MM) for millimeters.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ldraw_lite_geometry::GeometryExpander;
//! use ldraw_lite_parser::{FileIndex, LibraryLayout};
//!
//! let index = FileIndex::build_layout(&LibraryLayout::standard("data/ldraw"));
//! let expansion = GeometryExpander::new(&index).expand_part("3001")?;
//!
//! println!("Generated {} triangles", expansion.triangle_count());
//! println!("Bounds: {:?}", expansion.bounds().to_millimeters());
//! ```

pub mod bounds;
pub mod error;
pub mod expander;
pub mod transform;

// Re-export main types
pub use bounds::bounds;
pub use error::{Error, Result};
pub use expander::{split_quad, Expansion, ExpansionStats, GeometryExpander, DEFAULT_MAX_DEPTH};
pub use transform::Transform;

use ldraw_lite_parser::FileIndex;
use std::path::Path;

/// Load a persisted index and expand one root file against it
pub fn expand_with_index_file(index_json: impl AsRef<Path>, root: impl AsRef<Path>) -> Result<Expansion> {
    let index = FileIndex::load_json(index_json)?;
    GeometryExpander::new(&index).expand(root)
}
