// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LDraw-Lite Parser - Line parsing, file index and identifier resolution
//!
//! This crate reads LDraw geometry files. It implements the
//! `GeometryIndex` trait defined in `ldraw-lite-model`, so the geometry
//! crate only ever sees the abstraction.
//!
//! # Features
//!
//! - **Line tokenization** using `nom` combinators and `lexical-core` numbers
//! - **SIMD-accelerated line splitting** using `memchr`
//! - **Bounded header scans** - only the leading meta block is read at index time
//! - **Fx-hashed, Arc-shared records** - cheap lookups from many threads
//! - **JSON index documents** - build once, load anywhere
//!
//! # Example
//!
//! ```ignore
//! use ldraw_lite_parser::{FileIndex, IdentifierResolver, LibraryLayout};
//!
//! let index = FileIndex::build_layout(&LibraryLayout::standard("data/ldraw"));
//! index.save_json("data/_index/ldraw_index.json")?;
//!
//! let resolver = IdentifierResolver::new(&index);
//! let result = resolver.resolve("3001pr0001", &[]);
//! println!("{} ({})", result.reason(), result.confidence());
//! ```

mod index;
mod matcher;
mod scanner;
mod tokenizer;

pub use index::{FileIndex, IndexBuilder, IndexStats, LibraryLayout};
pub use matcher::{normalize_alternate_forms, strip_known_suffix, IdentifierResolver, MatchStats};
pub use scanner::{scan_header, HeaderInfo, LineScanner, DEFAULT_HEADER_LINE_CAP};
pub use tokenizer::{parse_line, LineError, LineKind, Primitive, SubReference, SubReferenceLayout};

use ldraw_lite_model::{GeometryIndex, MatchResult, RelationshipHint};

/// Quick resolve function for simple use cases
pub fn resolve(
    index: &dyn GeometryIndex,
    identifier: &str,
    hints: &[RelationshipHint],
) -> MatchResult {
    IdentifierResolver::new(index).resolve(identifier, hints)
}
