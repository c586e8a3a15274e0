// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Expander - Sub-file expansion into a flat triangle soup
//!
//! Walks a geometry file depth-first, resolving sub-references through a
//! `GeometryIndex` and composing placement transforms on the way down.
//! Triangles and split quads are emitted in line order, interleaved with
//! the output of sub-files exactly where they are referenced.

use crate::{bounds, Error, Result, Transform};
use ldraw_lite_model::{BoundingBox, GeometryIndex, Point, Triangle, TriangleSoup};
use ldraw_lite_parser::{parse_line, LineScanner, Primitive, SubReference, SubReferenceLayout};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default sub-reference nesting limit; the root file is depth 0
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Split a quad into `(0, 1, 2)` and `(0, 2, 3)`
#[inline]
pub fn split_quad(quad: [Point; 4]) -> [Triangle; 2] {
    let [a, b, c, d] = quad;
    [[a, b, c], [a, c, d]]
}

/// Partial-data conditions met during one expansion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Files whose lines were walked, the root included
    pub files_visited: usize,
    /// Sub-reference names with no index entry
    pub unresolved_references: usize,
    /// Recognized lines with too few or non-numeric fields
    pub malformed_lines: usize,
    /// Resolved sub-files that could not be read
    pub unreadable_files: usize,
    /// Sub-references not followed because of the depth limit
    pub depth_limited: usize,
    /// Edge, conditional and unknown lines
    pub ignored_lines: usize,
}

/// Output of one expansion
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expansion {
    /// Triangles in the root frame, native units (LDU)
    pub triangles: TriangleSoup,
    pub stats: ExpansionStats,
}

impl Expansion {
    /// Axis-aligned bounds of the triangles
    pub fn bounds(&self) -> BoundingBox {
        bounds(&self.triangles)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Recursive geometry expander
///
/// Holds only a shared reference to the index and its settings, so one
/// expander can serve many expansions, concurrently if needed.
pub struct GeometryExpander<'a> {
    index: &'a dyn GeometryIndex,
    /// Deepest sub-reference level that is still followed
    pub max_depth: usize,
    /// Field order of sub-reference lines
    pub layout: SubReferenceLayout,
}

impl<'a> GeometryExpander<'a> {
    /// Create new expander with default settings
    pub fn new(index: &'a dyn GeometryIndex) -> Self {
        Self {
            index,
            max_depth: DEFAULT_MAX_DEPTH,
            layout: SubReferenceLayout::default(),
        }
    }

    /// Set the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the sub-reference field order
    pub fn with_layout(mut self, layout: SubReferenceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Expand a root file into triangles
    ///
    /// Fails only when the root itself is missing or unreadable.
    pub fn expand(&self, root: impl AsRef<Path>) -> Result<Expansion> {
        self.run(root.as_ref(), None)
    }

    /// Expand a root file, checking `cancel` before every descent
    ///
    /// Once the flag is set the partial soup is dropped and
    /// [`Error::Cancelled`] is returned.
    pub fn expand_cancellable(&self, root: impl AsRef<Path>, cancel: &AtomicBool) -> Result<Expansion> {
        self.run(root.as_ref(), Some(cancel))
    }

    /// Resolve a part name through the index and expand it
    pub fn expand_part(&self, name: &str) -> Result<Expansion> {
        let record = self
            .index
            .resolve(name)
            .ok_or_else(|| Error::missing_input(name))?;
        self.expand(&record.path)
    }

    /// Expand independent roots in parallel, results in input order
    pub fn expand_many<P>(&self, roots: &[P]) -> Vec<Result<Expansion>>
    where
        P: AsRef<Path> + Sync,
    {
        roots.par_iter().map(|root| self.expand(root)).collect()
    }

    fn run(&self, root: &Path, cancel: Option<&AtomicBool>) -> Result<Expansion> {
        let content = read_lossy(root).map_err(|e| Error::io(root, e))?;

        let mut walk = Walk {
            expander: self,
            cancel,
            cache: FxHashMap::default(),
            out: TriangleSoup::new(),
            stats: ExpansionStats::default(),
        };
        walk.check_cancelled()?;
        walk.visit(root, &content, &Transform::identity(), 0)?;

        log::debug!(
            "Expanded {}: {} triangles from {} files ({} unresolved, {} malformed, {} unreadable, {} depth-limited)",
            root.display(),
            walk.out.len(),
            walk.stats.files_visited,
            walk.stats.unresolved_references,
            walk.stats.malformed_lines,
            walk.stats.unreadable_files,
            walk.stats.depth_limited
        );
        Ok(Expansion {
            triangles: walk.out,
            stats: walk.stats,
        })
    }
}

/// Read a file as text, replacing invalid UTF-8
fn read_lossy(path: &Path) -> io::Result<Arc<str>> {
    let bytes = fs::read(path)?;
    Ok(Arc::from(String::from_utf8_lossy(&bytes)))
}

// ============================================================================
// Traversal
// ============================================================================

/// State of one expansion call
struct Walk<'w, 'a> {
    expander: &'w GeometryExpander<'a>,
    cancel: Option<&'w AtomicBool>,
    /// Sub-file contents read so far; `None` for unreadable files
    cache: FxHashMap<PathBuf, Option<Arc<str>>>,
    out: TriangleSoup,
    stats: ExpansionStats,
}

impl Walk<'_, '_> {
    fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }

    /// Emit one file's geometry; only cancellation is an error here
    fn visit(&mut self, path: &Path, content: &str, transform: &Transform, depth: usize) -> Result<()> {
        self.stats.files_visited += 1;

        for (line_no, line) in LineScanner::new(content) {
            match parse_line(line) {
                Ok(None) | Ok(Some(Primitive::Comment(_))) => {}
                Ok(Some(Primitive::Ignored(_))) => self.stats.ignored_lines += 1,
                Ok(Some(Primitive::Triangle { points, .. })) => {
                    self.out.push(points.map(|p| transform.apply_point(&p)));
                }
                Ok(Some(Primitive::Quad { points, .. })) => {
                    let [first, second] = split_quad(points.map(|p| transform.apply_point(&p)));
                    self.out.push(first);
                    self.out.push(second);
                }
                Ok(Some(Primitive::SubReference(sub))) => {
                    self.descend(path, &sub, transform, depth)?;
                }
                Err(e) => {
                    self.stats.malformed_lines += 1;
                    log::trace!("{}:{}: skipping malformed line: {}", path.display(), line_no, e);
                }
            }
        }
        Ok(())
    }

    fn descend(
        &mut self,
        parent_path: &Path,
        sub: &SubReference<'_>,
        parent: &Transform,
        depth: usize,
    ) -> Result<()> {
        let Some(record) = self.expander.index.resolve(sub.file) else {
            self.stats.unresolved_references += 1;
            log::trace!("{}: unresolved sub-file {}", parent_path.display(), sub.file);
            return Ok(());
        };

        let child_depth = depth + 1;
        if child_depth > self.expander.max_depth {
            self.stats.depth_limited += 1;
            log::debug!(
                "{}: depth limit {} reached at {}",
                parent_path.display(),
                self.expander.max_depth,
                sub.file
            );
            return Ok(());
        }
        self.check_cancelled()?;

        let Some(content) = self.load(&record.path) else {
            self.stats.unreadable_files += 1;
            return Ok(());
        };

        let placement = Transform::from_affine_rows(sub.affine_rows(self.expander.layout));
        let transform = parent.compose(&placement);
        self.visit(&record.path, &content, &transform, child_depth)
    }

    /// Read a sub-file once per expansion
    fn load(&mut self, path: &Path) -> Option<Arc<str>> {
        if let Some(cached) = self.cache.get(path) {
            return cached.clone();
        }
        let content = match read_lossy(path) {
            Ok(content) => Some(content),
            Err(e) => {
                log::debug!("Skipping unreadable sub-file {}: {}", path.display(), e);
                None
            }
        };
        self.cache.insert(path.to_path_buf(), content.clone());
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldraw_lite_parser::FileIndex;
    use tempfile::{tempdir, TempDir};

    fn library(files: &[(&str, &str)]) -> (TempDir, FileIndex) {
        let tmp = tempdir().unwrap();
        for (name, content) in files {
            fs::write(tmp.path().join(name), content).unwrap();
        }
        let index = FileIndex::build(&[tmp.path()]);
        (tmp, index)
    }

    #[test]
    fn test_split_quad_winding() {
        let q = [[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let [t1, t2] = split_quad(q);
        assert_eq!(t1, [q[0], q[1], q[2]]);
        assert_eq!(t2, [q[0], q[2], q[3]]);
    }

    #[test]
    fn test_line_order_is_kept() {
        let (tmp, index) = library(&[
            ("root.dat", "3 16 0 0 0 1 0 0 0 1 0\n1 16 1 0 0 0 1 0 0 0 1 0 0 0 tri.dat\n3 16 9 9 9 1 0 0 0 1 0\n"),
            ("tri.dat", "3 16 5 5 5 1 0 0 0 1 0\n"),
        ]);
        let out = GeometryExpander::new(&index).expand(tmp.path().join("root.dat")).unwrap();

        let firsts: Vec<_> = out.triangles.iter().map(|t| t[0]).collect();
        assert_eq!(firsts, vec![[0.0; 3], [5.0; 3], [9.0; 3]]);
        assert_eq!(out.stats.files_visited, 2);
    }

    #[test]
    fn test_sub_file_read_once() {
        let (tmp, index) = library(&[
            ("root.dat", "1 16 1 0 0 0 1 0 0 0 1 0 0 0 stud.dat\n1 16 1 0 0 0 1 0 0 0 1 20 0 0 stud.dat\n"),
            ("stud.dat", "3 16 0 0 0 1 0 0 0 1 0\n"),
        ]);
        let expander = GeometryExpander::new(&index);
        let out = expander.expand(tmp.path().join("root.dat")).unwrap();

        assert_eq!(out.triangle_count(), 2);
        assert_eq!(out.stats.files_visited, 3);
        assert_eq!(out.triangles.triangles()[1][0], [20.0, 0.0, 0.0]);
    }

    #[test]
    fn test_counts_ignored_and_malformed_lines() {
        let (tmp, index) = library(&[(
            "root.dat",
            "0 Title\n2 24 0 0 0 1 1 1\n5 24 0 0 0 1 1 1 0 0 1 0 1 0\n3 16 0 0\n4 16 a 0 0 1 0 0 1 1 0 0 1 0\n3 16 0 0 0 1 0 0 0 1 0\n",
        )]);
        let out = GeometryExpander::new(&index).expand(tmp.path().join("root.dat")).unwrap();

        assert_eq!(out.triangle_count(), 1);
        assert_eq!(out.stats.ignored_lines, 2);
        assert_eq!(out.stats.malformed_lines, 2);
    }

    #[test]
    fn test_cancelled_before_start() {
        let (tmp, index) = library(&[("root.dat", "3 16 0 0 0 1 0 0 0 1 0\n")]);
        let cancel = AtomicBool::new(true);
        let result = GeometryExpander::new(&index).expand_cancellable(tmp.path().join("root.dat"), &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_expand_part_by_name() {
        let (_tmp, index) = library(&[("3001.dat", "4 16 0 0 0 1 0 0 1 1 0 0 1 0\n")]);
        let expander = GeometryExpander::new(&index);

        assert_eq!(expander.expand_part("3001").unwrap().triangle_count(), 2);
        assert!(matches!(expander.expand_part("9999"), Err(Error::MissingInput(_))));
    }
}
