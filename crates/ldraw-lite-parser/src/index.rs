// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry file index
//!
//! Scans an ordered list of directories once and maps each normalized file
//! stem to its [`GeometryFileRecord`]. Directories later in the list win
//! for a shared stem; that ordering is how an unofficial library overrides
//! the official one. The built index is immutable.

use crate::scanner::{scan_header, DEFAULT_HEADER_LINE_CAP};
use ldraw_lite_model::{
    Error, GeometryFileRecord, GeometryIndex, Result, GEOMETRY_FILE_EXTENSION,
};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

/// Search directories of an LDraw library, in override order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LibraryLayout {
    dirs: Vec<PathBuf>,
}

impl LibraryLayout {
    /// Official directories, relative to the library root
    pub const OFFICIAL: [&'static str; 3] = ["parts", "parts/s", "p"];
    /// Unofficial directories, relative to the library root
    pub const UNOFFICIAL: [&'static str; 3] = ["unofficial/parts", "unofficial/parts/s", "unofficial/p"];

    /// Official then unofficial directories under `root`
    pub fn standard(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let dirs = Self::OFFICIAL
            .iter()
            .chain(Self::UNOFFICIAL.iter())
            .map(|rel| root.join(rel))
            .collect();
        Self { dirs }
    }

    /// Official directories only
    pub fn official(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            dirs: Self::OFFICIAL.iter().map(|rel| root.join(rel)).collect(),
        }
    }

    /// Append a directory that overrides everything before it
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Counters collected while building an index
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Directories that were listed
    pub directories_scanned: usize,
    /// Directories that do not exist or could not be listed
    pub directories_missing: usize,
    /// Files with the geometry extension that were looked at
    pub files_scanned: usize,
    /// Files skipped because they could not be read
    pub files_skipped: usize,
    /// Entries replaced by a later file with the same stem
    pub overrides: usize,
    /// Unique stems in the finished index
    pub entries: usize,
}

/// Index builder configuration
#[derive(Clone, Debug)]
pub struct IndexBuilder {
    /// Geometry file extension, matched case-insensitively
    pub extension: String,
    /// Maximum number of leading lines read per file for header metadata
    pub header_line_cap: usize,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    /// Create a builder for `.dat` files with the default header cap
    pub fn new() -> Self {
        Self {
            extension: GEOMETRY_FILE_EXTENSION.to_string(),
            header_line_cap: DEFAULT_HEADER_LINE_CAP,
        }
    }

    /// Set the geometry file extension (without the dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Set how many leading lines are read for header metadata
    pub fn with_header_line_cap(mut self, cap: usize) -> Self {
        self.header_line_cap = cap;
        self
    }

    /// Build an index from directories in override order
    pub fn build<P: AsRef<Path>>(&self, dirs: &[P]) -> FileIndex {
        self.build_with_stats(dirs).0
    }

    /// Build an index and report scan statistics
    ///
    /// Each directory is scanned non-recursively. Missing directories and
    /// unreadable files are skipped and counted, never fatal.
    pub fn build_with_stats<P: AsRef<Path>>(&self, dirs: &[P]) -> (FileIndex, IndexStats) {
        let mut index = FileIndex::new().with_extension(&self.extension);
        let mut stats = IndexStats::default();

        for dir in dirs {
            self.scan_dir(dir.as_ref(), &mut index, &mut stats);
        }

        stats.entries = index.len();
        log::info!(
            "Indexed {} unique stems from {} files ({} directories scanned, {} missing, {} skipped, {} overrides)",
            stats.entries,
            stats.files_scanned,
            stats.directories_scanned,
            stats.directories_missing,
            stats.files_skipped,
            stats.overrides
        );
        (index, stats)
    }

    fn scan_dir(&self, dir: &Path, index: &mut FileIndex, stats: &mut IndexStats) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Skipping directory {}: {}", dir.display(), e);
                stats.directories_missing += 1;
                return;
            }
        };
        stats.directories_scanned += 1;

        // Sorted so that case-colliding names resolve the same way every build
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| self.has_geometry_extension(path) && path.is_file())
            .collect();
        paths.sort();

        for path in paths {
            stats.files_scanned += 1;
            match self.read_record(&path) {
                Ok(record) => {
                    if let Some(previous) = index.insert(record) {
                        stats.overrides += 1;
                        log::debug!(
                            "{} overrides {}",
                            path.display(),
                            previous.path.display()
                        );
                    }
                }
                Err(e) => {
                    stats.files_skipped += 1;
                    log::debug!("Skipping unreadable file {}: {}", path.display(), e);
                }
            }
        }
    }

    fn has_geometry_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    /// Read one file's record; nothing is inserted unless this succeeds
    fn read_record(&self, path: &Path) -> io::Result<GeometryFileRecord> {
        let invalid = || io::Error::new(io::ErrorKind::InvalidData, "non UTF-8 file name");
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(invalid)?
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(invalid)?
            .to_lowercase();

        let file = File::open(path)?;
        let metadata = file.metadata()?;
        let header = scan_header(BufReader::new(file), self.header_line_cap)?;

        let modified_time = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Ok(GeometryFileRecord {
            stem,
            path: path.to_path_buf(),
            file_name,
            header_comment: header.header_comment,
            org_tag: header.org_tag,
            size_bytes: metadata.len(),
            modified_time,
        })
    }
}

/// In-memory geometry file index implementing [`GeometryIndex`]
#[derive(Clone, Debug, PartialEq)]
pub struct FileIndex {
    records: FxHashMap<String, Arc<GeometryFileRecord>>,
    /// Extension stripped from names at lookup
    extension: String,
}

impl Default for FileIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl FileIndex {
    /// Create an empty index for `.dat` files
    pub fn new() -> Self {
        Self {
            records: FxHashMap::default(),
            extension: GEOMETRY_FILE_EXTENSION.to_string(),
        }
    }

    /// Set the extension stripped from names at lookup
    ///
    /// Index documents do not record it, so a loaded index of non-`.dat`
    /// files needs this before names resolve.
    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim_start_matches('.').to_string();
        self
    }

    /// Build from directories with default settings
    pub fn build<P: AsRef<Path>>(dirs: &[P]) -> Self {
        IndexBuilder::new().build(dirs)
    }

    /// Build from an LDraw library layout with default settings
    pub fn build_layout(layout: &LibraryLayout) -> Self {
        IndexBuilder::new().build(layout.dirs())
    }

    /// Build from records; a later record replaces an earlier one with the same stem
    pub fn from_records(records: impl IntoIterator<Item = GeometryFileRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Insert a record under its (re-normalized) stem, returning what it replaced
    fn insert(&mut self, mut record: GeometryFileRecord) -> Option<Arc<GeometryFileRecord>> {
        record.stem = record.stem.to_lowercase();
        self.records.insert(record.stem.clone(), Arc::new(record))
    }

    /// All stems, unordered
    pub fn stems(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// All records, unordered
    pub fn records(&self) -> impl Iterator<Item = &Arc<GeometryFileRecord>> {
        self.records.values()
    }

    /// Records sorted by stem
    pub fn sorted(&self) -> BTreeMap<&str, &GeometryFileRecord> {
        self.records
            .iter()
            .map(|(stem, record)| (stem.as_str(), record.as_ref()))
            .collect()
    }

    /// Serialize as a JSON object keyed by stem, keys sorted
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.sorted()).map_err(|e| Error::index_format(e.to_string()))
    }

    /// Parse a JSON index document; keys are lower-cased
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, GeometryFileRecord> =
            serde_json::from_str(json).map_err(|e| Error::index_format(e.to_string()))?;
        Ok(Self::from_records(raw.into_iter().map(|(stem, mut record)| {
            record.stem = stem;
            record
        })))
    }

    /// Write the index document to `path`
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    /// Load an index document; a missing file is [`Error::MissingInput`]
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let index = Self::from_json_str(&json)?;
        log::debug!("Loaded {} index entries from {}", index.len(), path.display());
        Ok(index)
    }
}

impl GeometryIndex for FileIndex {
    fn get(&self, key: &str) -> Option<Arc<GeometryFileRecord>> {
        self.records.get(key).cloned()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}
