// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry file lookup trait

use crate::{Error, GeometryFileRecord, Result, GEOMETRY_FILE_EXTENSION};
use std::path::PathBuf;
use std::sync::Arc;

/// Read-only stem -> geometry file lookup
///
/// This trait is what the identifier resolver and the geometry expander
/// consume. Implementations must be immutable once built so that lookups
/// can be shared across threads without locking.
///
/// # Example
///
/// ```ignore
/// use ldraw_lite_model::GeometryIndex;
///
/// fn describe(index: &dyn GeometryIndex) {
///     if let Some(record) = index.resolve("3001.DAT") {
///         println!("{} -> {}", record.stem, record.path.display());
///     }
/// }
/// ```
pub trait GeometryIndex: Send + Sync {
    /// Look up a record by an already-normalized key
    fn get(&self, key: &str) -> Option<Arc<GeometryFileRecord>>;

    /// Number of indexed stems
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// File extension stripped from names before lookup (without the dot)
    fn extension(&self) -> &str {
        GEOMETRY_FILE_EXTENSION
    }

    /// Look up a name as a whole stem, with no path-component fallback
    ///
    /// Used for catalog identifiers, where `x/3001` must not mean `3001`.
    fn find(&self, name: &str) -> Option<Arc<GeometryFileRecord>> {
        self.get(&normalize_name_with(name, self.extension()))
    }

    /// Resolve a file or sub-file name
    ///
    /// The name is case-folded and stripped of its extension. Names that
    /// carry a library-relative prefix (`s\3001s01.dat`) are tried whole
    /// first and then by their last path component.
    fn resolve(&self, name: &str) -> Option<Arc<GeometryFileRecord>> {
        let key = normalize_name_with(name, self.extension());
        if let Some(record) = self.get(&key) {
            return Some(record);
        }
        match key.rsplit_once('/') {
            Some((_, last)) if !last.is_empty() => self.get(last),
            _ => None,
        }
    }
}

/// Extension methods for GeometryIndex
pub trait GeometryIndexExt: GeometryIndex {
    /// Check whether a name resolves
    fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Resolve a name or report it as a missing input
    fn resolve_or_err(&self, name: &str) -> Result<Arc<GeometryFileRecord>> {
        self.resolve(name)
            .ok_or_else(|| Error::missing_input(PathBuf::from(name)))
    }
}

// Blanket implementation for all GeometryIndex types
impl<T: GeometryIndex + ?Sized> GeometryIndexExt for T {}

/// Normalize a file or reference name into an index key
///
/// Trims, lower-cases, turns `\` into `/` and strips a trailing
/// `.dat` extension.
pub fn normalize_name(name: &str) -> String {
    normalize_name_with(name, GEOMETRY_FILE_EXTENSION)
}

/// [`normalize_name`] for an index keyed on another extension
///
/// The extension is matched case-insensitively and only stripped when
/// something is left in front of it.
pub fn normalize_name_with(name: &str, extension: &str) -> String {
    let key = name.trim().replace('\\', "/").to_lowercase();
    let extension = extension.trim_start_matches('.').to_lowercase();
    if extension.is_empty() {
        return key;
    }
    match key.strip_suffix(extension.as_str()).and_then(|k| k.strip_suffix('.')) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapIndex(HashMap<String, Arc<GeometryFileRecord>>);

    impl GeometryIndex for MapIndex {
        fn get(&self, key: &str) -> Option<Arc<GeometryFileRecord>> {
            self.0.get(key).cloned()
        }

        fn len(&self) -> usize {
            self.0.len()
        }
    }

    fn index(stems: &[&str]) -> MapIndex {
        MapIndex(
            stems
                .iter()
                .map(|stem| {
                    let record = GeometryFileRecord {
                        stem: stem.to_string(),
                        path: PathBuf::from(format!("parts/{stem}.dat")),
                        file_name: format!("{stem}.dat"),
                        header_comment: None,
                        org_tag: None,
                        size_bytes: 0,
                        modified_time: 0,
                    };
                    (stem.to_string(), Arc::new(record))
                })
                .collect(),
        )
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("3001.dat"), "3001");
        assert_eq!(normalize_name("3001.DAT"), "3001");
        assert_eq!(normalize_name("  Stud.dat "), "stud");
        assert_eq!(normalize_name(r"S\3001s01.dat"), "s/3001s01");
        assert_eq!(normalize_name("3001"), "3001");
        assert_eq!(normalize_name(".dat"), ".dat");
        assert_eq!(normalize_name("foodat"), "foodat");
    }

    #[test]
    fn test_normalize_name_with_other_extension() {
        assert_eq!(normalize_name_with("Model.LDR", "ldr"), "model");
        assert_eq!(normalize_name_with("model.ldr", ".ldr"), "model");
        assert_eq!(normalize_name_with("3001.dat", "ldr"), "3001.dat");
        assert_eq!(normalize_name_with(".ldr", "ldr"), ".ldr");
    }

    #[test]
    fn test_find_has_no_component_fallback() {
        let idx = index(&["3001"]);
        assert!(idx.find("3001.DAT").is_some());
        assert!(idx.find("x/3001").is_none());
        assert!(idx.resolve("x/3001").is_some());
    }

    #[test]
    fn test_resolve_case_and_extension() {
        let idx = index(&["3001", "stud"]);
        assert!(idx.resolve("3001.DAT").is_some());
        assert!(idx.resolve("STUD").is_some());
        assert!(idx.resolve("3002.dat").is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_last_component() {
        let idx = index(&["3001s01", "4-4disc"]);
        assert_eq!(idx.resolve(r"s\3001s01.dat").unwrap().stem, "3001s01");
        assert_eq!(idx.resolve("48/4-4disc.dat").unwrap().stem, "4-4disc");
        assert!(idx.resolve("s/").is_none());
    }

    #[test]
    fn test_resolve_or_err() {
        let idx = index(&["3001"]);
        assert!(idx.contains("3001.dat"));
        assert!(matches!(
            idx.resolve_or_err("9999"),
            Err(Error::MissingInput(_))
        ));
    }
}
