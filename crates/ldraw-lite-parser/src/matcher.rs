// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog identifier resolution
//!
//! Maps a catalog part identifier (plus optional relationship hints) to an
//! indexed geometry file through three tiers tried in strict order:
//!
//! 1. exact or alternate spelling (confidence 1.0)
//! 2. printed-from / modified-from parent (0.90)
//! 3. identifier with its variant suffix removed (0.85)

use ldraw_lite_model::{
    GeometryFileRecord, GeometryIndex, GeometryLink, MatchReason, MatchResult, RelationshipHint,
};
use std::sync::Arc;

/// Variant code prefixes, each followed by one or more digits at the end
const VARIANT_PREFIXES: [&str; 7] = ["c", "h", "pr", "ps", "pat", "cpat", "d"];

/// Candidate lookup keys for an identifier, in search order
///
/// The lower-cased identifier, then `-` -> `_`, `_` -> `-`, and finally
/// every character outside `[a-z0-9]` removed. Duplicates and empty forms
/// are dropped.
pub fn normalize_alternate_forms(identifier: &str) -> Vec<String> {
    let s = identifier.trim().to_lowercase();
    let candidates = [
        s.replace('-', "_"),
        s.replace('_', "-"),
        s.chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect(),
    ];

    let mut forms = Vec::with_capacity(4);
    for form in std::iter::once(s).chain(candidates) {
        if !form.is_empty() && !forms.contains(&form) {
            forms.push(form);
        }
    }
    forms
}

/// Remove one trailing variant code (`pr0123`, `c01`, `cpat5` ...)
///
/// Matching is case-insensitive and removes the longest code that ends
/// the identifier. The result is lower-cased and trimmed; identifiers
/// without a code come back otherwise unchanged.
pub fn strip_known_suffix(identifier: &str) -> String {
    let s = identifier.trim().to_lowercase();
    // Leftmost start position gives the longest match
    for (start, _) in s.char_indices() {
        if is_variant_code(&s[start..]) {
            return s[..start].to_string();
        }
    }
    s
}

fn is_variant_code(tail: &str) -> bool {
    VARIANT_PREFIXES.iter().any(|prefix| {
        tail.strip_prefix(prefix)
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// Tiered identifier resolver over a geometry index
pub struct IdentifierResolver<'a> {
    index: &'a dyn GeometryIndex,
}

impl<'a> IdentifierResolver<'a> {
    pub fn new(index: &'a dyn GeometryIndex) -> Self {
        Self { index }
    }

    /// Resolve an identifier, first successful tier wins
    pub fn resolve(&self, identifier: &str, hints: &[RelationshipHint]) -> MatchResult {
        if let Some(record) = self.lookup(identifier) {
            return MatchResult::exact_or_alt(record);
        }

        for hint in hints.iter().filter(|h| h.kind.carries_parent_geometry()) {
            if let Some(record) = self.lookup(&hint.related) {
                log::trace!("{} resolved through parent {}", identifier, hint.related);
                return MatchResult::parent_geometry(record);
            }
        }

        let core = strip_known_suffix(identifier);
        if !core.is_empty() && core != identifier.trim().to_lowercase() {
            if let Some(record) = self.lookup(&core) {
                log::trace!("{} resolved through base {}", identifier, core);
                return MatchResult::base_core(record);
            }
        }

        log::debug!("No geometry for identifier {}", identifier);
        MatchResult::none()
    }

    /// Resolve and build the catalog link record in one step
    pub fn link(&self, identifier: &str, hints: &[RelationshipHint]) -> GeometryLink {
        GeometryLink::from_match(&self.resolve(identifier, hints))
    }

    /// Exact-or-alternate lookup
    ///
    /// Catalog identifiers are whole stems, so unlike sub-file names they
    /// never fall back to their last path component.
    pub fn lookup(&self, identifier: &str) -> Option<Arc<GeometryFileRecord>> {
        normalize_alternate_forms(identifier)
            .iter()
            .find_map(|form| self.index.find(form))
    }
}

/// Running tally of resolution outcomes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub total: usize,
    pub matched: usize,
    pub exact_or_alt: usize,
    pub parent_geometry: usize,
    pub base_core: usize,
}

impl MatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one result
    pub fn record(&mut self, result: &MatchResult) {
        self.total += 1;
        match result.reason() {
            MatchReason::ExactOrAlt => self.exact_or_alt += 1,
            MatchReason::ParentGeometry => self.parent_geometry += 1,
            MatchReason::BaseCore => self.base_core += 1,
            MatchReason::None => return,
        }
        self.matched += 1;
    }

    pub fn unmatched(&self) -> usize {
        self.total - self.matched
    }

    /// Fraction of identifiers matched, 0 when nothing was counted
    pub fn match_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matched as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileIndex;
    use ldraw_lite_model::RelationKind;
    use std::path::PathBuf;

    fn index(stems: &[&str]) -> FileIndex {
        FileIndex::from_records(stems.iter().map(|stem| GeometryFileRecord {
            stem: stem.to_string(),
            path: PathBuf::from(format!("ldraw/parts/{stem}.dat")),
            file_name: format!("{stem}.dat"),
            header_comment: None,
            org_tag: None,
            size_bytes: 0,
            modified_time: 0,
        }))
    }

    #[test]
    fn test_alternate_forms() {
        assert_eq!(
            normalize_alternate_forms("973-C01_x"),
            vec!["973-c01_x", "973_c01_x", "973-c01-x", "973c01x"]
        );
        assert_eq!(normalize_alternate_forms("3001"), vec!["3001"]);
        assert!(normalize_alternate_forms("  ").is_empty());
    }

    #[test]
    fn test_strip_known_suffix() {
        assert_eq!(strip_known_suffix("3001pr0001"), "3001");
        assert_eq!(strip_known_suffix("14769PR1235"), "14769");
        assert_eq!(strip_known_suffix("973c01"), "973");
        assert_eq!(strip_known_suffix("3626bpat5"), "3626b");
        assert_eq!(strip_known_suffix("3626cpat5"), "3626");
        assert_eq!(strip_known_suffix("3068bps1"), "3068b");
        assert_eq!(strip_known_suffix("3001"), "3001");
        assert_eq!(strip_known_suffix("3001pr"), "3001pr");
        assert_eq!(strip_known_suffix("3001pr01a"), "3001pr01a");
        // Only one code is removed
        assert_eq!(strip_known_suffix("970c00pr0001"), "970c00");
    }

    #[test]
    fn test_exact_tier() {
        let idx = index(&["3001", "3001pr0001"]);
        let resolver = IdentifierResolver::new(&idx);

        let m = resolver.resolve("3001pr0001", &[RelationshipHint::printed_from("3001")]);
        assert_eq!(m.reason(), MatchReason::ExactOrAlt);
        assert_eq!(m.confidence(), 1.0);
        assert_eq!(m.record().unwrap().stem, "3001pr0001");
    }

    #[test]
    fn test_alternate_spelling_tier() {
        let idx = index(&["u9054_s", "30361c"]);
        let resolver = IdentifierResolver::new(&idx);

        assert_eq!(resolver.resolve("U9054-S", &[]).reason(), MatchReason::ExactOrAlt);
        assert_eq!(resolver.resolve("30361-c", &[]).reason(), MatchReason::ExactOrAlt);
    }

    #[test]
    fn test_parent_tier_beats_base_core() {
        let idx = index(&["3001", "3002"]);
        let resolver = IdentifierResolver::new(&idx);
        let hints = [
            RelationshipHint::new(RelationKind::Alternate, "3003"),
            RelationshipHint::modified_from("9999"),
            RelationshipHint::printed_from("3002"),
        ];

        let m = resolver.resolve("3001pr0001", &hints);
        assert_eq!(m.reason(), MatchReason::ParentGeometry);
        assert_eq!(m.confidence(), 0.90);
        assert_eq!(m.record().unwrap().stem, "3002");
    }

    #[test]
    fn test_path_like_identifier_is_not_shortened() {
        let idx = index(&["3001"]);
        let resolver = IdentifierResolver::new(&idx);

        assert!(!resolver.resolve("x/3001", &[]).is_match());
        assert!(!resolver.resolve(r"s\3001", &[]).is_match());
        assert_eq!(resolver.resolve("3001.DAT", &[]).reason(), MatchReason::ExactOrAlt);
    }

    #[test]
    fn test_non_geometry_hints_ignored() {
        let idx = index(&["3003"]);
        let resolver = IdentifierResolver::new(&idx);
        let hints = [RelationshipHint::new(RelationKind::Alternate, "3003")];

        assert!(!resolver.resolve("3005", &hints).is_match());
    }

    #[test]
    fn test_base_core_tier() {
        let idx = index(&["3001"]);
        let resolver = IdentifierResolver::new(&idx);

        let m = resolver.resolve("3001pr0001", &[]);
        assert_eq!(m.reason(), MatchReason::BaseCore);
        assert_eq!(m.confidence(), 0.85);
        assert_eq!(m.path().unwrap(), PathBuf::from("ldraw/parts/3001.dat"));
    }

    #[test]
    fn test_no_match() {
        let idx = index(&["3001"]);
        let resolver = IdentifierResolver::new(&idx);

        let m = resolver.resolve("99999", &[RelationshipHint::printed_from("88888")]);
        assert_eq!(m.reason(), MatchReason::None);
        assert_eq!(m.confidence(), 0.0);
        assert!(m.record().is_none());
        assert!(!resolver.link("99999", &[]).is_matched());
    }

    #[test]
    fn test_match_stats() {
        let idx = index(&["3001", "3002"]);
        let resolver = IdentifierResolver::new(&idx);
        let mut stats = MatchStats::new();

        stats.record(&resolver.resolve("3001", &[]));
        stats.record(&resolver.resolve("3001pr5", &[]));
        stats.record(&resolver.resolve("x", &[RelationshipHint::printed_from("3002")]));
        stats.record(&resolver.resolve("x", &[]));

        assert_eq!(stats.total, 4);
        assert_eq!(stats.matched, 3);
        assert_eq!(stats.exact_or_alt, 1);
        assert_eq!(stats.base_core, 1);
        assert_eq!(stats.parent_geometry, 1);
        assert_eq!(stats.unmatched(), 1);
        assert_eq!(stats.match_rate(), 0.75);
    }
}
