// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast line scanning using SIMD-accelerated byte searching
//!
//! Splits file content into lines without copying, and reads the header
//! block of a geometry file without reading the rest of it.

use memchr::memchr;
use std::io::{self, BufRead};

/// Default number of leading lines examined for header metadata
pub const DEFAULT_HEADER_LINE_CAP: usize = 80;

/// Zero-copy line iterator over file content
///
/// Uses memchr to find line ends. Yields `(line_number, line)` with
/// 1-based line numbers and any trailing `\r` removed.
pub struct LineScanner<'a> {
    content: &'a str,
    pos: usize,
    line_no: usize,
}

impl<'a> LineScanner<'a> {
    /// Create a new scanner for the given content
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            line_no: 0,
        }
    }
}

impl<'a> Iterator for LineScanner<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.content.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        let end = memchr(b'\n', &bytes[self.pos..])
            .map(|offset| self.pos + offset)
            .unwrap_or(bytes.len());

        let line = &self.content[self.pos..end];
        let line = line.strip_suffix('\r').unwrap_or(line);

        self.pos = end + 1;
        self.line_no += 1;
        Some((self.line_no, line))
    }
}

/// Header information extracted from a geometry file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderInfo {
    /// First `0` line, trimmed (usually the part description)
    pub header_comment: Option<String>,
    /// First `0 !LDRAW_ORG ...` line, trimmed
    pub org_tag: Option<String>,
}

/// Read header metadata from the start of a geometry file
///
/// Looks at no more than `line_cap` lines and stops at the first geometry
/// line (type `1` to `5`), since header meta lines precede all geometry.
/// Invalid UTF-8 is replaced, not rejected.
pub fn scan_header<R: BufRead>(mut reader: R, line_cap: usize) -> io::Result<HeaderInfo> {
    let mut info = HeaderInfo::default();
    let mut buf = Vec::with_capacity(128);

    for _ in 0..line_cap {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim();
        match trimmed.as_bytes().first() {
            Some(b'0') => {
                if info.header_comment.is_none() {
                    info.header_comment = Some(trimmed.to_string());
                }
                if info.org_tag.is_none() && is_org_line(trimmed) {
                    info.org_tag = Some(trimmed.to_string());
                }
            }
            Some(b'1'..=b'5') => break,
            _ => continue,
        }

        if info.header_comment.is_some() && info.org_tag.is_some() {
            break;
        }
    }

    Ok(info)
}

/// `0 !LDRAW_ORG <type> ...`, keyword case-insensitive
fn is_org_line(line: &str) -> bool {
    let mut parts = line.split_whitespace();
    parts.next() == Some("0")
        && parts
            .next()
            .is_some_and(|kw| kw.eq_ignore_ascii_case("!LDRAW_ORG"))
}
