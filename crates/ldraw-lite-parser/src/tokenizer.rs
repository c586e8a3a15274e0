// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LDraw line tokenizer using nom combinators
//!
//! Each non-empty line is a whitespace-separated list of fields whose first
//! field is the line type code:
//!
//! | code | meaning | fields after code |
//! |------|---------|-------------------|
//! | `0` | comment / meta | free text |
//! | `1` | sub-file reference | colour, 12 numbers, file name |
//! | `2` | edge line | ignored |
//! | `3` | triangle | colour, 9 numbers |
//! | `4` | quad | colour, 12 numbers |
//! | `5` | optional line | ignored |

use ldraw_lite_model::Point;
use nom::{
    bytes::complete::{take_till1, take_while},
    multi::many0,
    sequence::preceded,
    IResult, Parser,
};
use thiserror::Error;

/// Line type, from the first field of a line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineKind {
    Comment,
    SubReference,
    Line,
    Triangle,
    Quad,
    OptionalLine,
    Unknown,
}

impl LineKind {
    /// Classify a type code field
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => LineKind::Comment,
            "1" => LineKind::SubReference,
            "2" => LineKind::Line,
            "3" => LineKind::Triangle,
            "4" => LineKind::Quad,
            "5" => LineKind::OptionalLine,
            _ => LineKind::Unknown,
        }
    }

    /// Number of numeric fields required after the colour
    pub fn numeric_fields(self) -> usize {
        match self {
            LineKind::SubReference | LineKind::Quad => 12,
            LineKind::Triangle => 9,
            _ => 0,
        }
    }
}

/// Malformed line of a recognized geometry type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    /// Fewer fields than the line type requires
    #[error("{kind:?} line needs {expected} fields, found {found}")]
    TooFewFields {
        kind: LineKind,
        expected: usize,
        found: usize,
    },

    /// A coordinate or matrix field is not a number
    #[error("{kind:?} line has non-numeric field '{field}'")]
    InvalidNumber { kind: LineKind, field: String },
}

/// Field order of the 12 numbers on a sub-file reference line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SubReferenceLayout {
    /// `a b c d e f g h i x y z`: linear block first, `a b c` is the
    /// first column, then the translation
    #[default]
    LinearFirst,
    /// `x y z a b c d e f g h i`: translation first, then the linear
    /// block row by row (the published LDraw order)
    Standard,
}

/// Placement of a sub-file inside its parent
#[derive(Clone, Debug, PartialEq)]
pub struct SubReference<'a> {
    /// Colour field, uninterpreted
    pub color: &'a str,
    /// The 12 numbers in file order
    pub values: [f64; 12],
    /// Referenced file name as written
    pub file: &'a str,
}

impl SubReference<'_> {
    /// Top three rows of the 4x4 affine placement, `[linear | translation]`
    pub fn affine_rows(&self, layout: SubReferenceLayout) -> [[f64; 4]; 3] {
        let v = &self.values;
        match layout {
            SubReferenceLayout::LinearFirst => [
                [v[0], v[3], v[6], v[9]],
                [v[1], v[4], v[7], v[10]],
                [v[2], v[5], v[8], v[11]],
            ],
            SubReferenceLayout::Standard => [
                [v[3], v[4], v[5], v[0]],
                [v[6], v[7], v[8], v[1]],
                [v[9], v[10], v[11], v[2]],
            ],
        }
    }
}

/// One classified line
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive<'a> {
    /// Type 0; text after the code, trimmed
    Comment(&'a str),
    /// Type 1
    SubReference(SubReference<'a>),
    /// Type 3; points in the file's local frame
    Triangle { color: &'a str, points: [Point; 3] },
    /// Type 4; points in the file's local frame
    Quad { color: &'a str, points: [Point; 4] },
    /// Types 2, 5 and unknown codes; no geometry
    Ignored(LineKind),
}

// ============================================================================
// Parsing Primitives
// ============================================================================

/// Parse one whitespace-delimited field
fn field(input: &str) -> IResult<&str, &str> {
    preceded(
        take_while(|c: char| c.is_whitespace()),
        take_till1(|c: char| c.is_whitespace()),
    )
    .parse(input)
}

/// Split a line into fields
fn fields(input: &str) -> IResult<&str, Vec<&str>> {
    many0(field).parse(input)
}

/// Parse numeric fields into `out` using lexical-core
fn parse_numbers(kind: LineKind, src: &[&str], out: &mut [f64]) -> Result<(), LineError> {
    for (slot, text) in out.iter_mut().zip(src) {
        *slot = lexical_core::parse::<f64>(text.as_bytes()).map_err(|_| {
            LineError::InvalidNumber {
                kind,
                field: (*text).to_string(),
            }
        })?;
    }
    Ok(())
}

#[inline]
fn point(values: &[f64], i: usize) -> Point {
    [values[3 * i], values[3 * i + 1], values[3 * i + 2]]
}

fn require(kind: LineKind, parts: &[&str], expected: usize) -> Result<(), LineError> {
    if parts.len() < expected {
        return Err(LineError::TooFewFields {
            kind,
            expected,
            found: parts.len(),
        });
    }
    Ok(())
}

// ============================================================================
// Line Parsing
// ============================================================================

/// Parse a single line
///
/// Returns `Ok(None)` for blank lines. Fields beyond those a line type
/// needs are ignored.
pub fn parse_line(line: &str) -> Result<Option<Primitive<'_>>, LineError> {
    // The field parser cannot fail; it yields an empty list on blank input
    let parts = match fields(line) {
        Ok((_, parts)) => parts,
        Err(_) => return Ok(None),
    };
    let Some(code) = parts.first() else {
        return Ok(None);
    };

    let kind = LineKind::from_code(code);
    let n = kind.numeric_fields();
    let mut values = [0.0f64; 12];

    match kind {
        LineKind::Comment => {
            let text = line.trim_start();
            Ok(Some(Primitive::Comment(text[code.len()..].trim())))
        }
        LineKind::SubReference => {
            // code, colour, 12 numbers, file
            require(kind, &parts, n + 3)?;
            parse_numbers(kind, &parts[2..2 + n], &mut values)?;
            Ok(Some(Primitive::SubReference(SubReference {
                color: parts[1],
                values,
                file: parts[n + 2],
            })))
        }
        LineKind::Triangle => {
            require(kind, &parts, n + 2)?;
            parse_numbers(kind, &parts[2..2 + n], &mut values[..n])?;
            Ok(Some(Primitive::Triangle {
                color: parts[1],
                points: [point(&values, 0), point(&values, 1), point(&values, 2)],
            }))
        }
        LineKind::Quad => {
            require(kind, &parts, n + 2)?;
            parse_numbers(kind, &parts[2..2 + n], &mut values)?;
            Ok(Some(Primitive::Quad {
                color: parts[1],
                points: [
                    point(&values, 0),
                    point(&values, 1),
                    point(&values, 2),
                    point(&values, 3),
                ],
            }))
        }
        LineKind::Line | LineKind::OptionalLine | LineKind::Unknown => {
            Ok(Some(Primitive::Ignored(kind)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_split_on_any_whitespace() {
        let (_, parts) = fields("  3 16\t0 0 0 \r").unwrap();
        assert_eq!(parts, vec!["3", "16", "0", "0", "0"]);
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t\r"), Ok(None));
    }

    #[test]
    fn test_parse_comment() {
        let prim = parse_line("0 Brick  2 x  4").unwrap().unwrap();
        assert_eq!(prim, Primitive::Comment("Brick  2 x  4"));
        assert_eq!(parse_line("0").unwrap(), Some(Primitive::Comment("")));
    }

    #[test]
    fn test_parse_triangle() {
        let prim = parse_line("3 16 0 0 0 1 0 0 0 1 0").unwrap().unwrap();
        match prim {
            Primitive::Triangle { color, points } => {
                assert_eq!(color, "16");
                assert_eq!(points, [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
            }
            other => panic!("Expected triangle, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_quad() {
        let prim = parse_line("4 16 0 0 0 1 0 0 1 1 0 0 1 0").unwrap().unwrap();
        match prim {
            Primitive::Quad { points, .. } => {
                assert_eq!(points[2], [1.0, 1.0, 0.0]);
                assert_eq!(points[3], [0.0, 1.0, 0.0]);
            }
            other => panic!("Expected quad, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_sub_reference() {
        let prim = parse_line("1 16 1 0 0 0 1 0 0 0 1 10 -24.5 3e1 S\\stud.dat")
            .unwrap()
            .unwrap();
        match prim {
            Primitive::SubReference(sub) => {
                assert_eq!(sub.color, "16");
                assert_eq!(sub.file, "S\\stud.dat");
                let rows = sub.affine_rows(SubReferenceLayout::LinearFirst);
                assert_eq!(rows[0], [1.0, 0.0, 0.0, 10.0]);
                assert_eq!(rows[1], [0.0, 1.0, 0.0, -24.5]);
                assert_eq!(rows[2], [0.0, 0.0, 1.0, 30.0]);
            }
            other => panic!("Expected sub-reference, got {other:?}"),
        }
    }

    #[test]
    fn test_linear_first_is_column_major() {
        let sub = SubReference {
            color: "16",
            values: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            file: "a.dat",
        };
        let rows = sub.affine_rows(SubReferenceLayout::LinearFirst);
        assert_eq!(rows[0], [1.0, 4.0, 7.0, 10.0]);
        assert_eq!(rows[2], [3.0, 6.0, 9.0, 12.0]);

        let rows = sub.affine_rows(SubReferenceLayout::Standard);
        assert_eq!(rows[0], [4.0, 5.0, 6.0, 1.0]);
        assert_eq!(rows[1], [7.0, 8.0, 9.0, 2.0]);
        assert_eq!(rows[2], [10.0, 11.0, 12.0, 3.0]);
    }

    #[test]
    fn test_ignored_types() {
        assert_eq!(
            parse_line("2 24 0 0 0 1 1 1").unwrap(),
            Some(Primitive::Ignored(LineKind::Line))
        );
        assert_eq!(
            parse_line("5 24 0 0 0 1 1 1 0 0 0 1 1 1").unwrap(),
            Some(Primitive::Ignored(LineKind::OptionalLine))
        );
        assert_eq!(
            parse_line("7 whatever").unwrap(),
            Some(Primitive::Ignored(LineKind::Unknown))
        );
    }

    #[test]
    fn test_too_few_fields() {
        assert_eq!(
            parse_line("3 16 0 0 0 1 0 0 0 1"),
            Err(LineError::TooFewFields {
                kind: LineKind::Triangle,
                expected: 11,
                found: 10
            })
        );
        assert!(parse_line("1 16 1 0 0 0 1 0 0 0 1 0 0 0").is_err());
        assert!(parse_line("4 16 0 0 0").is_err());
    }

    #[test]
    fn test_invalid_number() {
        let err = parse_line("3 16 0 0 0 1 0 zero 0 1 0").unwrap_err();
        assert_eq!(
            err,
            LineError::InvalidNumber {
                kind: LineKind::Triangle,
                field: "zero".to_string()
            }
        );
    }

    #[test]
    fn test_extra_fields_ignored() {
        let prim = parse_line("3 16 0 0 0 1 0 0 0 1 0 99 99").unwrap();
        assert!(matches!(prim, Some(Primitive::Triangle { .. })));
    }
}
