// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat triangle output and its bounding box
//!
//! Coordinates are in LDraw units (LDU) unless a method says otherwise.

use crate::LDU_TO_MM;
use serde::{Deserialize, Serialize};

/// A point `[x, y, z]`
pub type Point = [f64; 3];

/// Three points, already in the root frame of the expansion
pub type Triangle = [Point; 3];

/// Ordered, unindexed, unwelded triangle list
///
/// Order is expansion order (depth-first, file line order). Nothing is
/// deduplicated; two identical triangles stay two triangles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleSoup {
    triangles: Vec<Triangle>,
}

impl TriangleSoup {
    /// Create an empty soup
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    /// Create an empty soup with room for `capacity` triangles
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Append all triangles of `other`, keeping order
    pub fn append(&mut self, other: &mut TriangleSoup) {
        self.triangles.append(&mut other.triangles);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.iter()
    }

    /// Iterate every vertex of every triangle
    pub fn vertices(&self) -> impl Iterator<Item = &Point> {
        self.triangles.iter().flat_map(|t| t.iter())
    }

    /// Flatten to `[x0, y0, z0, x1, ...]`, three vertices per triangle
    pub fn to_positions(&self) -> Vec<f64> {
        let mut positions = Vec::with_capacity(self.triangles.len() * 9);
        for point in self.vertices() {
            positions.extend_from_slice(point);
        }
        positions
    }

    /// Copy of this soup scaled from LDU to millimeters
    pub fn to_millimeters(&self) -> TriangleSoup {
        let triangles = self
            .triangles
            .iter()
            .map(|t| t.map(|p| p.map(|c| c * LDU_TO_MM)))
            .collect();
        TriangleSoup { triangles }
    }

    pub fn into_inner(self) -> Vec<Triangle> {
        self.triangles
    }
}

impl From<Vec<Triangle>> for TriangleSoup {
    fn from(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }
}

impl FromIterator<Triangle> for TriangleSoup {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        Self {
            triangles: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TriangleSoup {
    type Item = &'a Triangle;
    type IntoIter = std::slice::Iter<'a, Triangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.triangles.iter()
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// The all-zero box reported for empty input
    pub fn zero() -> Self {
        Self {
            min: [0.0; 3],
            max: [0.0; 3],
        }
    }

    /// Degenerate box containing a single point
    pub fn from_point(point: Point) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grow the box to contain `point`
    #[inline]
    pub fn include(&mut self, point: &Point) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    /// Extent along each axis
    pub fn size(&self) -> Point {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> Point {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Same box expressed in millimeters
    pub fn to_millimeters(&self) -> BoundingBox {
        BoundingBox {
            min: self.min.map(|c| c * LDU_TO_MM),
            max: self.max.map(|c| c * LDU_TO_MM),
        }
    }
}
