// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Affine placement transforms

use ldraw_lite_model::Point;
use nalgebra::{Matrix4, Vector4};
use std::ops::Mul;

/// 4x4 affine transform with the bottom row fixed to `(0, 0, 0, 1)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform(Matrix4<f64>);

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Root frame
    pub fn identity() -> Self {
        Transform(Matrix4::identity())
    }

    /// Build from the top three rows, `[linear | translation]`
    pub fn from_affine_rows(rows: [[f64; 4]; 3]) -> Self {
        let [r0, r1, r2] = rows;
        #[rustfmt::skip]
        let m = Matrix4::new(
            r0[0], r0[1], r0[2], r0[3],
            r1[0], r1[1], r1[2], r1[3],
            r2[0], r2[1], r2[2], r2[3],
            0.0,   0.0,   0.0,   1.0,
        );
        Transform(m)
    }

    /// Pure translation
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Transform(Matrix4::new_translation(&nalgebra::Vector3::new(x, y, z)))
    }

    /// `self * child`: a child placement expressed in this frame
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform(self.0 * child.0)
    }

    /// Transform a point (homogeneous multiply, `w` dropped)
    #[inline]
    pub fn apply_point(&self, point: &Point) -> Point {
        let v = self.0 * Vector4::new(point[0], point[1], point[2], 1.0);
        [v.x, v.y, v.z]
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

impl From<Matrix4<f64>> for Transform {
    fn from(m: Matrix4<f64>) -> Self {
        Transform(m)
    }
}
