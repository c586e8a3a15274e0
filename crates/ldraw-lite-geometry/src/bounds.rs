// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounds of a triangle soup

use ldraw_lite_model::{BoundingBox, TriangleSoup};

/// Coordinate-wise min/max over every vertex; a zero box when empty
pub fn bounds(soup: &TriangleSoup) -> BoundingBox {
    let mut vertices = soup.vertices();
    let Some(first) = vertices.next() else {
        return BoundingBox::zero();
    };

    vertices.fold(BoundingBox::from_point(*first), |mut bbox, p| {
        bbox.include(p);
        bbox
    })
}
