// Copyright 2021 Tristam MacDonald
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
mod qef;

pub use qef::*;

use crate::math::Vec3;

/// Place a mesh vertex within an active cell.
///
/// Implementations receive the points where the surface crosses the cell's
/// edges, and the surface normal at each crossing, in a fixed order. They must
/// be deterministic for the same ordered input, and must return a finite point
/// for any non-empty input, including coplanar or otherwise degenerate
/// crossings.
pub trait PlaceFeature {
    fn place_feature(&self, points: &[Vec3], normals: &[Vec3]) -> Vec3;
}

/// Places the vertex at the centroid of the edge crossings, ignoring normals.
///
/// Smooths away sharp features, but never leaves the convex hull of the
/// crossings.
#[derive(Debug, Default, Copy, Clone)]
pub struct MassPoint;

impl PlaceFeature for MassPoint {
    fn place_feature(&self, points: &[Vec3], _normals: &[Vec3]) -> Vec3 {
        mass_point(points)
    }
}

pub(crate) fn mass_point(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::zero();
    }
    points.iter().sum::<Vec3>() / points.len() as f32
}
