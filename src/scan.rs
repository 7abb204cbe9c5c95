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
use crate::{
    field::VoxelField,
    index::{Axis, EdgeId, VoxelId},
    math::Vec3,
};
use std::collections::{HashMap, HashSet};

/// The density at which the surface lies.
pub const ISOLEVEL: f32 = 0.5;

/// Tolerance for snapping crossings onto lattice points.
pub const EPSILON: f32 = 0.00001;

/// Gradients shorter than this produce a zero normal.
const NORMAL_EPSILON: f32 = 0.000001;

/// Where the surface crosses a lattice edge.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeRecord {
    /// Interpolated crossing point, in the field's local space.
    pub position: Vec3,
    /// Estimated surface normal, pointing away from the dense side. Zero if
    /// the density gradient vanishes.
    pub normal: Vec3,
    /// True if the edge's first endpoint is inside the surface.
    pub winding: bool,
}

/// The crossing edges of a field, and every cell touching at least one of them.
#[derive(Debug, Clone, Default)]
pub struct ActiveScan {
    pub edges: HashMap<EdgeId, EdgeRecord>,
    pub voxels: HashSet<VoxelId>,
}

impl ActiveScan {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn is_inside(density: f32) -> bool {
    density >= ISOLEVEL
}

/// Find the point between `p1` and `p2` where the density, linearly
/// interpolated between `v1` and `v2`, reaches the isolevel.
///
/// Snaps to an endpoint whose density is within [EPSILON] of the isolevel, and
/// to `p1` when the two densities are within [EPSILON] of each other.
pub fn interpolate_crossing(p1: Vec3, p2: Vec3, v1: f32, v2: f32) -> Vec3 {
    if (ISOLEVEL - v1).abs() < EPSILON {
        return p1;
    }
    if (ISOLEVEL - v2).abs() < EPSILON {
        return p2;
    }
    if (v1 - v2).abs() < EPSILON {
        return p1;
    }

    let mu = (ISOLEVEL - v1) / (v2 - v1);
    p1.lerp(p2, mu)
}

/// Surface normal at a lattice point, from the negated central difference of
/// the density.
pub fn estimate_normal(field: &VoxelField, x: i32, y: i32, z: i32) -> Vec3 {
    let gradient = Vec3::new(
        field.density(x + 1, y, z) - field.density(x - 1, y, z),
        field.density(x, y + 1, z) - field.density(x, y - 1, z),
        field.density(x, y, z + 1) - field.density(x, y, z - 1),
    );

    -gradient.safe_normal(NORMAL_EPSILON)
}

/// Scan every lattice edge for isolevel crossings.
///
/// Only edges with both endpoints inside the lattice are considered, and only
/// cells with non-negative coordinates are marked active. The result does not
/// depend on traversal order.
pub fn find_active_voxels(field: &VoxelField) -> ActiveScan {
    let mut scan = ActiveScan::default();

    // A uniform field has no crossings anywhere
    if !field.is_density_allocated() {
        return scan;
    }

    let n = field.resolution() as i32;

    for (x, y, z) in field.lattice() {
        let p_density = field.density(x, y, z);

        for &axis in &Axis::ALL {
            let (dx, dy, dz) = axis.unit();
            let (qx, qy, qz) = (x + dx, y + dy, z + dz);
            if qx >= n || qy >= n || qz >= n {
                continue;
            }

            let q_density = field.density(qx, qy, qz);
            if is_inside(p_density) == is_inside(q_density) {
                continue;
            }

            let position = interpolate_crossing(
                field.voxel_index_to_vector(x, y, z),
                field.voxel_index_to_vector(qx, qy, qz),
                p_density,
                q_density,
            );

            let edge = EdgeId::new(axis, x as u32, y as u32, z as u32);
            scan.edges.insert(
                edge,
                EdgeRecord {
                    position,
                    normal: estimate_normal(field, x, y, z),
                    winding: is_inside(p_density),
                },
            );

            scan.voxels
                .extend(edge.adjacent_voxels().iter().filter_map(|&v| v));
        }
    }

    log::debug!(
        "found {} active edges touching {} active voxels",
        scan.edges.len(),
        scan.voxels.len()
    );

    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Fill;
    use crate::math::vec3;

    #[test]
    fn test_uniform_fields_have_no_crossings() {
        let mut field = VoxelField::new(6, 10.0).unwrap();
        assert!(find_active_voxels(&field).is_empty());

        field.deinitialize_density(Fill::Full);
        assert!(find_active_voxels(&field).is_empty());
    }

    #[test]
    fn test_homogeneous_dense_fields_have_no_crossings() {
        let mut field = VoxelField::new(6, 10.0).unwrap();
        field.for_each(|field, (x, y, z)| field.set_density(x, y, z, 0.75));
        assert!(field.is_density_allocated());

        let scan = find_active_voxels(&field);
        assert!(scan.edges.is_empty());
        assert!(scan.voxels.is_empty());
    }

    #[test]
    fn test_single_crossing_at_the_corner() {
        let mut field = VoxelField::new(4, 30.0).unwrap();
        field.set_density(0, 0, 0, 0.0);
        field.set_density(1, 0, 0, 1.0);

        let scan = find_active_voxels(&field);

        let x_edges: Vec<_> = scan
            .edges
            .keys()
            .filter(|e| e.axis() == Axis::X && e.origin() == VoxelId::new(0, 0, 0))
            .collect();
        assert_eq!(x_edges.len(), 1);

        let record = scan.edges[x_edges[0]];
        let p = field.voxel_index_to_vector(0, 0, 0);
        let q = field.voxel_index_to_vector(1, 0, 0);
        assert!((record.position - (p + q) * 0.5).len() < 1e-5);
        assert!(!record.winding);

        // the other crossings surround the solid point at (1, 0, 0)
        assert_eq!(scan.edges.len(), 4);
        assert!(scan.edges.contains_key(&EdgeId::new(Axis::X, 1, 0, 0)));
        assert!(scan.edges.contains_key(&EdgeId::new(Axis::Y, 1, 0, 0)));
        assert!(scan.edges.contains_key(&EdgeId::new(Axis::Z, 1, 0, 0)));
    }

    #[test]
    fn test_winding_and_normals() {
        let mut field = VoxelField::new(4, 3.0).unwrap();
        for (x, y, z) in field.lattice() {
            if x >= 2 {
                field.set_density(x, y, z, 1.0);
            }
        }

        let scan = find_active_voxels(&field);
        assert_eq!(scan.edges.len(), 16);

        for (edge, record) in &scan.edges {
            assert_eq!(edge.axis(), Axis::X);
            assert!(!record.winding);
            // the surface faces away from the solid half
            assert_eq!(record.normal, vec3(-1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_interpolation() {
        let p1 = vec3(0.0, 0.0, 0.0);
        let p2 = vec3(4.0, 0.0, 0.0);

        assert_eq!(interpolate_crossing(p1, p2, 0.0, 1.0), vec3(2.0, 0.0, 0.0));
        assert_eq!(interpolate_crossing(p1, p2, 1.0, 0.0), vec3(2.0, 0.0, 0.0));
        assert_eq!(interpolate_crossing(p1, p2, 0.25, 0.75), vec3(2.0, 0.0, 0.0));
        assert_eq!(interpolate_crossing(p1, p2, 0.0, 0.625), vec3(3.2, 0.0, 0.0));

        let between = interpolate_crossing(p1, p2, 0.1, 0.7);
        assert!(between.x > p1.x && between.x < p2.x);

        // equal densities and isolevel endpoints snap
        assert_eq!(interpolate_crossing(p1, p2, 0.3, 0.3), p1);
        assert_eq!(interpolate_crossing(p1, p2, 0.5, 0.9), p1);
        assert_eq!(interpolate_crossing(p1, p2, 0.1, 0.5), p2);
    }

    #[test]
    fn test_zero_gradient_normal() {
        let mut field = VoxelField::new(4, 3.0).unwrap();
        field.set_density(1, 1, 1, 1.0);
        assert_eq!(estimate_normal(&field, 1, 1, 1), Vec3::zero());
        assert_eq!(estimate_normal(&field, 0, 1, 1), vec3(-1.0, 0.0, 0.0));
    }
}
