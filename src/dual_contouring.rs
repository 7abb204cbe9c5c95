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
    extractor::Extractor,
    feature::{MinimiseQef, PlaceFeature},
    field::VoxelField,
    scan::find_active_voxels,
    triangles::assemble_triangles,
    vertices::synthesize_vertices,
};

#[cfg(doc)]
use crate::feature::MassPoint;

/// Counts describing a single extraction.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ContourStats {
    pub active_edges: usize,
    pub active_voxels: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Convert voxel density fields to meshes using dual contouring.
///
/// Each cell the surface passes through receives exactly one vertex, and each
/// lattice edge the surface crosses becomes a quad joining the vertices of the
/// four cells around it.
///
/// If you pass [MinimiseQef] to the constructor this implements the classic [Dual Contouring of Hermite Data](https://doi.org/10.1145/566570.566586). With [MassPoint] vertices sit at the centroid of their crossings instead, giving a smoother mesh that loses sharp features.
///
/// Pros:
/// * Decent reproduction of sharp edges even when not grid-aligned.
/// * Every vertex is shared, so the output is an indexed mesh with no duplicates.
///
/// Cons:
/// * Edges along the boundary of the field lack a full quad, so surfaces that
///   reach the boundary are left open there.
pub struct DualContouring<P: PlaceFeature> {
    place_feature: P,
}

impl Default for DualContouring<MinimiseQef> {
    fn default() -> Self {
        Self::new(MinimiseQef::default())
    }
}

impl<P: PlaceFeature> DualContouring<P> {
    /// Create a new DualContouring which places vertices with `place_feature`.
    pub fn new(place_feature: P) -> Self {
        Self { place_feature }
    }

    /// Extracts a mesh from the given [VoxelField].
    ///
    /// Vertices are emitted first, one per active cell, followed by the
    /// triangle indices. Positions are in the field's local space, centered on
    /// the middle of the field. The same field always produces the same mesh.
    pub fn extract<E: Extractor>(&mut self, field: &VoxelField, extractor: &mut E) -> ContourStats {
        let scan = find_active_voxels(field);
        if scan.is_empty() {
            log::debug!("field has no surface crossings");
            return ContourStats::default();
        }

        let vertex_indices =
            synthesize_vertices(&scan.voxels, &scan.edges, &self.place_feature, extractor);
        let triangles = assemble_triangles(&scan.edges, &vertex_indices, extractor);

        let stats = ContourStats {
            active_edges: scan.edges.len(),
            active_voxels: scan.voxels.len(),
            vertices: vertex_indices.len(),
            triangles,
        };
        log::debug!("extracted {:?}", stats);

        stats
    }

    /// Extract a mesh only if the field changed since it was last meshed,
    /// marking it meshed afterwards.
    ///
    /// Returns None, leaving the extractor untouched, if the existing mesh is
    /// still current.
    pub fn remesh<E: Extractor>(
        &mut self,
        field: &mut VoxelField,
        extractor: &mut E,
    ) -> Option<ContourStats> {
        if !field.needs_remesh() {
            return None;
        }

        let stats = self.extract(field, extractor);
        field.mark_meshed();

        Some(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{extractor::Mesh, feature::MassPoint, field::Fill, math::Vec3};
    use cgmath::{InnerSpace, Vector3};
    use std::collections::HashMap;

    fn to_cgmath(v: Vec3) -> Vector3<f32> {
        Vector3::new(v.x, v.y, v.z)
    }

    fn single_voxel() -> VoxelField {
        let mut field = VoxelField::new(4, 3.0).unwrap();
        field.set_density(1, 1, 1, 1.0);
        field
    }

    fn ball(resolution: usize, radius: f32) -> VoxelField {
        let mut field = VoxelField::new(resolution, (resolution - 1) as f32).unwrap();
        field.for_each(|field, (x, y, z)| {
            let distance = field.voxel_index_to_vector(x, y, z).len();
            field.set_density(x, y, z, 0.5 + (radius - distance) * 0.5);
        });
        field
    }

    #[test]
    fn test_empty_fields_produce_nothing() {
        let mut contouring = DualContouring::default();

        let mut field = VoxelField::new(8, 1.0).unwrap();
        let mut mesh = Mesh::new();
        assert_eq!(contouring.extract(&field, &mut mesh), ContourStats::default());

        field.deinitialize_density(Fill::Full);
        assert_eq!(contouring.extract(&field, &mut mesh), ContourStats::default());

        assert!(mesh.positions.is_empty());
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_single_voxel() {
        let field = single_voxel();
        let mut mesh = Mesh::new();
        let stats = DualContouring::new(MassPoint).extract(&field, &mut mesh);

        assert_eq!(
            stats,
            ContourStats {
                active_edges: 6,
                active_voxels: 8,
                vertices: 8,
                triangles: 12,
            }
        );
        assert_eq!(mesh.positions.len(), 8);
        assert_eq!(mesh.normals.len(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.positions.len()));

        // counter-clockwise normals face the solid point
        let solid = to_cgmath(field.voxel_index_to_vector(1, 1, 1));
        for [a, b, c] in mesh.triangles() {
            let (a, b, c) = (
                to_cgmath(mesh.positions[a as usize]),
                to_cgmath(mesh.positions[b as usize]),
                to_cgmath(mesh.positions[c as usize]),
            );
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;

            assert!(normal.magnitude() > 0.0);
            assert!(normal.dot(solid - centroid) > 0.0);
        }
    }

    #[test]
    fn test_ball_is_closed_and_consistently_wound() {
        let field = ball(12, 3.5);
        let mut mesh = Mesh::new();
        let stats = DualContouring::default().extract(&field, &mut mesh);

        assert!(stats.triangles > 0);
        assert_eq!(stats.vertices, mesh.positions.len());
        assert!(mesh.positions.iter().all(|p| p.is_finite()));

        let mut directed = HashMap::new();
        for [a, b, c] in mesh.triangles() {
            for &(from, to) in &[(a, b), (b, c), (c, a)] {
                *directed.entry((from, to)).or_insert(0) += 1;
            }
        }

        for (&(from, to), &count) in &directed {
            assert_eq!(count, 1, "edge {} -> {} repeated", from, to);
            assert_eq!(directed.get(&(to, from)), Some(&1), "edge {} -> {} is open", from, to);
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let field = ball(10, 3.0);

        let mut first = Mesh::new();
        let mut second = Mesh::new();
        DualContouring::default().extract(&field, &mut first);
        DualContouring::default().extract(&field, &mut second);

        assert_eq!(first.positions, second.positions);
        assert_eq!(first.normals, second.normals);
        assert_eq!(first.indices, second.indices);
    }

    #[test]
    fn test_remesh_only_after_changes() {
        let mut field = VoxelField::new(4, 3.0).unwrap();
        let mut contouring = DualContouring::new(MassPoint);
        let mut mesh = Mesh::new();

        assert_eq!(contouring.remesh(&mut field, &mut mesh), None);

        field.set_density(1, 1, 1, 1.0);
        let stats = contouring.remesh(&mut field, &mut mesh);
        assert_eq!(stats.map(|s| s.triangles), Some(12));
        assert!(!field.needs_remesh());

        let mut unchanged = Mesh::new();
        assert_eq!(contouring.remesh(&mut field, &mut unchanged), None);
        assert!(unchanged.indices.is_empty());

        field.set_density(1, 1, 1, 0.0);
        assert_eq!(
            contouring.remesh(&mut field, &mut unchanged),
            Some(ContourStats::default())
        );
    }
}
