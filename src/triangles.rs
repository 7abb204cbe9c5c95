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
    index::EdgeId,
    scan::EdgeRecord,
    vertices::VertexIndices,
};
use std::collections::HashMap;

/// Corner order of the two triangles spanning the quad around an edge whose
/// first endpoint is inside the surface.
const WINDING_INSIDE: [usize; 6] = [0, 1, 3, 0, 3, 2];

/// Corner order when the first endpoint is outside the surface.
const WINDING_OUTSIDE: [usize; 6] = [0, 3, 1, 0, 2, 3];

/// Connect the vertices of the four cells around each crossing edge into a
/// quad, emitted as two triangles. Returns the number of triangles emitted.
///
/// Edges where any of the four cells has no vertex, which happens along the
/// boundary of the field, are skipped entirely, leaving the mesh open there.
///
/// Viewed from the low density side, triangles wind clockwise: in a right
/// handed frame their counter-clockwise normal points into the solid.
pub fn assemble_triangles<E: Extractor>(
    edges: &HashMap<EdgeId, EdgeRecord>,
    vertex_indices: &VertexIndices,
    extractor: &mut E,
) -> usize {
    let mut sorted: Vec<(&EdgeId, &EdgeRecord)> = edges.iter().collect();
    sorted.sort_unstable_by_key(|(edge, _)| **edge);

    let mut triangles = 0;

    'edges: for (edge, record) in sorted {
        let mut quad = [0u32; 4];

        for (corner, voxel) in quad.iter_mut().zip(edge.adjacent_voxels().iter()) {
            match voxel.and_then(|v| vertex_indices.get(&v)) {
                Some(&index) => *corner = index,
                None => {
                    log::trace!("{:?} lacks a full quad, skipping", edge);
                    continue 'edges;
                }
            }
        }

        let order = if record.winding {
            &WINDING_INSIDE
        } else {
            &WINDING_OUTSIDE
        };

        for &corner in order {
            extractor.extract_index(quad[corner]);
        }
        triangles += 2;
    }

    log::debug!("assembled {} triangles", triangles);

    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extractor::Mesh,
        index::{Axis, VoxelId},
        math::Vec3,
    };

    fn single_edge(winding: bool) -> HashMap<EdgeId, EdgeRecord> {
        let mut edges = HashMap::new();
        edges.insert(
            EdgeId::new(Axis::X, 2, 2, 2),
            EdgeRecord {
                position: Vec3::zero(),
                normal: Vec3::zero(),
                winding,
            },
        );
        edges
    }

    fn quad_indices() -> VertexIndices {
        let mut indices = VertexIndices::new();
        indices.insert(VoxelId::new(2, 2, 2), 10);
        indices.insert(VoxelId::new(2, 2, 1), 11);
        indices.insert(VoxelId::new(2, 1, 2), 12);
        indices.insert(VoxelId::new(2, 1, 1), 13);
        indices
    }

    #[test]
    fn test_full_quad_emits_two_triangles() {
        let mut mesh = Mesh::new();
        let count = assemble_triangles(&single_edge(true), &quad_indices(), &mut mesh);

        assert_eq!(count, 2);
        assert_eq!(mesh.indices, vec![10, 11, 13, 10, 13, 12]);

        let mut distinct = mesh.indices.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn test_winding_flips_diagonal_order() {
        let mut mesh = Mesh::new();
        assemble_triangles(&single_edge(false), &quad_indices(), &mut mesh);
        assert_eq!(mesh.indices, vec![10, 13, 11, 10, 12, 13]);
    }

    #[test]
    fn test_missing_neighbour_skips_edge() {
        let mut indices = quad_indices();
        indices.remove(&VoxelId::new(2, 1, 1));

        let mut mesh = Mesh::new();
        let count = assemble_triangles(&single_edge(true), &indices, &mut mesh);

        assert_eq!(count, 0);
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_edge_at_field_boundary_is_skipped() {
        let mut edges = HashMap::new();
        edges.insert(
            EdgeId::new(Axis::Y, 0, 0, 0),
            EdgeRecord {
                position: Vec3::zero(),
                normal: Vec3::zero(),
                winding: true,
            },
        );
        let mut indices = VertexIndices::new();
        indices.insert(VoxelId::new(0, 0, 0), 0);

        let mut mesh = Mesh::new();
        assert_eq!(assemble_triangles(&edges, &indices, &mut mesh), 0);
    }
}
