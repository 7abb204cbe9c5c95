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
    feature::PlaceFeature,
    index::{EdgeId, VoxelId},
    math::Vec3,
    scan::EdgeRecord,
};
use std::collections::{HashMap, HashSet};

/// Maps each active cell to the index of its vertex in the output arrays.
pub type VertexIndices = HashMap<VoxelId, u32>;

/// Emit one vertex and normal per active cell.
///
/// The vertex is placed by `place_feature` from the crossings on the cell's
/// candidate edges, gathered in table order. The normal is the mean of the
/// crossing normals, normalised, or zero if they cancel out. Cells are visited
/// in ascending key order so output is stable between runs.
pub fn synthesize_vertices<P, E>(
    voxels: &HashSet<VoxelId>,
    edges: &HashMap<EdgeId, EdgeRecord>,
    place_feature: &P,
    extractor: &mut E,
) -> VertexIndices
where
    P: PlaceFeature,
    E: Extractor,
{
    let mut sorted: Vec<VoxelId> = voxels.iter().copied().collect();
    sorted.sort_unstable();

    let mut indices = VertexIndices::with_capacity(sorted.len());
    let mut points = Vec::with_capacity(12);
    let mut normals = Vec::with_capacity(12);

    for voxel in sorted {
        points.clear();
        normals.clear();

        for edge in voxel.candidate_edges() {
            if let Some(record) = edges.get(&edge) {
                points.push(record.position);
                normals.push(record.normal);
            }
        }

        // A cell is only active because one of its edges crosses
        debug_assert!(!points.is_empty(), "{:?} has no crossings", voxel);
        if points.is_empty() {
            continue;
        }

        let position = place_feature.place_feature(&points, &normals);
        let mean = normals.iter().sum::<Vec3>() / normals.len() as f32;
        let normal = mean.normalised().unwrap_or_default();

        indices.insert(voxel, indices.len() as u32);
        extractor.extract_vertex(position, normal);
    }

    log::debug!("placed {} vertices", indices.len());

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extractor::Mesh,
        feature::MassPoint,
        index::Axis,
        math::vec3,
    };

    fn record(position: Vec3, normal: Vec3) -> EdgeRecord {
        EdgeRecord {
            position,
            normal,
            winding: true,
        }
    }

    #[test]
    fn test_one_vertex_per_voxel() {
        let mut edges = HashMap::new();
        edges.insert(
            EdgeId::new(Axis::X, 1, 1, 1),
            record(vec3(1.5, 1.0, 1.0), vec3(1.0, 0.0, 0.0)),
        );
        edges.insert(
            EdgeId::new(Axis::Y, 1, 1, 1),
            record(vec3(1.0, 1.5, 1.0), vec3(0.0, 1.0, 0.0)),
        );

        let voxels: HashSet<_> = edges
            .keys()
            .flat_map(|e| e.adjacent_voxels().to_vec())
            .flatten()
            .collect();
        assert_eq!(voxels.len(), 6);

        let mut mesh = Mesh::new();
        let indices = synthesize_vertices(&voxels, &edges, &MassPoint, &mut mesh);

        assert_eq!(indices.len(), voxels.len());
        assert_eq!(mesh.positions.len(), voxels.len());
        assert_eq!(mesh.normals.len(), voxels.len());

        let mut seen: Vec<u32> = indices.values().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..6).collect::<Vec<u32>>());

        // (1, 1, 1) touches both crossings
        let shared = indices[&VoxelId::new(1, 1, 1)] as usize;
        assert_eq!(mesh.positions[shared], vec3(1.25, 1.25, 1.0));
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert!((mesh.normals[shared] - vec3(s, s, 0.0)).len() < 1e-6);

        // (1, 0, 1) only touches the x crossing
        let single = indices[&VoxelId::new(1, 0, 1)] as usize;
        assert_eq!(mesh.positions[single], vec3(1.5, 1.0, 1.0));
        assert_eq!(mesh.normals[single], vec3(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_opposing_normals_cancel_to_zero() {
        let mut edges = HashMap::new();
        edges.insert(
            EdgeId::new(Axis::Z, 0, 0, 0),
            record(vec3(0.0, 0.0, 0.5), vec3(0.0, 0.0, 1.0)),
        );
        edges.insert(
            EdgeId::new(Axis::Z, 1, 0, 0),
            record(vec3(1.0, 0.0, 0.5), vec3(0.0, 0.0, -1.0)),
        );
        let mut voxels = HashSet::new();
        voxels.insert(VoxelId::new(0, 0, 0));

        let mut mesh = Mesh::new();
        synthesize_vertices(&voxels, &edges, &MassPoint, &mut mesh);

        assert_eq!(mesh.positions, vec![vec3(0.5, 0.0, 0.5)]);
        assert_eq!(mesh.normals, vec![Vec3::zero()]);
    }

    #[test]
    fn test_cells_on_the_last_plane_ignore_wrapped_edges() {
        let mut edges = HashMap::new();
        edges.insert(
            EdgeId::new(Axis::Y, 1023, 0, 1),
            record(vec3(10.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0)),
        );
        // the key one x step past the cell's y edge would wrap onto
        edges.insert(
            EdgeId::new(Axis::Y, 0, 1, 0),
            record(vec3(-10.0, 0.0, 0.0), vec3(-1.0, 0.0, 0.0)),
        );
        let mut voxels = HashSet::new();
        voxels.insert(VoxelId::new(1023, 0, 0));

        let mut mesh = Mesh::new();
        synthesize_vertices(&voxels, &edges, &MassPoint, &mut mesh);

        assert_eq!(mesh.positions, vec![vec3(10.0, 0.0, 0.0)]);
        assert_eq!(mesh.normals, vec![vec3(1.0, 0.0, 0.0)]);
    }
}
