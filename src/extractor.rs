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
use crate::math::Vec3;

/// Trait for outputting mesh vertices and indices.
///
/// Vertices are numbered in the order they are extracted, starting from zero.
/// Every index refers to a vertex extracted earlier.
pub trait Extractor {
    fn extract_vertex(&mut self, position: Vec3, normal: Vec3);
    fn extract_index(&mut self, index: u32);
}

/// Output as three parallel arrays: positions, normals, and triangle indices
/// grouped in threes.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate the triangles as triples of vertex indices.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

impl Extractor for Mesh {
    fn extract_vertex(&mut self, position: Vec3, normal: Vec3) {
        self.positions.push(position);
        self.normals.push(normal);
    }

    fn extract_index(&mut self, index: u32) {
        self.indices.push(index);
    }
}

/// Output vertices as a tightly packed array of floats, discarding normals.
pub struct IndexedVertices<'a> {
    vertices: &'a mut Vec<f32>,
    indices: &'a mut Vec<u32>,
}

impl<'a> IndexedVertices<'a> {
    pub fn new(vertices: &'a mut Vec<f32>, indices: &'a mut Vec<u32>) -> Self {
        Self { vertices, indices }
    }
}

impl<'a> Extractor for IndexedVertices<'a> {
    fn extract_vertex(&mut self, v: Vec3, _normal: Vec3) {
        self.vertices.extend_from_slice(&[v.x, v.y, v.z]);
    }

    fn extract_index(&mut self, index: u32) {
        self.indices.push(index);
    }
}

/// Output vertices interleaved with their normals, as a tightly packed array
/// of floats.
pub struct IndexedInterleavedNormals<'a> {
    vertices: &'a mut Vec<f32>,
    indices: &'a mut Vec<u32>,
}

impl<'a> IndexedInterleavedNormals<'a> {
    pub fn new(vertices: &'a mut Vec<f32>, indices: &'a mut Vec<u32>) -> Self {
        Self { vertices, indices }
    }
}

impl<'a> Extractor for IndexedInterleavedNormals<'a> {
    fn extract_vertex(&mut self, v: Vec3, n: Vec3) {
        self.vertices
            .extend_from_slice(&[v.x, v.y, v.z, n.x, n.y, n.z]);
    }

    fn extract_index(&mut self, index: u32) {
        self.indices.push(index);
    }
}
