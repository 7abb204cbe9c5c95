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

//! Dual contouring of sparse voxel density fields.
//!
//! A [VoxelField] stores quantized density and material samples on a cubic
//! lattice. [DualContouring] turns the density isosurface into an indexed
//! triangle mesh, delivered through an [extractor::Extractor].

/// Common math types
pub mod math;

/// Errors raised by voxel fields.
pub mod error;

/// Packed identifiers for lattice cells and edges.
pub mod index;

/// Iteration over the points of a lattice.
pub mod traversal;

/// Utilities for outputting mesh data in specific formats.
pub mod extractor;

/// Algorithms for accurately placing vertices on features (edges or corners) of
/// an implicit surface.
pub mod feature;

/// Locating the lattice edges the surface crosses.
pub mod scan;

/// Per level-of-detail index of coarse cells the surface passes through.
pub mod substance_cache;

mod dual_contouring;
mod field;
mod triangles;
mod vertices;

pub use self::{
    dual_contouring::*,
    error::FieldError,
    field::*,
    scan::{EPSILON, ISOLEVEL},
    substance_cache::{SubstanceCache, LOD_LEVELS, RAW_ISOLEVEL},
    triangles::assemble_triangles,
    vertices::{synthesize_vertices, VertexIndices},
};
