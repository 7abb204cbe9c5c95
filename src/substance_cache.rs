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
use crate::field::VoxelField;

/// Number of resolutions tracked by the cache. Level `l` samples every
/// `2^l` lattice points.
pub const LOD_LEVELS: usize = 7;

/// The isolevel in raw 8 bit density units. A raw density above this value is
/// inside the surface.
pub const RAW_ISOLEVEL: u8 = 127;

/// Lists of coarse cells that straddle the isolevel, one list per level of
/// detail.
///
/// Each entry is the linear storage index of the coarse cell's minimum corner.
/// Cells whose 8 corners all agree are omitted, so consumers can skip clearly
/// homogeneous regions when remeshing at a given level of detail.
#[derive(Debug, Clone, Default)]
pub struct SubstanceCache {
    levels: [Vec<usize>; LOD_LEVELS],
}

impl SubstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The non-uniform cells found at the given level of detail, or `None` if
    /// `lod` is not below [LOD_LEVELS].
    pub fn level(&self, lod: usize) -> Option<&[usize]> {
        self.levels.get(lod).map(Vec::as_slice)
    }

    /// Total number of cells recorded across all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }

    pub(crate) fn clear(&mut self) {
        for level in &mut self.levels {
            level.clear();
        }
    }

    pub(crate) fn push(&mut self, lod: usize, index: usize) {
        self.levels[lod].push(index);
    }
}

/// Inspect the coarse cell of width `step` whose maximum corner is `(x, y, z)`.
///
/// Returns the linear index of the cell's minimum corner if its 8 corners
/// straddle [RAW_ISOLEVEL], and `None` if they all agree or the cell would
/// extend below the lattice.
pub(crate) fn classify_coarse_cell(
    field: &VoxelField,
    x: i32,
    y: i32,
    z: i32,
    step: i32,
) -> Option<usize> {
    if x < step || y < step || z < step {
        return None;
    }

    let (rx, ry, rz) = (x - step, y - step, z - step);

    let corners = [
        field.raw_density(x, ry, z),
        field.raw_density(x, y, z),
        field.raw_density(rx, ry, z),
        field.raw_density(rx, y, z),
        field.raw_density(x, ry, rz),
        field.raw_density(x, y, rz),
        field.raw_density(rx, ry, rz),
        field.raw_density(rx, y, rz),
    ];

    let inside = corners.iter().filter(|&&d| d > RAW_ISOLEVEL).count();
    if inside == 0 || inside == corners.len() {
        return None;
    }

    field.linear_index(rx, ry, rz)
}

impl VoxelField {
    /// Record the finest-level cell ending at `(x, y, z)` if it straddles the
    /// isolevel. Uniform fields have nothing to record.
    pub fn perform_substance_cache(&mut self, x: i32, y: i32, z: i32) {
        if !self.is_density_allocated() {
            return;
        }

        if let Some(index) = classify_coarse_cell(self, x, y, z, 1) {
            self.substance_cache_mut().push(0, index);
        }
    }

    /// Record every coarse cell ending at `(x, y, z)` that straddles the
    /// isolevel, at each level of detail whose grid contains that point.
    pub fn perform_substance_cache_lod(&mut self, x: i32, y: i32, z: i32) {
        if !self.is_density_allocated() {
            return;
        }

        for lod in 0..LOD_LEVELS {
            let step = 1 << lod;
            if x % step != 0 || y % step != 0 || z % step != 0 {
                continue;
            }

            if let Some(index) = classify_coarse_cell(self, x, y, z, step) {
                self.substance_cache_mut().push(lod, index);
            }
        }
    }
}
