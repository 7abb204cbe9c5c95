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
    error::FieldError,
    index::MAX_COORD,
    math::Vec3,
    substance_cache::SubstanceCache,
    traversal::Lattice,
};

/// Largest supported lattice resolution along each axis.
pub const MAX_RESOLUTION: usize = MAX_COORD as usize;

/// The two bulk values a density field can hold without allocating storage.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Fill {
    /// Every cell has density 0.
    Empty,
    /// Every cell has density 1.
    Full,
}

impl Fill {
    fn raw(self) -> u8 {
        match self {
            Fill::Empty => 0,
            Fill::Full => 255,
        }
    }
}

/// How the density of a field is currently stored.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FillState {
    /// No storage is allocated and every read returns the bulk value.
    Uniform(Fill),
    /// A dense buffer holds one byte per cell.
    Mixed,
}

/// The raw contents of a single lattice point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct VoxelPoint {
    pub density: u8,
    pub material: u16,
}

/// Either a single bulk value, or one value per cell.
///
/// Storage is promoted to dense the first time a write diverges from the bulk
/// value, and is only ever demoted by an explicit reclaim.
#[derive(Debug, Clone)]
enum Storage<T> {
    Uniform(T),
    Dense { values: Box<[T]>, background: T },
}

impl<T: Copy + PartialEq> Storage<T> {
    fn get(&self, index: Option<usize>) -> T {
        match (self, index) {
            (Storage::Uniform(value), _) => *value,
            (Storage::Dense { values, .. }, Some(i)) => values[i],
            (Storage::Dense { background, .. }, None) => *background,
        }
    }

    /// Returns false if the write left the storage untouched.
    fn set(&mut self, index: usize, value: T, len: usize) -> bool {
        match self {
            Storage::Uniform(bulk) if *bulk == value => false,
            Storage::Uniform(bulk) => {
                let background = *bulk;
                let mut values = vec![background; len].into_boxed_slice();
                values[index] = value;
                *self = Storage::Dense { values, background };
                true
            }
            Storage::Dense { values, .. } => {
                values[index] = value;
                true
            }
        }
    }

    fn is_dense(&self) -> bool {
        matches!(self, Storage::Dense { .. })
    }
}

fn quantize(density: f32) -> u8 {
    (density.max(0.0).min(1.0) * 255.0) as u8
}

/// A cubic lattice of `resolution^3` density and material samples, spanning a
/// cube of the given physical size centered on the origin.
///
/// Density and material are stored independently. Each stays unallocated for
/// as long as every cell shares one bulk value.
#[derive(Debug, Clone)]
pub struct VoxelField {
    resolution: usize,
    size: f32,
    density: Storage<u8>,
    material: Storage<u16>,

    origin: Vec3,
    lower: Vec3,
    upper: Vec3,

    clock: u64,
    last_change: u64,
    last_save: u64,
    last_mesh: u64,
    last_cache_check: Option<u64>,

    substance_cache: SubstanceCache,
}

impl VoxelField {
    /// Create an empty field with `resolution` samples along each axis,
    /// spanning a cube of side `size`.
    pub fn new(resolution: usize, size: f32) -> Result<Self, FieldError> {
        if resolution < 2 || resolution > MAX_RESOLUTION {
            return Err(FieldError::InvalidResolution(resolution));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(FieldError::InvalidSize(size));
        }

        let half = Vec3::from_scalar(size * 0.5);

        Ok(Self {
            resolution,
            size,
            density: Storage::Uniform(Fill::Empty.raw()),
            material: Storage::Uniform(0),
            origin: Vec3::zero(),
            lower: -half,
            upper: half,
            clock: 0,
            last_change: 0,
            last_save: 0,
            last_mesh: 0,
            last_cache_check: None,
            substance_cache: SubstanceCache::new(),
        })
    }

    /// Number of samples along each axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Physical side length of the cube the lattice spans.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Total number of lattice points.
    pub fn len(&self) -> usize {
        self.resolution * self.resolution * self.resolution
    }

    /// Position of a point within the linear storage, or `None` if the point
    /// lies outside the lattice.
    pub fn linear_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let n = self.resolution as i32;
        if x < 0 || y < 0 || z < 0 || x >= n || y >= n || z >= n {
            return None;
        }

        let n = self.resolution;
        Some((x as usize * n + y as usize) * n + z as usize)
    }

    fn checked_index(&self, x: i32, y: i32, z: i32) -> Result<usize, FieldError> {
        self.linear_index(x, y, z).ok_or(FieldError::OutOfBounds {
            x,
            y,
            z,
            resolution: self.resolution,
        })
    }

    /// Density at a lattice point, in the range [0, 1].
    ///
    /// Points outside the lattice read as the field's bulk value.
    pub fn density(&self, x: i32, y: i32, z: i32) -> f32 {
        f32::from(self.raw_density(x, y, z)) / 255.0
    }

    /// Density at a lattice point in raw 8 bit units.
    pub fn raw_density(&self, x: i32, y: i32, z: i32) -> u8 {
        self.density.get(self.linear_index(x, y, z))
    }

    /// Set the density at a lattice point, clamped to [0, 1] and quantized to
    /// 8 bits.
    ///
    /// Writes outside the lattice are dropped. Use [VoxelField::try_set_density]
    /// to detect them.
    pub fn set_density(&mut self, x: i32, y: i32, z: i32, density: f32) {
        if let Err(err) = self.try_set_density(x, y, z, density) {
            log::warn!("dropped density write: {}", err);
        }
    }

    /// Set the density at a lattice point, failing if the point lies outside
    /// the lattice.
    pub fn try_set_density(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        density: f32,
    ) -> Result<(), FieldError> {
        self.set_voxel_point_density(x, y, z, quantize(density))
    }

    /// Material id at a lattice point. Points outside the lattice read as the
    /// field's base material.
    pub fn material(&self, x: i32, y: i32, z: i32) -> u16 {
        self.material.get(self.linear_index(x, y, z))
    }

    /// Set the material id at a lattice point. Writes outside the lattice are
    /// dropped.
    pub fn set_material(&mut self, x: i32, y: i32, z: i32, material: u16) {
        if let Err(err) = self.try_set_material(x, y, z, material) {
            log::warn!("dropped material write: {}", err);
        }
    }

    pub fn try_set_material(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        material: u16,
    ) -> Result<(), FieldError> {
        self.set_voxel_point_material(x, y, z, material)
    }

    /// Raw density and material at a lattice point.
    pub fn voxel_point(&self, x: i32, y: i32, z: i32) -> VoxelPoint {
        let index = self.linear_index(x, y, z);
        VoxelPoint {
            density: self.density.get(index),
            material: self.material.get(index),
        }
    }

    pub fn set_voxel_point(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        point: VoxelPoint,
    ) -> Result<(), FieldError> {
        self.set_voxel_point_density(x, y, z, point.density)?;
        self.set_voxel_point_material(x, y, z, point.material)
    }

    pub fn set_voxel_point_density(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        density: u8,
    ) -> Result<(), FieldError> {
        let index = self.checked_index(x, y, z)?;
        let len = self.len();
        let was_dense = self.density.is_dense();

        if self.density.set(index, density, len) {
            if !was_dense {
                log::debug!("allocated dense density storage for {} points", len);
            }
            self.set_changed();
        }

        Ok(())
    }

    pub fn set_voxel_point_material(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        material: u16,
    ) -> Result<(), FieldError> {
        let index = self.checked_index(x, y, z)?;
        let len = self.len();
        let was_dense = self.material.is_dense();

        if self.material.set(index, material, len) {
            if !was_dense {
                log::debug!("allocated dense material storage for {} points", len);
            }
            self.set_changed();
        }

        Ok(())
    }

    pub fn density_fill_state(&self) -> FillState {
        match self.density {
            Storage::Uniform(0) => FillState::Uniform(Fill::Empty),
            Storage::Uniform(_) => FillState::Uniform(Fill::Full),
            Storage::Dense { .. } => FillState::Mixed,
        }
    }

    pub fn is_density_allocated(&self) -> bool {
        self.density.is_dense()
    }

    pub fn is_material_allocated(&self) -> bool {
        self.material.is_dense()
    }

    /// Release the density buffer and declare every cell to hold `fill`.
    ///
    /// This is not validated: the caller must already know the field is
    /// homogeneous, or the previous contents are lost.
    pub fn deinitialize_density(&mut self, fill: Fill) {
        if self.density.is_dense() {
            log::debug!("released dense density storage as {:?}", fill);
        }
        self.density = Storage::Uniform(fill.raw());
        self.set_changed();
    }

    /// Release the material buffer and declare every cell to hold `material`.
    pub fn deinitialize_material(&mut self, material: u16) {
        if self.material.is_dense() {
            log::debug!("released dense material storage as {}", material);
        }
        self.material = Storage::Uniform(material);
        self.set_changed();
    }

    fn step(&self) -> f32 {
        self.size / (self.resolution - 1) as f32
    }

    /// Local-space sample position of a lattice point. The lattice spans
    /// `[-size/2, size/2]` along each axis.
    pub fn voxel_index_to_vector(&self, x: i32, y: i32, z: i32) -> Vec3 {
        let step = self.step();
        let start = -self.size * 0.5;
        Vec3::new(
            start + x as f32 * step,
            start + y as f32 * step,
            start + z as f32 * step,
        )
    }

    /// Lattice point at or below a local-space position.
    ///
    /// Positions exactly on a sample may land on the neighbouring index due to
    /// rounding, so this is not an exact inverse of
    /// [VoxelField::voxel_index_to_vector].
    pub fn vector_to_voxel_index(&self, v: Vec3) -> (i32, i32, i32) {
        let step = self.step();
        let start = -self.size * 0.5;
        let f = |c: f32| ((c - start) / step).floor() as i32;
        (f(v.x), f(v.y), f(v.z))
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        let half = Vec3::from_scalar(self.size * 0.5);
        self.origin = origin;
        self.lower = origin - half;
        self.upper = origin + half;
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn lower(&self) -> Vec3 {
        self.lower
    }

    pub fn upper(&self) -> Vec3 {
        self.upper
    }

    /// Every lattice coordinate, in storage order.
    pub fn lattice(&self) -> Lattice {
        Lattice::new(self.resolution)
    }

    /// Invoke `f` on every lattice point, in storage order.
    pub fn for_each<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut VoxelField, (i32, i32, i32)),
    {
        for point in self.lattice() {
            f(self, point);
        }
    }

    /// Invoke `f` on every lattice point, rebuilding the substance cache as
    /// the traversal proceeds.
    ///
    /// The cache is cleared up front. After `f` runs on a point, every coarse
    /// cell whose maximum corner is that point is classified, so `f` may edit
    /// the field and the cache still reflects the edited values. With `lod`
    /// unset only the finest level is populated.
    pub fn for_each_with_cache<F>(&mut self, mut f: F, lod: bool)
    where
        F: FnMut(&mut VoxelField, (i32, i32, i32)),
    {
        self.clear_substance_cache();

        for (x, y, z) in self.lattice() {
            f(self, (x, y, z));

            if lod {
                self.perform_substance_cache_lod(x, y, z);
            } else {
                self.perform_substance_cache(x, y, z);
            }
        }

        log::debug!(
            "substance cache rebuilt with {} cells",
            self.substance_cache.len()
        );
    }

    pub fn substance_cache(&self) -> &SubstanceCache {
        &self.substance_cache
    }

    pub(crate) fn substance_cache_mut(&mut self) -> &mut SubstanceCache {
        &mut self.substance_cache
    }

    /// Drop every cached cell and mark the cache as stale.
    pub fn clear_substance_cache(&mut self) {
        self.substance_cache.clear();
        self.last_cache_check = None;
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Record that the field contents changed.
    pub fn set_changed(&mut self) {
        self.last_change = self.tick();
    }

    /// True if the field changed since it was last saved.
    pub fn is_changed(&self) -> bool {
        self.last_change > self.last_save
    }

    pub fn mark_saved(&mut self) {
        self.last_save = self.tick();
    }

    /// True if the field changed since its mesh was last generated.
    pub fn needs_remesh(&self) -> bool {
        self.last_change > self.last_mesh
    }

    pub fn mark_meshed(&mut self) {
        self.last_mesh = self.tick();
    }

    /// True if the substance cache was marked valid and the field has not
    /// changed since.
    pub fn is_substance_cache_valid(&self) -> bool {
        match self.last_cache_check {
            Some(check) => self.last_change <= check,
            None => false,
        }
    }

    pub fn mark_cache_valid(&mut self) {
        self.last_cache_check = Some(self.tick());
    }
}
