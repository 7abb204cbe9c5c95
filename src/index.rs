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

//! Bit-packed keys for lattice cells and the edges between them.
//!
//! Both key types pack `x` into bits 0-9, `y` into bits 10-19 and `z` into bits
//! 20-29. Edge keys additionally store the axis of the edge in bits 30-31.

/// Number of bits used for each packed coordinate.
pub const COORD_BITS: u32 = 10;

/// Exclusive upper bound on any packed coordinate.
pub const MAX_COORD: u32 = 1 << COORD_BITS;

const COORD_MASK: u32 = MAX_COORD - 1;
const AXIS_SHIFT: u32 = 30;
const VOXEL_MASK: u32 = !(0b11 << AXIS_SHIFT);

/// One of the three positive lattice directions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Offset from a lattice point to its positive neighbour along this axis.
    pub fn unit(self) -> (i32, i32, i32) {
        match self {
            Axis::X => (1, 0, 0),
            Axis::Y => (0, 1, 0),
            Axis::Z => (0, 0, 1),
        }
    }

    fn from_bits(bits: u32) -> Axis {
        match bits & 0b11 {
            0 => Axis::X,
            1 => Axis::Y,
            // 3 is never produced by `EdgeId::new`
            _ => Axis::Z,
        }
    }
}

/// A small non-negative lattice offset.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LatticeOffset {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl LatticeOffset {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// The offset in packed key form.
    pub const fn encode(&self) -> u32 {
        self.x | (self.y << COORD_BITS) | (self.z << (2 * COORD_BITS))
    }
}

const fn offset(x: u32, y: u32, z: u32) -> LatticeOffset {
    LatticeOffset::new(x, y, z)
}

/// For an edge along each axis, the offsets that, subtracted from the edge's
/// origin, give the four cells sharing that edge. The order of the four cells
/// decides the quad's diagonal and winding.
pub const EDGE_NODE_OFFSETS: [[LatticeOffset; 4]; 3] = [
    [offset(0, 0, 0), offset(0, 0, 1), offset(0, 1, 0), offset(0, 1, 1)],
    [offset(0, 0, 0), offset(1, 0, 0), offset(0, 0, 1), offset(1, 0, 1)],
    [offset(0, 0, 0), offset(0, 1, 0), offset(1, 0, 0), offset(1, 1, 0)],
];

/// Packed form of [EDGE_NODE_OFFSETS], flattened as `axis * 4 + corner`.
pub const ENCODED_EDGE_NODE_OFFSETS: [u32; 12] = [
    0x0000_0000,
    0x0010_0000,
    0x0000_0400,
    0x0010_0400,
    0x0000_0000,
    0x0000_0001,
    0x0010_0000,
    0x0010_0001,
    0x0000_0000,
    0x0000_0400,
    0x0000_0001,
    0x0000_0401,
];

/// Offsets from a cell's minimum corner to the origins of its 12 candidate
/// edges, flattened as `axis * 4 + n`. Within each axis these are the same
/// four offsets as [EDGE_NODE_OFFSETS], but the y axis lists them in a
/// different order.
pub const CANDIDATE_EDGE_OFFSETS: [LatticeOffset; 12] = [
    offset(0, 0, 0),
    offset(0, 0, 1),
    offset(0, 1, 0),
    offset(0, 1, 1),
    offset(0, 0, 0),
    offset(0, 0, 1),
    offset(1, 0, 0),
    offset(1, 0, 1),
    offset(0, 0, 0),
    offset(0, 1, 0),
    offset(1, 0, 0),
    offset(1, 1, 0),
];

/// Packed form of [CANDIDATE_EDGE_OFFSETS] with the axis bits included.
/// Added to a cell key, these give the keys of the 12 edges that may
/// contribute to that cell.
pub const ENCODED_EDGE_OFFSETS: [u32; 12] = [
    0x0000_0000,
    0x0010_0000,
    0x0000_0400,
    0x0010_0400,
    0x4000_0000,
    0x4010_0000,
    0x4000_0001,
    0x4010_0001,
    0x8000_0000,
    0x8000_0400,
    0x8000_0001,
    0x8000_0401,
];

/// Key of a lattice cell, identified by its minimum corner.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VoxelId(u32);

impl VoxelId {
    /// Pack a cell coordinate. Coordinates must be below [MAX_COORD].
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        debug_assert!(x < MAX_COORD && y < MAX_COORD && z < MAX_COORD);
        VoxelId((x & COORD_MASK) | ((y & COORD_MASK) << COORD_BITS) | ((z & COORD_MASK) << 20))
    }

    /// Wrap an existing packed key, discarding any axis bits.
    pub fn from_key(key: u32) -> Self {
        VoxelId(key & VOXEL_MASK)
    }

    pub fn key(self) -> u32 {
        self.0
    }

    pub fn coords(self) -> (u32, u32, u32) {
        (
            self.0 & COORD_MASK,
            (self.0 >> COORD_BITS) & COORD_MASK,
            (self.0 >> 20) & COORD_MASK,
        )
    }

    /// The `which`th of the 12 candidate edges of this cell, or `None` if that
    /// edge would lie beyond the packable coordinate range.
    pub fn candidate_edge(self, which: usize) -> Option<EdgeId> {
        let (x, y, z) = self.coords();
        let o = &CANDIDATE_EDGE_OFFSETS[which];

        if x + o.x >= MAX_COORD || y + o.y >= MAX_COORD || z + o.z >= MAX_COORD {
            return None;
        }

        Some(EdgeId(self.0 + ENCODED_EDGE_OFFSETS[which]))
    }

    /// All candidate edges of this cell, in table order.
    pub fn candidate_edges(self) -> impl Iterator<Item = EdgeId> {
        (0..12).filter_map(move |i| self.candidate_edge(i))
    }
}

/// Key of a lattice edge, identified by its axis and its first endpoint.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EdgeId(u32);

impl EdgeId {
    /// Pack an edge starting at the given coordinate. Coordinates must be below
    /// [MAX_COORD].
    pub fn new(axis: Axis, x: u32, y: u32, z: u32) -> Self {
        EdgeId(VoxelId::new(x, y, z).0 | ((axis as u32) << AXIS_SHIFT))
    }

    pub fn from_key(key: u32) -> Self {
        EdgeId(key)
    }

    pub fn key(self) -> u32 {
        self.0
    }

    pub fn axis(self) -> Axis {
        Axis::from_bits(self.0 >> AXIS_SHIFT)
    }

    /// The lattice point the edge starts from.
    pub fn origin(self) -> VoxelId {
        VoxelId::from_key(self.0)
    }

    /// The `which`th of the four cells sharing this edge, or `None` if that
    /// cell would have a negative coordinate.
    pub fn adjacent_voxel(self, which: usize) -> Option<VoxelId> {
        let axis = self.axis().index();
        let origin = self.origin();
        let (x, y, z) = origin.coords();
        let o = &EDGE_NODE_OFFSETS[axis][which];

        if x < o.x || y < o.y || z < o.z {
            return None;
        }

        Some(VoxelId(origin.0 - ENCODED_EDGE_NODE_OFFSETS[axis * 4 + which]))
    }

    /// The four cells sharing this edge, in quad order.
    pub fn adjacent_voxels(self) -> [Option<VoxelId>; 4] {
        [
            self.adjacent_voxel(0),
            self.adjacent_voxel(1),
            self.adjacent_voxel(2),
            self.adjacent_voxel(3),
        ]
    }
}

impl std::fmt::Debug for VoxelId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (x, y, z) = self.coords();
        write!(f, "VoxelId({}, {}, {})", x, y, z)
    }
}

impl std::fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (x, y, z) = self.origin().coords();
        write!(f, "EdgeId({:?}, {}, {}, {})", self.axis(), x, y, z)
    }
}
