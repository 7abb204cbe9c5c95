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
use thiserror::Error;

/// Errors raised when constructing or editing a [VoxelField](crate::VoxelField).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// Resolutions must fit the 10 bit coordinate packing of the edge indexer,
    /// and have at least two samples per axis.
    #[error("resolution {0} is outside the supported range [2, 1024]")]
    InvalidResolution(usize),

    #[error("physical size {0} must be finite and positive")]
    InvalidSize(f32),

    #[error("coordinate ({x}, {y}, {z}) is outside a lattice of resolution {resolution}")]
    OutOfBounds {
        x: i32,
        y: i32,
        z: i32,
        resolution: usize,
    },
}
