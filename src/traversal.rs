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

/// A finite, restartable walk over every point of an N*N*N lattice.
///
/// Points are produced in the same order as the field's linear storage, with
/// `z` varying fastest, then `y`, then `x`. Cloning the iterator restarts the
/// walk from the clone's current position.
#[derive(Debug, Clone)]
pub struct Lattice {
    resolution: i32,
    next: Option<(i32, i32, i32)>,
}

impl Lattice {
    /// Walk a lattice with `resolution` points along each axis.
    pub fn new(resolution: usize) -> Self {
        let resolution = resolution as i32;
        Self {
            resolution,
            next: if resolution > 0 { Some((0, 0, 0)) } else { None },
        }
    }

    fn remaining(&self) -> usize {
        match self.next {
            None => 0,
            Some((x, y, z)) => {
                let n = self.resolution as usize;
                let consumed = (x as usize * n + y as usize) * n + z as usize;
                n * n * n - consumed
            }
        }
    }
}

impl Iterator for Lattice {
    type Item = (i32, i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let (mut x, mut y, mut z) = current;

        z += 1;
        if z == self.resolution {
            z = 0;
            y += 1;
            if y == self.resolution {
                y = 0;
                x += 1;
            }
        }

        self.next = if x == self.resolution {
            None
        } else {
            Some((x, y, z))
        };

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Lattice {}
