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

/// A 3 dimensional vector, used for sample positions and surface normals.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

pub fn vec3(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

macro_rules! impl_vector_op {
    ($op_name:ident, $op_small_name:ident, $assign_name:ident, $assign_small_name:ident, $op:tt) => {
        impl std::ops::$op_name for Vec3 {
            type Output = Vec3;
            fn $op_small_name(self, other: Vec3) -> Vec3 {
                Vec3::new(self.x $op other.x, self.y $op other.y, self.z $op other.z)
            }
        }
        impl std::ops::$op_name<f32> for Vec3 {
            type Output = Vec3;
            fn $op_small_name(self, other: f32) -> Vec3 {
                Vec3::new(self.x $op other, self.y $op other, self.z $op other)
            }
        }
        impl std::ops::$op_name<Vec3> for f32 {
            type Output = Vec3;
            fn $op_small_name(self, other: Vec3) -> Vec3 {
                Vec3::new(self $op other.x, self $op other.y, self $op other.z)
            }
        }
        impl std::ops::$assign_name for Vec3 {
            fn $assign_small_name(&mut self, other: Vec3) {
                *self = *self $op other;
            }
        }
        impl std::ops::$assign_name<f32> for Vec3 {
            fn $assign_small_name(&mut self, other: f32) {
                *self = *self $op other;
            }
        }
    };
}

impl_vector_op!(Add, add, AddAssign, add_assign, +);
impl_vector_op!(Sub, sub, SubAssign, sub_assign, -);
impl_vector_op!(Mul, mul, MulAssign, mul_assign, *);
impl_vector_op!(Div, div, DivAssign, div_assign, /);

impl Vec3 {
    /// Create a vector
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Create a vector by repeating a single value
    pub const fn from_scalar(f: f32) -> Self {
        Self { x: f, y: f, z: f }
    }

    /// Create a vector with all coordinates set to zero
    pub const fn zero() -> Self {
        Self::from_scalar(0.0)
    }

    /// Squared Euclidean length of this vector
    pub fn len_sq(&self) -> f32 {
        self.dot(*self)
    }

    /// Euclidean length of this vector
    pub fn len(&self) -> f32 {
        self.len_sq().sqrt()
    }

    /// Normalised copy of this vector, or `None` if it is too short to have a
    /// meaningful direction
    pub fn normalised(&self) -> Option<Self> {
        let l = self.len();
        if l < std::f32::EPSILON {
            None
        } else {
            Some(*self / l)
        }
    }

    /// Normalised copy of this vector, or the zero vector if the length is
    /// below `tolerance`
    pub fn safe_normal(&self, tolerance: f32) -> Self {
        if self.len() < tolerance {
            Self::zero()
        } else {
            self.normalised().unwrap_or_default()
        }
    }

    /// Calculate the dot product of this vector and another
    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Create a vector by linearly interpolating between this vector and
    /// another
    pub fn lerp(&self, other: Self, f: f32) -> Self {
        *self + (other - *self) * f
    }

    /// True if no component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl<'a> std::iter::Sum<&'a Vec3> for Vec3 {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |a, b| a + *b)
    }
}
