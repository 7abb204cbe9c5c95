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
    feature::{mass_point, PlaceFeature},
    math::Vec3,
};

type Mat3 = [[f64; 3]; 3];

const JACOBI_SWEEPS: usize = 8;
const OFF_DIAGONAL_EPSILON: f64 = 1e-20;

/// The feature placement algorithm used by traditional Dual Contouring.
/// Minimises the quadratic error function defined by the tangent planes at the
/// edge crossings, i.e. the summed squared distance from the vertex to each
/// plane.
///
/// The system is solved relative to the centroid of the crossings, using a
/// pseudo-inverse that discards singular values below `singular_threshold`.
/// Directions the planes don't constrain (along a crease, or everywhere on a
/// flat surface) therefore stay at the centroid rather than drifting away.
#[derive(Debug, Copy, Clone)]
pub struct MinimiseQef {
    pub singular_threshold: f64,
}

impl Default for MinimiseQef {
    fn default() -> Self {
        Self {
            singular_threshold: 0.1,
        }
    }
}

impl PlaceFeature for MinimiseQef {
    fn place_feature(&self, points: &[Vec3], normals: &[Vec3]) -> Vec3 {
        let center = mass_point(points);

        // Accumulate the normal equations A^T A x = A^T b, where each row of A
        // is a plane normal and b the plane's offset from the centroid.
        let mut ata = [[0.0f64; 3]; 3];
        let mut atb = [0.0f64; 3];

        for (p, n) in points.iter().zip(normals) {
            let n = [n.x as f64, n.y as f64, n.z as f64];
            let d = n[0] * (p.x - center.x) as f64
                + n[1] * (p.y - center.y) as f64
                + n[2] * (p.z - center.z) as f64;

            for i in 0..3 {
                for j in 0..3 {
                    ata[i][j] += n[i] * n[j];
                }
                atb[i] += n[i] * d;
            }
        }

        let offset = solve_pseudo_inverse(ata, atb, self.singular_threshold);
        let vertex = center + Vec3::new(offset[0] as f32, offset[1] as f32, offset[2] as f32);

        if vertex.is_finite() {
            vertex
        } else {
            center
        }
    }
}

/// Solve the symmetric system `ata * x = atb` in the least squares sense.
fn solve_pseudo_inverse(ata: Mat3, atb: [f64; 3], singular_threshold: f64) -> [f64; 3] {
    let (eigenvalues, v) = jacobi_eigen(ata);

    // Eigenvalues of A^T A are the squared singular values of A.
    let cutoff = singular_threshold * singular_threshold;

    let mut x = [0.0; 3];
    for k in 0..3 {
        if eigenvalues[k] < cutoff {
            continue;
        }

        let projection = (0..3).map(|i| v[i][k] * atb[i]).sum::<f64>() / eigenvalues[k];
        for i in 0..3 {
            x[i] += v[i][k] * projection;
        }
    }

    x
}

/// Eigen-decomposition of a symmetric 3x3 matrix by cyclic Jacobi rotations.
/// Returns the eigenvalues and a matrix whose columns are the eigenvectors.
fn jacobi_eigen(mut a: Mat3) -> ([f64; 3], Mat3) {
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    for _ in 0..JACOBI_SWEEPS {
        let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
        if off < OFF_DIAGONAL_EPSILON {
            break;
        }

        for &(p, q) in &[(0, 1), (0, 2), (1, 2)] {
            if a[p][q].abs() < OFF_DIAGONAL_EPSILON {
                continue;
            }

            let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;

            for k in 0..3 {
                let (akp, akq) = (a[k][p], a[k][q]);
                a[k][p] = c * akp - s * akq;
                a[k][q] = s * akp + c * akq;
            }
            for k in 0..3 {
                let (apk, aqk) = (a[p][k], a[q][k]);
                a[p][k] = c * apk - s * aqk;
                a[q][k] = s * apk + c * aqk;
            }
            for k in 0..3 {
                let (vkp, vkq) = (v[k][p], v[k][q]);
                v[k][p] = c * vkp - s * vkq;
                v[k][q] = s * vkp + c * vkq;
            }
        }
    }

    ([a[0][0], a[1][1], a[2][2]], v)
}
