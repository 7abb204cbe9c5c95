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

//! Contours a box with a radial bulge on one corner, and writes the mesh to
//! stdout in Wavefront OBJ format.
//!
//! Usage: `cargo run --example blob [resolution] > blob.obj`
//!
//! Set `RUST_LOG=debug` to see per-stage counts.

use std::{
    error::Error,
    io::{self, BufWriter, Write},
};
use voxel_contouring::{extractor::Mesh, math::Vec3, DualContouring, VoxelField};

const SIZE: f32 = 500.0;
const BOX_EXTENT: f32 = 100.0;
const BULGE_CENTER: Vec3 = Vec3::new(100.0, 100.0, 100.0);
const BULGE_RADIUS: f32 = 50.0;

fn build_scene(resolution: usize) -> Result<VoxelField, Box<dyn Error>> {
    let mut field = VoxelField::new(resolution, SIZE)?;

    field.for_each(|field, (x, y, z)| {
        let p = field.voxel_index_to_vector(x, y, z);
        if p.x.abs() < BOX_EXTENT && p.y.abs() < BOX_EXTENT && p.z.abs() < BOX_EXTENT {
            field.set_density(x, y, z, 1.0);
        }
    });

    let reach = BULGE_RADIUS * 5.0;
    field.for_each(|field, (x, y, z)| {
        let r = (field.voxel_index_to_vector(x, y, z) - BULGE_CENTER).len();
        if r < reach {
            let density = field.density(x, y, z) + BULGE_RADIUS / r;
            field.set_density(x, y, z, density);
        }
    });

    Ok(field)
}

fn write_obj<W: Write>(out: &mut W, mesh: &Mesh, origin: Vec3) -> io::Result<()> {
    writeln!(out, "# {} vertices, {} triangles", mesh.positions.len(), mesh.triangle_count())?;

    for p in &mesh.positions {
        let p = *p + origin;
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for n in &mesh.normals {
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
    }

    // OBJ faces are counter-clockwise seen from outside, and indices start at 1
    for [a, b, c] in mesh.triangles() {
        let (a, b, c) = (a + 1, c + 1, b + 1);
        writeln!(out, "f {}//{} {}//{} {}//{}", a, a, b, b, c, c)?;
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let resolution = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 64,
    };

    let field = build_scene(resolution)?;

    let mut mesh = Mesh::new();
    let stats = DualContouring::default().extract(&field, &mut mesh);
    log::info!("{:?}", stats);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_obj(&mut out, &mesh, field.origin())?;
    out.flush()?;

    Ok(())
}
