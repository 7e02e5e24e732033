//! Wavefront OBJ output
//!
//! Only `v` and `f` records are written: no normals, texture coordinates or
//! materials. Coordinates use 4 decimals and face indices are 1-based.

use std::io::{BufWriter, Write};

use gcodeview_core::constants::OBJ_PRECISION;
use gcodeview_core::Result;

use super::builder::Mesh;
use crate::layers::round4;

fn vertex_line(v: &[f64; 3]) -> String {
    // rounding first keeps tiny negatives from printing as -0.0000
    format!(
        "v {:.*} {:.*} {:.*}",
        OBJ_PRECISION,
        round4(v[0]),
        OBJ_PRECISION,
        round4(v[1]),
        OBJ_PRECISION,
        round4(v[2])
    )
}

/// Write `mesh` as OBJ text into `writer`. An empty mesh writes nothing.
pub fn write_obj<W: Write>(mesh: &Mesh, writer: W) -> Result<()> {
    let mut w = BufWriter::new(writer);
    for v in &mesh.vertices {
        writeln!(w, "{}", vertex_line(v))?;
    }
    for f in &mesh.faces {
        writeln!(w, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    w.flush()?;
    Ok(())
}

/// OBJ text of `mesh`. An empty mesh yields an empty string.
pub fn obj_to_string(mesh: &Mesh) -> String {
    let mut out = String::with_capacity(mesh.vertex_count() * 32 + mesh.face_count() * 16);
    for v in &mesh.vertices {
        out.push_str(&vertex_line(v));
        out.push('\n');
    }
    for f in &mesh.faces {
        out.push_str(&format!("f {} {} {}\n", f[0] + 1, f[1] + 1, f[2] + 1));
    }
    out
}
