//! Wavefront OBJ format support.
//!
//! Only geometry is read: `v x y z` records and `f` records. Face corners may
//! use the `v`, `v/vt`, `v//vn` or `v/vt/vn` forms and negative (relative)
//! indices; polygons are fan-triangulated. Every other record is ignored.
//!
//! Saving writes one `v x y z` line per vertex and one `f a b c` line per
//! surviving triangle, with 1-based indices.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::warn;
use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use whittle::io::obj;
///
/// let mesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse(BufReader::new(file), path)
}

/// Read OBJ data from any buffered reader.
pub fn read<R: BufRead>(reader: R) -> Result<Mesh> {
    parse(reader, Path::new("<stream>"))
}

fn parse<R: BufRead>(reader: R, path: &Path) -> Result<Mesh> {
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();
    let mut corners: Vec<usize> = Vec::with_capacity(4);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for c in &mut coords {
                    let token = tokens.next().ok_or_else(|| {
                        MeshError::load_error(path, format!("line {}: vertex needs 3 coordinates", line_no + 1))
                    })?;
                    *c = token.parse().map_err(|_| {
                        MeshError::load_error(path, format!("line {}: bad coordinate '{}'", line_no + 1, token))
                    })?;
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                corners.clear();
                for token in tokens {
                    corners.push(resolve_index(token, vertices.len()).ok_or_else(|| {
                        MeshError::load_error(path, format!("line {}: bad face index '{}'", line_no + 1, token))
                    })?);
                }

                if corners.len() < 3 {
                    warn!("{}: line {}: skipping face with {} corners", path.display(), line_no + 1, corners.len());
                    continue;
                }
                for i in 1..corners.len() - 1 {
                    faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if faces.is_empty() {
        return Err(MeshError::load_error(path, "OBJ file contains no faces"));
    }

    Mesh::from_triangles(&vertices, &faces).map_err(|e| MeshError::load_error(path, e.to_string()))
}

/// Turn the vertex part of a face corner into a 0-based index.
///
/// `num_vertices` is the number of vertices read so far, which negative
/// indices count back from.
fn resolve_index(token: &str, num_vertices: usize) -> Option<usize> {
    let index: i64 = token.split('/').next()?.parse().ok()?;
    match index {
        0 => None,
        i if i > 0 => Some(i as usize - 1),
        i => num_vertices.checked_sub(i.unsigned_abs() as usize),
    }
}

/// Save a mesh to an OBJ file.
///
/// # Example
///
/// ```no_run
/// use whittle::io::obj;
/// use whittle::mesh::Mesh;
///
/// let mesh = Mesh::new();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write OBJ data to any writer.
pub fn write<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    let (positions, triangles) = mesh.export_geometry();

    for p in &positions {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for [a, b, c] in &triangles {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }

    Ok(())
}
