//! PLY (Stanford polygon) format support.
//!
//! Loading accepts any PLY encoding ply-rs understands; only the `vertex`
//! positions and the `face` index lists are read. Saving writes ASCII PLY.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::warn;
use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Load a mesh from a PLY file.
///
/// Polygons are fan-triangulated; faces with fewer than three corners are
/// skipped with a warning.
///
/// # Example
///
/// ```no_run
/// use whittle::io::ply;
///
/// let mesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| MeshError::load_error(path, e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| MeshError::load_error(path, "PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| MeshError::load_error(path, format!("vertex missing {} coordinate", name)))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| MeshError::load_error(path, "PLY file has no face element"))?;

    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(face_element.len());
    let mut skipped = 0usize;
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| MeshError::load_error(path, "face missing vertex_indices property"))?;

        if indices.len() < 3 {
            skipped += 1;
            continue;
        }
        for i in 1..indices.len() - 1 {
            faces.push([indices[0], indices[i], indices[i + 1]]);
        }
    }

    if skipped > 0 {
        warn!("{}: skipped {} faces with fewer than 3 corners", path.display(), skipped);
    }
    if faces.is_empty() {
        return Err(MeshError::load_error(path, "PLY file contains no faces"));
    }

    Mesh::from_triangles(&vertices, &faces).map_err(|e| MeshError::load_error(path, e.to_string()))
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    fn convert<T: Copy + TryInto<usize>>(values: &[T]) -> Option<Vec<usize>> {
        values.iter().map(|&x| x.try_into().ok()).collect()
    }

    match element.get(name)? {
        Property::ListInt(v) => convert(v),
        Property::ListUInt(v) => convert(v),
        Property::ListShort(v) => convert(v),
        Property::ListUShort(v) => convert(v),
        Property::ListChar(v) => convert(v),
        Property::ListUChar(v) => convert(v),
        _ => None,
    }
}

/// Save a mesh to a PLY file (ASCII format).
///
/// Positions are written at full `double` precision.
///
/// # Example
///
/// ```no_run
/// use whittle::io::ply;
/// use whittle::mesh::Mesh;
///
/// let mesh = Mesh::new();
/// ply::save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = mesh.export_geometry();

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by whittle")?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "element face {}", faces.len())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for v in &vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }
    for f in &faces {
        writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::tests::temp_path;
    use crate::mesh::tests::sphere;

    #[test]
    fn test_round_trip_is_exact() {
        let original = sphere(1);
        let path = temp_path("sphere.ply");

        save(&original, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.export_geometry(), original.export_geometry());
    }

    #[test]
    fn test_load_quad_and_skip_short_faces() {
        let path = temp_path("quad.ply");
        let data = "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 2
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
4 0 1 2 3
2 0 1
";
        std::fs::write(&path, data).unwrap();
        let mesh = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(mesh.triangle(1).indices(), [0, 2, 3]);
    }

    #[test]
    fn test_load_rejects_out_of_range_face() {
        let path = temp_path("bad.ply");
        let data = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 7
";
        std::fs::write(&path, data).unwrap();
        let err = load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, MeshError::LoadError { .. }));
    }
}
