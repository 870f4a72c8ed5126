//! STL (stereolithography) format support.
//!
//! Loading handles both binary and ASCII STL. STL stores three positions per
//! facet; stl_io merges bit-identical positions into shared vertices, which
//! is what gives the simplifier its connectivity. Saving writes binary STL,
//! so positions are rounded to `f32`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::warn;
use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::geometry::{is_finite, triangle_normal};
use crate::mesh::Mesh;

/// Load a mesh from an STL file.
///
/// Facets that collapse to fewer than three distinct vertices are skipped.
///
/// # Example
///
/// ```no_run
/// use whittle::io::stl;
///
/// let mesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::load_error(path, e.to_string()))?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();

    let faces: Vec<[usize; 3]> = stl
        .faces
        .iter()
        .map(|f| f.vertices)
        .filter(|[a, b, c]| a != b && b != c && a != c)
        .collect();

    let skipped = stl.faces.len() - faces.len();
    if skipped > 0 {
        warn!("{}: skipped {} degenerate facets", path.display(), skipped);
    }
    if faces.is_empty() {
        return Err(MeshError::load_error(path, "STL file contains no valid triangles"));
    }

    Mesh::from_triangles(&vertices, &faces).map_err(|e| MeshError::load_error(path, e.to_string()))
}

/// Save a mesh to a binary STL file.
///
/// Facet normals are recomputed from the geometry; degenerate facets get a
/// zero normal.
///
/// # Example
///
/// ```no_run
/// use whittle::io::stl;
/// use whittle::mesh::Mesh;
///
/// let mesh = Mesh::new();
/// stl::save(&mesh, "output.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = mesh.export_geometry();
    let vertex = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let triangles: Vec<stl_io::Triangle> = faces
        .iter()
        .map(|f| {
            let [p0, p1, p2] = f.map(|i| vertices[i]);

            let mut n = triangle_normal(&p0, &p1, &p2);
            if !is_finite(&n) {
                n = Vector3::zeros();
            }

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(&p0), vertex(&p1), vertex(&p2)],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::tests::temp_path;
    use crate::mesh::tests::{cube, grid};

    #[test]
    fn test_round_trip_shares_vertices() {
        let original = grid(4);
        let path = temp_path("grid.stl");

        save(&original, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), original.num_vertices());
        assert_eq!(loaded.num_triangles(), original.num_triangles());
    }

    #[test]
    fn test_round_trip_keeps_closed_surface() {
        let path = temp_path("cube.stl");

        save(&cube(), &path).unwrap();
        let mut loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        loaded.rebuild_adjacency(true);
        assert!(loaded.vertices().iter().all(|v| !v.is_border()));
    }

    #[test]
    fn test_degenerate_facet_gets_zero_normal() {
        let mut mesh = Mesh::new();
        mesh.set_vertex_count(3).unwrap();
        mesh.set_vertex(1, 1.0, 0.0, 0.0).unwrap();
        mesh.set_vertex(2, 2.0, 0.0, 0.0).unwrap();
        mesh.set_triangle_count(1).unwrap();
        mesh.set_triangle(0, 0, 1, 2).unwrap();

        let path = temp_path("flat.stl");
        save(&mesh, &path).unwrap();
        let mut file = File::open(&path).unwrap();
        let stl = stl_io::read_stl(&mut file).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(stl.faces.len(), 1);
        assert_eq!(stl.faces[0].normal, stl_io::Normal::new([0.0, 0.0, 0.0]));
    }
}
