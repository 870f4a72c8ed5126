//! Mesh file I/O.
//!
//! This module provides functions for loading and saving meshes in various formats.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | Positions and faces only |
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII load, binary save |
//! | PLY | `.ply` | ✓ | ✓ | Any encoding on load, ASCII save |
//!
//! # Usage
//!
//! ```no_run
//! use whittle::io::{load, save};
//!
//! let mut mesh = load("model.obj").unwrap();
//! mesh.simplify(2000, 7.0);
//! save(&mesh, "output.stl").unwrap();
//! ```

pub mod obj;
pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::load(path),
        Format::Stl => stl::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension. Deleted triangles are
/// skipped; simplified meshes are already compacted.
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::mesh::tests::cube;

    /// A per-test path under the system temp directory.
    pub(crate) fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("whittle-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/model.OBJ"), Some(Format::Obj));
        assert_eq!(Format::from_path("model.stl"), Some(Format::Stl));
        assert_eq!(Format::from_path("model.ply"), Some(Format::Ply));
        assert_eq!(Format::from_path("model.gltf"), None);
        assert_eq!(Format::from_path("model"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = save(&cube(), temp_path("cube.xyz")).unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { ref extension } if extension == "xyz"));

        let err = load("no_extension").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { ref extension } if extension == "(none)"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load(temp_path("does-not-exist.obj")).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }

    #[test]
    fn test_save_load_every_format() {
        for ext in ["obj", "stl", "ply"] {
            let path = temp_path(&format!("cube-dispatch.{}", ext));
            save(&cube(), &path).unwrap();
            let mesh = load(&path).unwrap();
            std::fs::remove_file(&path).ok();

            assert_eq!(mesh.num_vertices(), 8, "{}", ext);
            assert_eq!(mesh.num_triangles(), 12, "{}", ext);
        }
    }
}
