//! # Whittle
//!
//! Fast triangle mesh simplification with quadric error metrics.
//!
//! Whittle reduces an indexed triangle mesh to a target triangle count by
//! repeatedly collapsing the cheapest edges, scored with Garland–Heckbert
//! quadrics. Each sweep only collapses edges whose error is below a threshold
//! that grows with the sweep number, which keeps the algorithm close to linear
//! time on large meshes.
//!
//! ## Features
//!
//! - **Flat storage**: vertices, triangles and a shared vertex→triangle table,
//!   all addressed by `usize` ids
//! - **Border preservation**: open-boundary vertices never merge with interior ones
//! - **Flip rejection**: collapses that would fold the surface are skipped
//! - **Deterministic**: the same input always produces the same output
//! - **Multiple file formats**: OBJ, STL, PLY
//!
//! ## Quick Start
//!
//! ```no_run
//! use whittle::prelude::*;
//!
//! let mut mesh = whittle::io::load("model.obj").unwrap();
//! println!("Triangles: {}", mesh.num_triangles());
//!
//! let report = mesh.simplify(mesh.num_triangles() / 4, 7.0);
//! println!("{}", report);
//!
//! whittle::io::save(&mesh, "output.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use whittle::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh = Mesh::from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_triangles(), 4);
//! ```
//!
//! The slot-based API fills a mesh of known size one element at a time:
//!
//! ```
//! use whittle::prelude::*;
//!
//! let mut mesh = Mesh::new();
//! mesh.set_vertex_count(3).unwrap();
//! mesh.set_vertex(1, 1.0, 0.0, 0.0).unwrap();
//! mesh.set_vertex(2, 0.0, 1.0, 0.0).unwrap();
//! mesh.set_triangle_count(1).unwrap();
//! mesh.set_triangle(0, 0, 1, 2).unwrap();
//!
//! assert!(mesh.set_triangle(0, 0, 1, 3).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod progress;
pub mod quadric;
pub mod simplify;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use whittle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{Mesh, Triangle, Vertex};
    pub use crate::progress::Progress;
    pub use crate::quadric::Quadric;
    pub use crate::simplify::{simplify, SimplifyOptions, SimplifyReport, Termination};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
