//! Indexed triangle mesh used by the simplifier.
//!
//! [`Mesh`] owns three flat arrays: vertices, triangles, and a shared table of
//! vertex-to-triangle references. Every cross reference is a plain `usize`
//! index into one of those arrays.
//!
//! # Reference table
//!
//! Each vertex owns a window `[tstart, tstart + tcount)` into the reference
//! table, listing the triangles that use it together with the corner (slot)
//! the vertex occupies. Windows are rebuilt wholesale by
//! [`Mesh::rebuild_adjacency`]; during simplification the table only grows by
//! appending at its tail, so windows are always offsets into the current
//! buffer, never stable addresses.
//!
//! # Construction
//!
//! ```
//! use whittle::mesh::Mesh;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh = Mesh::from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 3);
//! assert_eq!(mesh.num_triangles(), 1);
//! ```
//!
//! The slot-by-slot API mirrors how loaders fill a mesh:
//!
//! ```
//! use whittle::mesh::Mesh;
//!
//! let mut mesh = Mesh::new();
//! mesh.set_vertex_count(3).unwrap();
//! mesh.set_vertex(0, 0.0, 0.0, 0.0).unwrap();
//! mesh.set_vertex(1, 1.0, 0.0, 0.0).unwrap();
//! mesh.set_vertex(2, 0.0, 1.0, 0.0).unwrap();
//! mesh.set_triangle_count(1).unwrap();
//! mesh.set_triangle(0, 0, 1, 2).unwrap();
//!
//! let (positions, triangles) = mesh.export_geometry();
//! assert_eq!(positions.len(), 3);
//! assert_eq!(triangles, vec![[0, 1, 2]]);
//! ```

mod adjacency;
mod compact;

use std::ops::Range;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::quadric::Quadric;

/// A mesh vertex.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Sum of the plane quadrics of the incident faces.
    pub(crate) quadric: Quadric,

    /// Heuristic boundary flag, computed on the first adjacency rebuild.
    pub(crate) border: bool,

    /// Start of this vertex's window in the reference table.
    pub(crate) tstart: usize,

    /// Length of this vertex's window in the reference table.
    pub(crate) tcount: usize,
}

impl Vertex {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            quadric: Quadric::ZERO,
            border: false,
            tstart: 0,
            tcount: 0,
        }
    }

    /// Whether this vertex was classified as lying on the mesh border.
    #[inline]
    pub fn is_border(&self) -> bool {
        self.border
    }

    /// The accumulated error quadric.
    #[inline]
    pub fn quadric(&self) -> &Quadric {
        &self.quadric
    }

    /// Number of triangles currently listed in this vertex's reference window.
    #[inline]
    pub fn valence(&self) -> usize {
        self.tcount
    }

    #[inline]
    pub(crate) fn window(&self) -> Range<usize> {
        self.tstart..self.tstart + self.tcount
    }
}

/// A mesh triangle.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertex ids, counter-clockwise.
    pub(crate) indices: [usize; 3],

    /// Collapse cost of edges `(0,1)`, `(1,2)` and `(2,0)`.
    pub(crate) errors: [f64; 3],

    /// Minimum of `errors`.
    pub(crate) min_error: f64,

    /// Unit face normal captured at the last full rebuild.
    pub(crate) normal: Vector3<f64>,

    /// Set once the triangle collapses; never cleared before compaction.
    pub(crate) deleted: bool,

    /// Set when the triangle changed during the current sweep.
    pub(crate) dirty: bool,
}

impl Triangle {
    /// Create a new triangle from three vertex ids.
    pub fn new(indices: [usize; 3]) -> Self {
        Self {
            indices,
            errors: [0.0; 3],
            min_error: 0.0,
            normal: Vector3::zeros(),
            deleted: false,
            dirty: false,
        }
    }

    /// Vertex ids of this triangle.
    #[inline]
    pub fn indices(&self) -> [usize; 3] {
        self.indices
    }

    /// Whether this triangle has been removed by a collapse.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Collapse costs of the three edges.
    #[inline]
    pub fn errors(&self) -> [f64; 3] {
        self.errors
    }

    /// Cached minimum edge cost.
    #[inline]
    pub fn min_error(&self) -> f64 {
        self.min_error
    }

    /// Face normal recorded at the last full rebuild.
    #[inline]
    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    /// Store new edge costs and refresh the cached minimum.
    ///
    /// NaN entries are ignored by the minimum unless all three are NaN.
    #[inline]
    pub(crate) fn set_errors(&mut self, errors: [f64; 3]) {
        self.errors = errors;
        self.min_error = errors[0].min(errors[1]).min(errors[2]);
    }
}

/// A reverse-adjacency entry: triangle `tid` uses the vertex at corner `slot`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Ref {
    pub tid: usize,
    pub slot: usize,
}

/// An indexed triangle mesh with the bookkeeping needed for edge collapse.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) refs: Vec<Ref>,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with preallocated storage.
    pub fn with_capacity(num_vertices: usize, num_triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            triangles: Vec::with_capacity(num_triangles),
            refs: Vec::with_capacity(num_triangles * 3),
        }
    }

    /// Build a mesh from positions and 0-based triangle indices.
    ///
    /// Fails with [`MeshError::InvalidVertexIndex`] if any index is out of range.
    pub fn from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<Self> {
        let mut mesh = Self::with_capacity(vertices.len(), faces.len());
        mesh.vertices
            .extend(vertices.iter().map(|&p| Vertex::new(p)));
        mesh.triangles.extend(faces.iter().map(|&f| Triangle::new(f)));
        mesh.validate()?;
        Ok(mesh)
    }

    /// Resize the vertex array. New vertices are placed at the origin.
    ///
    /// Shrinking below a vertex id still used by a triangle is rejected.
    pub fn set_vertex_count(&mut self, n: usize) -> Result<()> {
        if n < self.vertices.len() {
            for (fi, t) in self.triangles.iter().enumerate() {
                if let Some(&vertex) = t.indices.iter().find(|&&v| v >= n) {
                    return Err(MeshError::InvalidVertexIndex { face: fi, vertex });
                }
            }
        }
        self.vertices.resize_with(n, || Vertex::new(Point3::origin()));
        Ok(())
    }

    /// Set the position of vertex `i`.
    pub fn set_vertex(&mut self, i: usize, x: f64, y: f64, z: f64) -> Result<()> {
        let len = self.vertices.len();
        let v = self.vertices.get_mut(i).ok_or(MeshError::IndexOutOfRange {
            kind: "vertex",
            index: i,
            len,
        })?;
        v.position = Point3::new(x, y, z);
        Ok(())
    }

    /// Resize the triangle array.
    ///
    /// New triangles are placeholders `[0, 0, 0]` until set with
    /// [`Mesh::set_triangle`], so at least one vertex must exist.
    pub fn set_triangle_count(&mut self, n: usize) -> Result<()> {
        if n > self.triangles.len() && self.vertices.is_empty() {
            return Err(MeshError::InvalidVertexIndex {
                face: self.triangles.len(),
                vertex: 0,
            });
        }
        self.triangles.resize_with(n, || Triangle::new([0, 0, 0]));
        Ok(())
    }

    /// Set the vertex ids (0-based) of triangle `i`.
    pub fn set_triangle(&mut self, i: usize, a: usize, b: usize, c: usize) -> Result<()> {
        let num_vertices = self.vertices.len();
        if let Some(&vertex) = [a, b, c].iter().find(|&&v| v >= num_vertices) {
            return Err(MeshError::InvalidVertexIndex { face: i, vertex });
        }
        let len = self.triangles.len();
        let t = self.triangles.get_mut(i).ok_or(MeshError::IndexOutOfRange {
            kind: "triangle",
            index: i,
            len,
        })?;
        *t = Triangle::new([a, b, c]);
        Ok(())
    }

    /// Check that every live triangle references an existing vertex.
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        for (fi, t) in self.triangles.iter().enumerate() {
            if t.deleted {
                continue;
            }
            if let Some(&vertex) = t.indices.iter().find(|&&v| v >= n) {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex });
            }
        }
        Ok(())
    }

    /// Number of stored vertices, including ones no longer referenced.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of stored triangles, including deleted ones awaiting compaction.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of triangles not marked deleted.
    pub fn num_live_triangles(&self) -> usize {
        self.triangles.iter().filter(|t| !t.deleted).count()
    }

    /// Get a vertex by id.
    #[inline]
    pub fn vertex(&self, i: usize) -> &Vertex {
        &self.vertices[i]
    }

    /// Get a triangle by id.
    #[inline]
    pub fn triangle(&self, i: usize) -> &Triangle {
        &self.triangles[i]
    }

    /// All stored vertices.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All stored triangles, including deleted ones.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Axis-aligned bounding box of all vertices, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let bounds = self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(&v.position), max.sup(&v.position))
        });
        Some(bounds)
    }

    /// Export surviving geometry as positions plus 0-based triangle indices.
    ///
    /// Vertices are returned in storage order; deleted triangles are skipped.
    /// After [`Mesh::compact`] every exported vertex is referenced.
    pub fn export_geometry(&self) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let positions = self.vertices.iter().map(|v| v.position).collect();
        let triangles = self
            .triangles
            .iter()
            .filter(|t| !t.deleted)
            .map(|t| t.indices)
            .collect();
        (positions, triangles)
    }

    /// Reference-table entries of vertex `v`.
    #[inline]
    pub(crate) fn refs_of(&self, v: usize) -> &[Ref] {
        &self.refs[self.vertices[v].window()]
    }

    /// Collapse cost of moving `v1` onto `v2`'s position.
    ///
    /// The combined quadric is evaluated at `v2`, not at the quadric optimum,
    /// so the cost is asymmetric.
    #[inline]
    pub fn edge_error(&self, v1: usize, v2: usize) -> f64 {
        let q = self.vertices[v1].quadric + self.vertices[v2].quadric;
        q.evaluate(&self.vertices[v2].position)
    }

    /// Recompute the three edge costs of triangle `tid`.
    pub(crate) fn refresh_triangle_errors(&mut self, tid: usize) {
        let [a, b, c] = self.triangles[tid].indices;
        let errors = [
            self.edge_error(a, b),
            self.edge_error(b, c),
            self.edge_error(c, a),
        ];
        self.triangles[tid].set_errors(errors);
    }
}
