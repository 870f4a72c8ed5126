//! Reference-table rebuild, border classification and quadric initialization.

use log::trace;

use super::{Mesh, Ref};
use crate::geometry::triangle_normal;
use crate::quadric::Quadric;

impl Mesh {
    /// Rebuild every vertex's reference window from the live triangles.
    ///
    /// With `full_rebuild` set, additionally:
    /// 1. reclassifies border vertices,
    /// 2. recomputes face normals and rebuilds every vertex quadric from
    ///    scratch,
    /// 3. recomputes every triangle's edge costs.
    ///
    /// Deleted triangles are left out of the table.
    pub fn rebuild_adjacency(&mut self, full_rebuild: bool) {
        for v in &mut self.vertices {
            v.tstart = 0;
            v.tcount = 0;
        }

        for t in self.triangles.iter().filter(|t| !t.deleted) {
            for &vi in &t.indices {
                self.vertices[vi].tcount += 1;
            }
        }

        let mut tstart = 0;
        for v in &mut self.vertices {
            v.tstart = tstart;
            tstart += v.tcount;
            v.tcount = 0;
        }

        self.refs.clear();
        self.refs.resize(tstart, Ref::default());

        for (tid, t) in self.triangles.iter().enumerate() {
            if t.deleted {
                continue;
            }
            for (slot, &vi) in t.indices.iter().enumerate() {
                let v = &mut self.vertices[vi];
                self.refs[v.tstart + v.tcount] = Ref { tid, slot };
                v.tcount += 1;
            }
        }

        trace!(
            "rebuilt adjacency: {} refs over {} vertices (full = {})",
            self.refs.len(),
            self.vertices.len(),
            full_rebuild
        );

        if full_rebuild {
            self.detect_borders();
            self.init_quadrics();
            for tid in 0..self.triangles.len() {
                if !self.triangles[tid].deleted {
                    self.refresh_triangle_errors(tid);
                }
            }
        }
    }

    /// Flag border vertices by counting how often each vertex id appears in
    /// the triangle fan of every vertex.
    ///
    /// An id seen exactly once in some fan is flagged. On a manifold mesh that
    /// happens exactly for the endpoints of edges with a single incident
    /// triangle; on non-manifold input the count can misclassify vertices.
    fn detect_borders(&mut self) {
        for v in &mut self.vertices {
            v.border = false;
        }

        let mut counts: Vec<(usize, u32)> = Vec::new();
        for vi in 0..self.vertices.len() {
            counts.clear();
            for r in self.refs_of(vi) {
                for &id in &self.triangles[r.tid].indices {
                    match counts.iter_mut().find(|(seen, _)| *seen == id) {
                        Some((_, count)) => *count += 1,
                        None => counts.push((id, 1)),
                    }
                }
            }
            for &(id, count) in &counts {
                if count == 1 {
                    self.vertices[id].border = true;
                }
            }
        }
    }

    /// Reset vertex quadrics to the sum of their incident face-plane quadrics.
    fn init_quadrics(&mut self) {
        for v in &mut self.vertices {
            v.quadric = Quadric::ZERO;
        }

        for t in self.triangles.iter_mut().filter(|t| !t.deleted) {
            let [a, b, c] = t.indices;
            let p0 = self.vertices[a].position;
            let n = triangle_normal(&p0, &self.vertices[b].position, &self.vertices[c].position);
            t.normal = n;

            let q = Quadric::from_plane(&n, -n.dot(&p0.coords));
            for &vi in &t.indices {
                self.vertices[vi].quadric += q;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::mesh::tests::{cube, grid, tetrahedron};
    use crate::mesh::Mesh;

    #[test]
    fn test_windows_are_contiguous_and_complete() {
        let mut mesh = grid(3);
        mesh.rebuild_adjacency(true);

        let mut next = 0;
        for (vi, v) in mesh.vertices().iter().enumerate() {
            assert_eq!(v.tstart, next, "window of {} is not contiguous", vi);
            next += v.tcount;

            for r in mesh.refs_of(vi) {
                assert_eq!(mesh.triangle(r.tid).indices()[r.slot], vi);
            }
        }
        assert_eq!(next, mesh.num_triangles() * 3);
    }

    #[test]
    fn test_closed_mesh_has_no_border() {
        let mut mesh = cube();
        mesh.rebuild_adjacency(true);
        assert!(mesh.vertices().iter().all(|v| !v.is_border()));

        let mut mesh = tetrahedron();
        mesh.rebuild_adjacency(true);
        assert!(mesh.vertices().iter().all(|v| !v.is_border()));
    }

    #[test]
    fn test_grid_border_vertices() {
        let n = 4;
        let mut mesh = grid(n);
        mesh.rebuild_adjacency(true);

        for (vi, v) in mesh.vertices().iter().enumerate() {
            let (i, j) = (vi % (n + 1), vi / (n + 1));
            let on_rim = i == 0 || j == 0 || i == n || j == n;
            assert_eq!(v.is_border(), on_rim, "vertex ({}, {})", i, j);
        }
    }

    #[test]
    fn test_border_heuristic_on_bowtie() {
        // Two triangles sharing only vertex 0. Every vertex sits on an open
        // edge, including the pinch vertex.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
        ];
        let mut mesh = Mesh::from_triangles(&vertices, &[[0, 1, 2], [0, 3, 4]]).unwrap();
        mesh.rebuild_adjacency(true);
        assert!(mesh.vertices().iter().all(|v| v.is_border()));
    }

    #[test]
    fn test_quadrics_vanish_on_incident_planes() {
        let mut mesh = cube();
        mesh.rebuild_adjacency(true);

        for v in mesh.vertices() {
            assert!(v.quadric().evaluate(&v.position).abs() < 1e-12);
        }

        // The corner quadric measures squared distance to three planes.
        let q = mesh.vertex(0).quadric();
        let e = q.evaluate(&Point3::new(1.0, 1.0, 1.0));
        assert!(e > 0.0);
    }

    #[test]
    fn test_flat_grid_edges_cost_nothing() {
        let mut mesh = grid(3);
        mesh.rebuild_adjacency(true);

        for t in mesh.triangles() {
            assert!(t.min_error().abs() < 1e-12);
            for e in t.errors() {
                assert!(e.abs() < 1e-12);
            }
            assert!((t.normal().z - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cached_minimum_matches_edges() {
        let mut mesh = tetrahedron();
        mesh.rebuild_adjacency(true);

        for (tid, t) in mesh.triangles().iter().enumerate() {
            let [a, b, c] = t.indices();
            let expected = [mesh.edge_error(a, b), mesh.edge_error(b, c), mesh.edge_error(c, a)];
            assert_eq!(t.errors(), expected, "triangle {}", tid);
            let min = expected.iter().cloned().fold(f64::INFINITY, f64::min);
            assert_eq!(t.min_error(), min);
        }
    }

    #[test]
    fn test_partial_rebuild_keeps_quadrics() {
        let mut mesh = cube();
        mesh.rebuild_adjacency(true);
        let before: Vec<_> = mesh.vertices().iter().map(|v| *v.quadric()).collect();

        mesh.triangles[0].deleted = true;
        mesh.rebuild_adjacency(false);

        let after: Vec<_> = mesh.vertices().iter().map(|v| *v.quadric()).collect();
        assert_eq!(before, after);
        assert_eq!(mesh.vertex(0).valence(), 4);
        assert!(mesh.refs_of(0).iter().all(|r| r.tid != 0));
    }
}
