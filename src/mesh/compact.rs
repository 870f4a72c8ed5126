//! Removal of deleted triangles and orphaned vertices.

use super::Mesh;

impl Mesh {
    /// Physically remove deleted triangles and unreferenced vertices.
    ///
    /// Surviving triangles and vertices keep their relative order and triangle
    /// indices are remapped to the compacted vertex ids. The reference table is
    /// cleared; call [`Mesh::rebuild_adjacency`] before collapsing again.
    pub fn compact(&mut self) {
        self.drop_deleted_triangles();

        let mut remap: Vec<Option<usize>> = vec![None; self.vertices.len()];
        for t in &self.triangles {
            for &vi in &t.indices {
                remap[vi] = Some(0);
            }
        }

        let mut next = 0;
        for slot in remap.iter_mut().filter(|slot| slot.is_some()) {
            *slot = Some(next);
            next += 1;
        }

        let mut old_id = 0;
        self.vertices.retain(|_| {
            let keep = remap[old_id].is_some();
            old_id += 1;
            keep
        });

        for t in &mut self.triangles {
            for vi in &mut t.indices {
                if let Some(new_id) = remap[*vi] {
                    *vi = new_id;
                }
            }
        }

        self.refs.clear();
        for v in &mut self.vertices {
            v.tstart = 0;
            v.tcount = 0;
        }
    }

    /// Remove deleted triangles, keeping the order of the rest.
    ///
    /// Vertex windows are stale afterwards until the next rebuild.
    pub(crate) fn drop_deleted_triangles(&mut self) {
        self.triangles.retain(|t| !t.deleted);
    }
}
