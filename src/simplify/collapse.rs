//! Edge collapse with flip and border guards.

use nalgebra::Point3;

use crate::geometry::{normalize, unit_direction};
use crate::mesh::Mesh;

/// Opposite edges closer to collinear than this are treated as degenerate.
const COLLINEAR_LIMIT: f64 = 0.999;

/// Minimum cosine between a triangle's old and new normal (about 78 degrees).
const MIN_NORMAL_COSINE: f64 = 0.2;

/// Per-slot "this triangle dies with the edge" marks, reused across collapses.
#[derive(Debug, Default)]
pub(crate) struct CollapseScratch {
    keep: Vec<bool>,
    other: Vec<bool>,
}

impl CollapseScratch {
    fn reset(marks: &mut Vec<bool>, len: usize) {
        marks.clear();
        marks.resize(len, false);
    }
}

impl Mesh {
    /// Check whether moving `keep` to `target` would fold any triangle of its
    /// fan, where `other` is the far end of the edge being collapsed.
    ///
    /// Triangles that also contain `other` degenerate with the edge and are
    /// marked in `marks` (indexed by position in `keep`'s window) instead of
    /// being tested. Any test value that is not finite counts as a flip.
    pub(crate) fn would_flip(
        &self,
        target: &Point3<f64>,
        keep: usize,
        other: usize,
        marks: &mut [bool],
    ) -> bool {
        for (k, r) in self.refs_of(keep).iter().enumerate() {
            let t = &self.triangles[r.tid];
            if t.deleted {
                continue;
            }

            let id1 = t.indices[(r.slot + 1) % 3];
            let id2 = t.indices[(r.slot + 2) % 3];

            if id1 == other || id2 == other {
                marks[k] = true;
                continue;
            }

            let d1 = unit_direction(target, &self.vertices[id1].position);
            let d2 = unit_direction(target, &self.vertices[id2].position);
            let cos = d1.dot(&d2);
            if !cos.is_finite() || cos.abs() > COLLINEAR_LIMIT {
                return true;
            }

            let n = normalize(d1.cross(&d2));
            marks[k] = false;
            let deviation = n.dot(&t.normal);
            if !deviation.is_finite() || deviation < MIN_NORMAL_COSINE {
                return true;
            }
        }
        false
    }

    /// Fold every live triangle in `source`'s window onto `keep`.
    ///
    /// Marked triangles are deleted and counted in `deleted`; the rest are
    /// repointed, flagged dirty, re-costed, and their references appended to
    /// the tail of the table.
    pub(crate) fn apply_collapse(
        &mut self,
        keep: usize,
        source: usize,
        marks: &[bool],
        deleted: &mut usize,
    ) {
        let window = self.vertices[source].window();
        for (k, ri) in window.enumerate() {
            let r = self.refs[ri];
            let t = &mut self.triangles[r.tid];
            if t.deleted {
                continue;
            }
            if marks[k] {
                t.deleted = true;
                *deleted += 1;
                continue;
            }

            t.indices[r.slot] = keep;
            t.dirty = true;
            self.refresh_triangle_errors(r.tid);
            self.refs.push(r);
        }
    }

    /// Collapse the edge `(i0, i1)`, moving `i0` onto `i1`'s position.
    ///
    /// Returns `false` without touching the mesh when the endpoints disagree
    /// on the border flag or when either fan would flip. Triangles removed by
    /// the collapse are added to `deleted`.
    pub(crate) fn collapse_edge(
        &mut self,
        i0: usize,
        i1: usize,
        scratch: &mut CollapseScratch,
        deleted: &mut usize,
    ) -> bool {
        if i0 == i1 || self.vertices[i0].border != self.vertices[i1].border {
            return false;
        }

        let target = self.vertices[i1].position;

        CollapseScratch::reset(&mut scratch.keep, self.vertices[i0].tcount);
        CollapseScratch::reset(&mut scratch.other, self.vertices[i1].tcount);

        if self.would_flip(&target, i0, i1, &mut scratch.keep)
            || self.would_flip(&target, i1, i0, &mut scratch.other)
        {
            return false;
        }

        let merged = self.vertices[i0].quadric + self.vertices[i1].quadric;
        self.vertices[i0].position = target;
        self.vertices[i0].quadric = merged;

        let tstart = self.refs.len();
        self.apply_collapse(i0, i0, &scratch.keep, deleted);
        self.apply_collapse(i0, i1, &scratch.other, deleted);
        let tcount = self.refs.len() - tstart;

        let v0 = &mut self.vertices[i0];
        if tcount <= v0.tcount {
            // Reuse the old window and give the tail back.
            self.refs.copy_within(tstart.., v0.tstart);
            self.refs.truncate(tstart);
        } else {
            v0.tstart = tstart;
        }
        v0.tcount = tcount;

        true
    }
}
