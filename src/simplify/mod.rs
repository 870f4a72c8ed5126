//! Mesh simplification by iterative edge collapse.
//!
//! This module reduces the triangle count of a mesh while preserving its
//! overall shape, using quadric error metrics (Garland & Heckbert, 1997) to
//! score edge collapses.
//!
//! # Algorithm
//!
//! Rather than keeping a priority queue, the simplifier sweeps over all
//! triangles repeatedly with a growing error threshold:
//!
//! 1. Every few sweeps the reference table is rebuilt (the first rebuild
//!    also classifies border vertices and initializes quadrics).
//! 2. Each sweep uses `threshold = 1e-9 * (iteration + 3)^aggressiveness`,
//!    so early sweeps only remove edges that cost almost nothing.
//! 3. A triangle whose cheapest edge is under the threshold tries its edges
//!    in order and collapses at most one of them, moving the first endpoint
//!    onto the second.
//! 4. Collapses that would mix border and interior vertices, fold a triangle,
//!    or create a sliver are rejected.
//! 5. The loop stops once the target is met or after the iteration cap, and
//!    the mesh is compacted exactly once.
//!
//! The scan order is fixed and nothing is randomized, so a given input,
//! target and aggressiveness always produce the same output.
//!
//! # Example
//!
//! ```
//! use whittle::mesh::Mesh;
//! use whittle::simplify::{simplify, SimplifyOptions};
//! use nalgebra::Point3;
//!
//! let vertices: Vec<_> = (0..=4)
//!     .flat_map(|j| (0..=4).map(move |i| Point3::new(i as f64, j as f64, 0.0)))
//!     .collect();
//! let mut faces = Vec::new();
//! for j in 0..4 {
//!     for i in 0..4 {
//!         let v = j * 5 + i;
//!         faces.push([v, v + 1, v + 6]);
//!         faces.push([v, v + 6, v + 5]);
//!     }
//! }
//! let mut mesh = Mesh::from_triangles(&vertices, &faces).unwrap();
//!
//! let report = simplify(&mut mesh, &SimplifyOptions::with_target_ratio(0.5));
//! assert!(report.final_triangles < 32);
//! ```

mod collapse;

use std::fmt;

use log::{debug, info};

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;
use crate::progress::Progress;

use collapse::CollapseScratch;

/// Default exponent of the threshold schedule.
pub const DEFAULT_AGGRESSIVENESS: f64 = 7.0;

/// Default cap on the number of sweeps.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default number of sweeps between reference-table rebuilds.
pub const DEFAULT_REBUILD_INTERVAL: usize = 5;

/// Options for mesh simplification.
#[derive(Debug, Clone)]
pub struct SimplifyOptions {
    /// Target number of triangles.
    /// If None, uses `target_ratio` instead.
    pub target_triangles: Option<usize>,

    /// Target ratio of triangles to keep (0.0 to 1.0).
    /// Only used if `target_triangles` is None.
    pub target_ratio: f64,

    /// Exponent controlling how fast the error threshold grows per sweep.
    /// 5 to 8 works well; higher values reach the target in fewer sweeps at
    /// some cost in quality.
    pub aggressiveness: f64,

    /// Maximum number of sweeps before giving up on the target.
    pub max_iterations: usize,

    /// Number of sweeps between reference-table rebuilds.
    pub rebuild_interval: usize,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            target_triangles: None,
            target_ratio: 0.5,
            aggressiveness: DEFAULT_AGGRESSIVENESS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            rebuild_interval: DEFAULT_REBUILD_INTERVAL,
        }
    }
}

impl SimplifyOptions {
    /// Create options to reduce to a target number of triangles.
    pub fn with_target_triangles(target: usize) -> Self {
        Self {
            target_triangles: Some(target),
            ..Default::default()
        }
    }

    /// Create options to reduce to a ratio of the original triangle count.
    pub fn with_target_ratio(ratio: f64) -> Self {
        Self {
            target_ratio: ratio.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Set the threshold growth exponent.
    pub fn with_aggressiveness(mut self, aggressiveness: f64) -> Self {
        self.aggressiveness = aggressiveness;
        self
    }

    /// Set the sweep cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Compute the target number of triangles given the original count.
    pub fn compute_target(&self, original_triangles: usize) -> usize {
        if let Some(target) = self.target_triangles {
            target.min(original_triangles)
        } else {
            ((original_triangles as f64) * self.target_ratio).round() as usize
        }
    }

    /// Check that the options describe a runnable schedule.
    pub fn validate(&self) -> Result<()> {
        if !self.aggressiveness.is_finite() || self.aggressiveness < 0.0 {
            return Err(MeshError::invalid_param(
                "aggressiveness",
                self.aggressiveness,
                "must be finite and non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.target_ratio) {
            return Err(MeshError::invalid_param(
                "target_ratio",
                self.target_ratio,
                "must be between 0 and 1",
            ));
        }
        if self.rebuild_interval == 0 {
            return Err(MeshError::invalid_param(
                "rebuild_interval",
                self.rebuild_interval,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Error threshold for sweep `iteration`.
    pub fn threshold(&self, iteration: usize) -> f64 {
        1e-9 * ((iteration + 3) as f64).powf(self.aggressiveness)
    }
}

/// Why the sweep loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The live triangle count reached the target.
    TargetReached,
    /// The sweep cap ran out first; the partial result is kept.
    IterationLimitReached,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::TargetReached => write!(f, "target reached"),
            Termination::IterationLimitReached => write!(f, "iteration limit reached"),
        }
    }
}

/// Summary of a simplification run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifyReport {
    /// Live triangles before simplification.
    pub original_triangles: usize,
    /// Triangles after compaction.
    pub final_triangles: usize,
    /// Vertices before simplification.
    pub original_vertices: usize,
    /// Vertices after compaction.
    pub final_vertices: usize,
    /// The triangle count the run aimed for.
    pub target_triangles: usize,
    /// Number of accepted edge collapses.
    pub collapses: usize,
    /// Number of sweeps performed.
    pub iterations: usize,
    /// Why the loop stopped.
    pub termination: Termination,
}

impl SimplifyReport {
    /// Get the reduction ratio (final / original).
    pub fn reduction_ratio(&self) -> f64 {
        if self.original_triangles == 0 {
            1.0
        } else {
            self.final_triangles as f64 / self.original_triangles as f64
        }
    }

    /// Get the percentage of triangles removed.
    pub fn reduction_percent(&self) -> f64 {
        (1.0 - self.reduction_ratio()) * 100.0
    }

    /// Check whether any edge was collapsed.
    pub fn was_simplified(&self) -> bool {
        self.collapses > 0
    }
}

impl fmt::Display for SimplifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Simplified: {} -> {} triangles ({:.1}% reduction, {} collapses, {} iterations, {})",
            self.original_triangles,
            self.final_triangles,
            self.reduction_percent(),
            self.collapses,
            self.iterations,
            self.termination
        )
    }
}

/// Simplify `mesh` in place.
///
/// The mesh is always compacted before returning, whether or not the target
/// was reached.
pub fn simplify(mesh: &mut Mesh, options: &SimplifyOptions) -> SimplifyReport {
    simplify_with_progress(mesh, options, &Progress::none())
}

/// Simplify `mesh` in place, reporting once per sweep.
pub fn simplify_with_progress(
    mesh: &mut Mesh,
    options: &SimplifyOptions,
    progress: &Progress,
) -> SimplifyReport {
    debug_assert!(mesh.validate().is_ok());

    let original_triangles = mesh.num_live_triangles();
    let original_vertices = mesh.num_vertices();
    let target = options.compute_target(original_triangles);
    let rebuild_interval = options.rebuild_interval.max(1);
    let total = options.max_iterations;

    let mut scratch = CollapseScratch::default();
    let mut deleted = 0;
    let mut collapses = 0;
    let mut iterations = 0;
    let live = |deleted: usize| original_triangles.saturating_sub(deleted);

    for iteration in 0..options.max_iterations {
        if live(deleted) <= target {
            break;
        }
        progress.report(iteration, total, "Collapsing edges");

        if iteration % rebuild_interval == 0 {
            if iteration > 0 {
                mesh.drop_deleted_triangles();
            }
            mesh.rebuild_adjacency(iteration == 0);
        }

        for t in &mut mesh.triangles {
            t.dirty = false;
        }

        let threshold = options.threshold(iteration);
        debug!(
            "iteration {}: threshold {:.3e}, {} live triangles",
            iteration,
            threshold,
            live(deleted)
        );
        iterations = iteration + 1;

        for tid in 0..mesh.triangles.len() {
            let t = &mesh.triangles[tid];
            if t.deleted || t.dirty || !(t.min_error <= threshold) {
                continue;
            }

            for j in 0..3 {
                let t = &mesh.triangles[tid];
                let error = t.errors[j];
                if !(error.is_finite() && error < threshold) {
                    continue;
                }
                let i0 = t.indices[j];
                let i1 = t.indices[(j + 1) % 3];
                if mesh.collapse_edge(i0, i1, &mut scratch, &mut deleted) {
                    collapses += 1;
                    break;
                }
            }

            if live(deleted) <= target {
                break;
            }
        }
    }

    let termination = if live(deleted) <= target {
        Termination::TargetReached
    } else {
        Termination::IterationLimitReached
    };

    progress.report(total, total, "Compacting");
    mesh.compact();

    let report = SimplifyReport {
        original_triangles,
        final_triangles: mesh.num_triangles(),
        original_vertices,
        final_vertices: mesh.num_vertices(),
        target_triangles: target,
        collapses,
        iterations,
        termination,
    };
    info!("{}", report);
    report
}

impl Mesh {
    /// Simplify toward `target_triangles` with the given threshold exponent.
    ///
    /// Uses the default sweep cap and rebuild interval. See [`simplify`].
    pub fn simplify(&mut self, target_triangles: usize, aggressiveness: f64) -> SimplifyReport {
        let options =
            SimplifyOptions::with_target_triangles(target_triangles).with_aggressiveness(aggressiveness);
        simplify(self, &options)
    }
}
