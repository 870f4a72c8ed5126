//! Error types for whittle.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building, loading, or saving a mesh.
///
/// Simplification itself never fails; see [`crate::simplify::SimplifyReport`].
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no triangles.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A triangle references a vertex id outside the vertex array.
    #[error("triangle {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The triangle index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A slot beyond the declared vertex or triangle count was written.
    #[error("{kind} index {index} is out of range (count is {len})")]
    IndexOutOfRange {
        /// Which array was addressed ("vertex" or "triangle").
        kind: &'static str,
        /// The requested slot.
        index: usize,
        /// The declared count.
        len: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn load_error<P: Into<PathBuf>>(path: P, message: impl Into<String>) -> Self {
        MeshError::LoadError {
            path: path.into(),
            message: message.into(),
        }
    }
}
