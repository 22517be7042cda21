//! Error types for mesh loading and export.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while reading a triangle soup or writing the result.
///
/// Topology problems are not errors: non-manifold edges are reported through
/// a [`DiagnosticSink`](crate::validate::DiagnosticSink) and processing continues.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The input mesh file could not be opened or read.
    #[error("cannot read input mesh {path}: {source}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OBJ output could not be created or written. Always fatal.
    #[error("cannot write OBJ output {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reader rejected the input file's contents.
    #[error("malformed input mesh {path}: {details}")]
    ParseError { path: PathBuf, details: String },

    /// Input extension is neither `.stl` nor `.obj`.
    #[error(
        "unsupported input extension {}: expected .stl or .obj",
        .extension.as_deref().unwrap_or("<none>")
    )]
    UnsupportedFormat { extension: Option<String> },

    /// Malformed configuration document.
    #[error("invalid configuration: {details}")]
    InvalidConfig { details: String },
}
