// src/error.rs

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the `nodes.txt` mesh file.
/// Any of these aborts the run: a corrupt mesh leaves the stream misaligned.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),                     // File I/O errors (e.g., file not found)

    #[error("format error: {0}")]
    FormatError(String),                            // Malformed structure (missing lines, short records, bad ids)

    #[error("number parse error: {0}")]
    NumberParseError(String),                       // Failed number conversions (invalid float/int strings)
}

impl ParseError {
    /// True when the mesh file itself could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ParseError::IoError(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

/// Per-element failures. These never abort a run; the element is excluded
/// from the results and a diagnostic is emitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementError {
    #[error("element {element_id} has {found} distinct nodes, expected 4")]
    InvalidNodeCount { element_id: usize, found: usize },

    #[error("element {element_id} references node {node_id}, but the mesh has {num_nodes} nodes")]
    NodeOutOfRange { element_id: usize, node_id: usize, num_nodes: usize },

    #[error("element {element_id} has no non-empty cluster to match against")]
    NoCluster { element_id: usize },
}

impl ElementError {
    pub fn element_id(&self) -> usize {
        match self {
            ElementError::InvalidNodeCount { element_id, .. }
            | ElementError::NodeOutOfRange { element_id, .. }
            | ElementError::NoCluster { element_id } => *element_id,
        }
    }
}

/// Errors raised while discovering and loading the cluster point clouds.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("partition directory {} does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse PLY file {}: {details}", .path.display())]
    PlyError { path: PathBuf, details: String },
}

/// Writer errors for output operations
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("invalid output data: {0}")]
    InvalidData(String),

    #[error("VTK error: {0}")]
    VtkError(String),
}

impl From<vtkio::Error> for WriterError {
    fn from(err: vtkio::Error) -> Self {
        WriterError::VtkError(format!("{:?}", err))
    }
}

/// Top-level error for a whole run.
#[derive(Debug, Error)]
pub enum MeshClusterError {
    #[error("mesh file: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("output: {0}")]
    Writer(#[from] WriterError),

    #[error("worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
