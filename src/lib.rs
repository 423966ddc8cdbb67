// src/lib.rs

//! Assigns every tetrahedral element of a `nodes.txt` mesh to the nearest of a
//! set of point-cloud clusters (one `.ply` file per cluster), measured from the
//! element centroid to the closest cluster point.

pub mod error;
pub mod database;
pub mod parser;
pub mod mesh_analysis;
pub mod cluster;
pub mod assignment;
pub mod writer;
pub mod pipeline;

pub use assignment::AssignmentEngine;
pub use cluster::{ClusterIndex, ClusterRegistry};
pub use database::{Assignment, AssignmentReport, Element, MeshData, Node, PointCloud};
pub use error::{ClusterError, ElementError, MeshClusterError, ParseError, WriterError};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
