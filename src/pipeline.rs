//! Whole-run orchestration: read the mesh, load the clusters, build the
//! indices, assign. Every fatal error surfaces before assignment starts.

use std::path::PathBuf;

use tracing::info;

use crate::assignment::AssignmentEngine;
use crate::cluster::ClusterRegistry;
use crate::database::*;
use crate::error::*;
use crate::parser::nodes_txt::NodesTxtParser;
use crate::parser::ply::{DiscoveryOrder, PlyCloudLoader, DEFAULT_EXTENSION};

pub const DEFAULT_MESH_FILE: &str = "nodes.txt";
pub const DEFAULT_PARTITIONS_DIR: &str = "Partitions";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub mesh_file: PathBuf,
    pub partitions_dir: PathBuf,
    pub extension: String,
    pub order: DiscoveryOrder,
    pub threads: usize,                 // 0 = one worker per CPU
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            mesh_file: PathBuf::from(DEFAULT_MESH_FILE),
            partitions_dir: PathBuf::from(DEFAULT_PARTITIONS_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            order: DiscoveryOrder::Sorted,
            threads: 0,
        }
    }
}

/// Everything a run produced, for reporting.
pub struct PipelineOutput {
    pub mesh_data: MeshData,
    pub registry: ClusterRegistry,
    pub report: AssignmentReport,
}

pub struct Pipeline;

impl Pipeline {
    pub fn load_mesh(config: &PipelineConfig) -> Result<MeshData, MeshClusterError> {
        let mesh_data = NodesTxtParser::parse_file(&config.mesh_file)?;
        info!(
            nodes = mesh_data.num_nodes,
            elements = mesh_data.num_elements,
            path = %config.mesh_file.display(),
            "parsed mesh"
        );
        Ok(mesh_data)
    }

    pub fn load_clusters(config: &PipelineConfig) -> Result<Vec<PointCloud>, MeshClusterError> {
        Ok(PlyCloudLoader::load_dir(&config.partitions_dir, &config.extension, config.order)?)
    }

    /// With no clusters there is nothing to match against: the report is
    /// empty and no worker pool is started.
    pub fn assign(
        config: &PipelineConfig,
        mesh_data: &MeshData,
        registry: &ClusterRegistry,
    ) -> Result<AssignmentReport, MeshClusterError> {
        if registry.is_empty() {
            info!("no clusters found, skipping assignment");
            return Ok(AssignmentReport::default());
        }
        AssignmentEngine::assign_with_threads(mesh_data, registry, config.threads)
    }

    pub fn run(config: &PipelineConfig) -> Result<PipelineOutput, MeshClusterError> {
        let mesh_data = Self::load_mesh(config)?;
        let clouds = Self::load_clusters(config)?;
        let registry = ClusterRegistry::build(&clouds);
        let report = Self::assign(config, &mesh_data, &registry)?;
        Ok(PipelineOutput { mesh_data, registry, report })
    }
}
