use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::cluster::ClusterRegistry;
use crate::database::*;
use crate::error::*;
use crate::mesh_analysis::geometric_analysis::GeometricAnalysis;

/// Maps every element to its nearest non-empty cluster.
pub struct AssignmentEngine;

impl AssignmentEngine {
    /// Assign all elements on the global rayon pool.
    ///
    /// Elements run independently; the indexed `collect` keeps the output in
    /// input element order. Failed elements are dropped from `assignments`,
    /// recorded in `excluded`, and logged once each.
    pub fn assign(mesh_data: &MeshData, registry: &ClusterRegistry) -> AssignmentReport {
        let start = Instant::now();

        let outcomes: Vec<Result<Assignment, ElementError>> = mesh_data
            .elements
            .par_iter()
            .enumerate()
            .map(|(element_index, element)| {
                Self::assign_element(element_index, element, &mesh_data.nodes, registry)
            })
            .collect();

        let mut report = AssignmentReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(assignment) => report.assignments.push(assignment),
                Err(reason) => {
                    warn!(element = reason.element_id(), "element skipped: {}", reason);
                    report.excluded.push(ExcludedElement {
                        element_id: reason.element_id(),
                        reason,
                    });
                }
            }
        }

        info!(
            elements = mesh_data.elements.len(),
            assigned = report.assignments.len(),
            excluded = report.excluded.len(),
            elapsed = ?start.elapsed(),
            "assignment finished"
        );
        report
    }

    /// Same as [`assign`](Self::assign) on a dedicated pool of `threads`
    /// workers; `0` sizes the pool to the number of CPUs.
    pub fn assign_with_threads(
        mesh_data: &MeshData,
        registry: &ClusterRegistry,
        threads: usize,
    ) -> Result<AssignmentReport, MeshClusterError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        info!(workers = pool.current_num_threads(), "dispatching elements");
        Ok(pool.install(|| Self::assign(mesh_data, registry)))
    }

    /// Nearest cluster for one element. Ties keep the cluster seen first.
    /// `element_index` is the element's position in the mesh, carried into
    /// the result so writers never have to look elements up by id.
    pub fn assign_element(
        element_index: usize,
        element: &Element,
        nodes: &[Node],
        registry: &ClusterRegistry,
    ) -> Result<Assignment, ElementError> {
        let centroid = GeometricAnalysis::element_centroid(element, nodes)?;

        let mut min_distance = f64::INFINITY;
        let mut closest_cluster = None;
        for (cluster_id, index) in registry.active() {
            let nearest = index.nearest(&centroid);
            if nearest.distance < min_distance {
                min_distance = nearest.distance;
                closest_cluster = Some((cluster_id, nearest.point_index));
            }
        }

        match closest_cluster {
            Some((cluster_id, nearest_point)) => Ok(Assignment {
                element_index,
                element_id: element.id,
                cluster_id,
                distance: min_distance,
                nearest_point,
            }),
            None => Err(ElementError::NoCluster { element_id: element.id }),
        }
    }
}
