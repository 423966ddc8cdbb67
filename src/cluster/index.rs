//! Per-cluster nearest-point search.
//!
//! Each non-empty cluster gets one k-d tree, built once before any element is
//! queried and shared read-only by every worker afterwards.

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::database::PointCloud;

/// Closest point of one cluster to a query position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub distance: f64,
    pub point_index: usize,             // Position of the point in the cluster's cloud
}

/// k-d tree over the points of a single non-empty cluster.
pub struct ClusterIndex {
    tree: ImmutableKdTree<f64, 3>,
}

impl ClusterIndex {
    /// Returns `None` for an empty point set: such a cluster is absent.
    pub fn build(points: &[[f64; 3]]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let tree = ImmutableKdTree::new_from_slice(points);
        Some(ClusterIndex { tree })
    }

    pub fn nearest(&self, query: &[f64; 3]) -> Nearest {
        let found = self.tree.nearest_one::<SquaredEuclidean>(query);
        Nearest {
            distance: found.distance.sqrt(),
            point_index: found.item as usize,
        }
    }
}

/// One slot per discovered cluster, in discovery order. Slot `i` is cluster id
/// `i + 1`; empty clusters keep their slot (and their id) but hold no index.
pub struct ClusterRegistry {
    clusters: Vec<Option<ClusterIndex>>,
}

impl ClusterRegistry {
    pub fn build(clouds: &[PointCloud]) -> Self {
        let clusters: Vec<Option<ClusterIndex>> = clouds
            .par_iter()
            .map(|cloud| {
                let index = ClusterIndex::build(&cloud.points);
                if index.is_none() {
                    debug!(cluster = %cloud.name, "empty cluster, never matched");
                }
                index
            })
            .collect();

        let registry = ClusterRegistry { clusters };
        info!(
            clusters = registry.len(),
            active = registry.active_count(),
            "built cluster indices"
        );
        registry
    }

    /// Number of clusters, absent ones included.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.clusters.iter().filter(|c| c.is_some()).count()
    }

    /// Non-absent clusters with their 1-based ids, in discovery order.
    pub fn active(&self) -> impl Iterator<Item = (usize, &ClusterIndex)> + '_ {
        self.clusters
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|index| (i + 1, index)))
    }
}
