use std::path::PathBuf;

use crate::error::ElementError;

/// Number of distinct nodes a linear tetrahedron must reference.
pub const TETRA_NODES: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {                       // Defines a structure to represent a mesh node/vertex
    pub id: usize,                      // 1-based identifier, equal to its position in the file plus one
    pub coordinates: [f64; 3],          // Spatial coordinates x, y, z
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {                    // Defines a structure to represent a mesh element
    pub id: usize,                      // Element identifier as written in the mesh file
    pub nodes: Vec<usize>,              // Distinct node ids, in order of first appearance
}

impl Element {
    /// Builds an element from the raw connectivity slots of a record.
    /// Repeated ids are dropped, keeping the first occurrence.
    pub fn from_raw_slots(id: usize, slots: &[usize]) -> Self {
        let mut nodes = Vec::with_capacity(TETRA_NODES);
        for &node_id in slots {
            if !nodes.contains(&node_id) {
                nodes.push(node_id);
            }
        }
        Element { id, nodes }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {                   // Defines a structure to represent a mesh
    pub num_nodes: usize,               // Node count declared on the header line
    pub num_elements: usize,            // Element count declared on the header line
    pub nodes: Vec<Node>,               // All nodes with their coordinates
    pub elements: Vec<Element>,         // All elements with their connectivity
}

/// One cluster: the point set of a single partition file.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub name: String,                   // File name the cloud was read from
    pub source: PathBuf,                // Full path of that file
    pub points: Vec<[f64; 3]>,          // Vertex positions
}

impl PointCloud {
    pub fn new(name: impl Into<String>, points: Vec<[f64; 3]>) -> Self {
        let name = name.into();
        PointCloud { source: PathBuf::from(&name), name, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// An empty cloud is an absent cluster and never wins an assignment.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Winning cluster for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub element_index: usize,           // Position of the element in `MeshData::elements`
    pub element_id: usize,
    pub cluster_id: usize,              // 1-based position of the cluster in discovery order
    pub distance: f64,                  // Centroid to nearest cluster point
    pub nearest_point: usize,           // Index of that point within the cluster's cloud
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedElement {
    pub element_id: usize,
    pub reason: ElementError,
}

/// Result of one assignment pass. `assignments` keeps the input element order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentReport {
    pub assignments: Vec<Assignment>,
    pub excluded: Vec<ExcludedElement>,
}

impl AssignmentReport {
    /// The `(element_id, cluster_id)` pairs, in input element order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.assignments
            .iter()
            .map(|a| (a.element_id, a.cluster_id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
