use std::fs;
use std::path::Path;

use tracing::info;
use vtkio::model::*; // import model definition of a VTK file

use crate::database::{Assignment, AssignmentReport, Element, MeshData, TETRA_NODES};
use crate::error::WriterError;

/// Writes assigned tetrahedra as a VTK XML unstructured grid (.vtu).
pub struct VTUWriter;

impl VTUWriter {

    /// All mesh nodes become points; every assigned element becomes a `Tetra`
    /// cell carrying `ClusterId`, `ClusterDistance` and `NearestPoint` cell data. Excluded
    /// elements are left out.
    pub fn write_assignment_vtu(
        mesh_data: &MeshData,
        report: &AssignmentReport,
        output_path: &Path,
    ) -> Result<(), WriterError> {

        let mut vtu = Vec::new();

        // 1. Prepare points data (node `id` sits at point index `id - 1`)
        let points_data: Vec<f64> = mesh_data
            .nodes
            .iter()
            .flat_map(|node| node.coordinates)
            .collect();

        let num_cells = report.assignments.len();
        let mut connectivity = Vec::with_capacity(num_cells * TETRA_NODES);
        let mut offsets = Vec::with_capacity(num_cells);
        let mut cluster_ids = Vec::with_capacity(num_cells);
        let mut distances = Vec::with_capacity(num_cells);
        let mut nearest_points = Vec::with_capacity(num_cells);
        let mut current_offset = 0;

        // 2. Connectivity and cell data, one cell per assignment in report order
        for assignment in &report.assignments {
            let element = Self::assigned_element(mesh_data, assignment)?;
            for &node_id in &element.nodes {
                connectivity.push(Self::point_index(node_id, mesh_data.nodes.len(), element.id)?);
            }
            current_offset += element.nodes.len() as u64;
            offsets.push(current_offset);
            cluster_ids.push(assignment.cluster_id as u32);
            distances.push(assignment.distance);
            nearest_points.push(assignment.nearest_point as u64);
        }

        let cell_types = vec![CellType::Tetra; offsets.len()];

        Vtk {
            version: Version { major: 2, minor: 2 },
            title: String::new(),
            byte_order: ByteOrder::LittleEndian,
            file_path: None,
            data: DataSet::inline(UnstructuredGridPiece {
                points: IOBuffer::F64(points_data),
                cells: Cells {
                    cell_verts: VertexNumbers::XML {
                        connectivity,
                        offsets,
                    },
                    types: cell_types,
                },
                data: Attributes {
                    point: Vec::new(),
                    cell: vec![
                        Attribute::scalars("ClusterId", 1).with_data(IOBuffer::U32(cluster_ids)),
                        Attribute::scalars("ClusterDistance", 1).with_data(IOBuffer::F64(distances)),
                        Attribute::scalars("NearestPoint", 1).with_data(IOBuffer::U64(nearest_points)),
                    ],
                },
            }),
        }.write_xml(&mut vtu)?;

        // Write the vector to file
        fs::write(output_path, &vtu)?;
        info!(path = %output_path.display(), cells = num_cells, "wrote VTU file");

        Ok(())
    }

    // The element an assignment was computed for, checked to be a tetrahedron
    fn assigned_element<'a>(mesh_data: &'a MeshData, assignment: &Assignment) -> Result<&'a Element, WriterError> {
        let element = mesh_data
            .elements
            .get(assignment.element_index)
            .filter(|element| element.id == assignment.element_id)
            .ok_or_else(|| WriterError::InvalidData(format!(
                "assignment for element {} does not match mesh position {}",
                assignment.element_id, assignment.element_index
            )))?;

        if element.nodes.len() != TETRA_NODES {
            return Err(WriterError::InvalidData(format!(
                "element {} has {} nodes, cannot write a tetrahedron",
                element.id,
                element.nodes.len()
            )));
        }
        Ok(element)
    }

    // Node ids are 1-based; VTK point indices are 0-based
    fn point_index(node_id: usize, num_nodes: usize, element_id: usize) -> Result<u64, WriterError> {
        node_id
            .checked_sub(1)
            .filter(|&index| index < num_nodes)
            .map(|index| index as u64)
            .ok_or_else(|| WriterError::InvalidData(format!(
                "element {} references node {} outside the mesh",
                element_id, node_id
            )))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::AssignmentEngine;
    use crate::cluster::ClusterRegistry;
    use crate::database::{Node, PointCloud};

    fn sample_mesh() -> MeshData {
        let nodes = vec![
            Node { id: 1, coordinates: [0.0, 0.0, 0.0] },
            Node { id: 2, coordinates: [1.0, 0.0, 0.0] },
            Node { id: 3, coordinates: [0.0, 1.0, 0.0] },
            Node { id: 4, coordinates: [0.0, 0.0, 1.0] },
            Node { id: 5, coordinates: [1.0, 1.0, 1.0] },
        ];
        let elements = vec![
            Element { id: 10, nodes: vec![1, 2, 3, 4] },
            Element { id: 11, nodes: vec![2, 3, 4] },
            Element { id: 12, nodes: vec![2, 3, 4, 5] },
        ];
        MeshData { num_nodes: 5, num_elements: 3, nodes, elements }
    }

    #[test]
    fn writes_cluster_cell_data() {
        let report = AssignmentReport {
            assignments: vec![
                Assignment { element_index: 0, element_id: 10, cluster_id: 1, distance: 0.5, nearest_point: 3 },
                Assignment { element_index: 2, element_id: 12, cluster_id: 2, distance: 0.25, nearest_point: 0 },
            ],
            excluded: Vec::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusters.vtu");

        VTUWriter::write_assignment_vtu(&sample_mesh(), &report, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("UnstructuredGrid"));
        assert!(content.contains("ClusterId"));
        assert!(content.contains("ClusterDistance"));
        assert!(content.contains("NearestPoint"));
    }

    #[test]
    fn duplicate_element_ids_write_the_assigned_cell() {
        let mut mesh = sample_mesh();
        mesh.elements = vec![
            Element { id: 5, nodes: vec![1, 2, 3, 4] },
            Element { id: 5, nodes: vec![0, 1, 2, 3] },
        ];
        mesh.num_elements = 2;
        let registry = ClusterRegistry::build(&[PointCloud::new("a.ply", vec![[0.0, 0.0, 0.0]])]);

        let report = AssignmentEngine::assign(&mesh, &registry);
        assert_eq!(report.assignments.len(), 1);
        assert_eq!(report.assignments[0].element_index, 0);
        assert_eq!(report.excluded.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.vtu");
        VTUWriter::write_assignment_vtu(&mesh, &report, &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("UnstructuredGrid"));
    }

    #[test]
    fn mismatched_assignment_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.vtu");
        let stale = |element_index, element_id| AssignmentReport {
            assignments: vec![Assignment { element_index, element_id, cluster_id: 1, distance: 0.0, nearest_point: 0 }],
            excluded: Vec::new(),
        };

        for report in [stale(7, 10), stale(1, 10), stale(1, 11)] {
            let err = VTUWriter::write_assignment_vtu(&sample_mesh(), &report, &path).unwrap_err();
            assert!(matches!(err, WriterError::InvalidData(_)), "{err}");
        }
        assert!(!path.exists());
    }

    #[test]
    fn node_outside_the_mesh_is_an_error() {
        let mut mesh = sample_mesh();
        mesh.elements[0].nodes = vec![0, 1, 2, 3];
        let report = AssignmentReport {
            assignments: vec![Assignment { element_index: 0, element_id: 10, cluster_id: 1, distance: 0.0, nearest_point: 0 }],
            excluded: Vec::new(),
        };
        let dir = tempfile::tempdir().unwrap();

        let err = VTUWriter::write_assignment_vtu(&mesh, &report, &dir.path().join("x.vtu")).unwrap_err();
        assert!(err.to_string().contains("node 0"));
    }
}
