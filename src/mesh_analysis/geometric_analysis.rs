use crate::database::*; // import Node, Element, TETRA_NODES
use crate::error::*;    // import ElementError

/// Geometry routines on tetrahedral elements.
pub struct GeometricAnalysis;

impl GeometricAnalysis {
    /// Centroid of a tetrahedron: the componentwise mean of its 4 node coordinates.
    ///
    /// Fails with [`ElementError::InvalidNodeCount`] unless the element has exactly
    /// 4 distinct node ids, and with [`ElementError::NodeOutOfRange`] if an id does
    /// not resolve into `nodes`.
    pub fn element_centroid(element: &Element, nodes: &[Node]) -> Result<[f64; 3], ElementError> {
        if element.nodes.len() != TETRA_NODES {
            return Err(ElementError::InvalidNodeCount {
                element_id: element.id,
                found: element.nodes.len(),
            });
        }

        let mut sum = [0.0; 3];
        for &node_id in &element.nodes {
            let node = Self::node_by_id(node_id, nodes).ok_or(ElementError::NodeOutOfRange {
                element_id: element.id,
                node_id,
                num_nodes: nodes.len(),
            })?;
            for (acc, c) in sum.iter_mut().zip(node.coordinates) {
                *acc += c;
            }
        }

        Ok(sum.map(|s| s / TETRA_NODES as f64))
    }

    /// Node ids are 1-based and positional: node `id` is stored at `id - 1`.
    pub fn node_by_id(node_id: usize, nodes: &[Node]) -> Option<&Node> {
        node_id.checked_sub(1).and_then(|index| nodes.get(index))
    }

    /// Euclidean distance between two points.
    pub fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(p, q)| (p - q) * (p - q))
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // helper: 3D node
    fn create_node(id: usize, x: f64, y: f64, z: f64) -> Node {
        Node { id, coordinates: [x, y, z] }
    }

    fn unit_tetra_nodes() -> Vec<Node> {
        vec![
            create_node(1, 0.0, 0.0, 0.0),
            create_node(2, 4.0, 0.0, 0.0),
            create_node(3, 0.0, 4.0, 0.0),
            create_node(4, 0.0, 0.0, 4.0),
        ]
    }

    fn assert_close(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-12, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn centroid_is_mean_of_corners() {
        let nodes = unit_tetra_nodes();
        let element = Element { id: 1, nodes: vec![1, 2, 3, 4] };

        let centroid = GeometricAnalysis::element_centroid(&element, &nodes).unwrap();
        assert_close(centroid, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn centroid_ignores_node_order() {
        let nodes = vec![
            create_node(1, 0.3, -1.2, 7.0),
            create_node(2, 2.9, 0.4, -3.3),
            create_node(3, -5.1, 8.8, 0.25),
            create_node(4, 1.0, 1.0, 1.0),
        ];
        let reference = GeometricAnalysis::element_centroid(
            &Element { id: 1, nodes: vec![1, 2, 3, 4] },
            &nodes,
        )
        .unwrap();

        for order in [[4, 3, 2, 1], [2, 4, 1, 3], [3, 1, 4, 2]] {
            let element = Element { id: 1, nodes: order.to_vec() };
            let centroid = GeometricAnalysis::element_centroid(&element, &nodes).unwrap();
            assert_close(centroid, reference);
        }
    }

    #[test]
    fn centroid_of_collapsed_record() {
        let nodes = vec![
            create_node(1, 1.0, 0.0, 0.0),
            create_node(2, -1.0, 0.0, 0.0),
            create_node(3, 0.0, 1.0, 0.0),
            create_node(4, 0.0, -1.0, 0.0),
        ];
        let element = Element::from_raw_slots(1, &[1, 1, 2, 2, 3, 3, 4, 4]);

        let centroid = GeometricAnalysis::element_centroid(&element, &nodes).unwrap();
        assert_close(centroid, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn wrong_node_count_is_invalid_geometry() {
        let nodes = unit_tetra_nodes();

        let triangle = Element { id: 9, nodes: vec![1, 2, 3] };
        assert_eq!(
            GeometricAnalysis::element_centroid(&triangle, &nodes),
            Err(ElementError::InvalidNodeCount { element_id: 9, found: 3 })
        );

        let five = Element { id: 10, nodes: vec![1, 2, 3, 4, 5] };
        assert_eq!(
            GeometricAnalysis::element_centroid(&five, &nodes),
            Err(ElementError::InvalidNodeCount { element_id: 10, found: 5 })
        );
    }

    #[test]
    fn unresolvable_node_id_is_reported() {
        let nodes = unit_tetra_nodes();

        let element = Element { id: 3, nodes: vec![1, 2, 3, 12] };
        assert_eq!(
            GeometricAnalysis::element_centroid(&element, &nodes),
            Err(ElementError::NodeOutOfRange { element_id: 3, node_id: 12, num_nodes: 4 })
        );

        let element = Element { id: 4, nodes: vec![0, 1, 2, 3] };
        assert!(matches!(
            GeometricAnalysis::element_centroid(&element, &nodes),
            Err(ElementError::NodeOutOfRange { node_id: 0, .. })
        ));
    }

    #[test]
    fn distance_is_euclidean() {
        assert!((GeometricAnalysis::distance(&[0.0, 0.0, 0.0], &[1.0, 2.0, 2.0]) - 3.0).abs() < 1e-12);
        assert_eq!(GeometricAnalysis::distance(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]), 0.0);
    }
}
