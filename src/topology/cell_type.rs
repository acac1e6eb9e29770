//! Cell type metadata for mesh elements.

/// Cell types a UNV element block can describe.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Default)]
pub enum CellType {
    /// 0D vertex.
    #[default]
    Vertex,
    /// 1D segment/edge (rods and beams).
    Segment,
    /// 1D three-node edge (parabolic beam).
    QuadraticSegment,
    /// 2D simplex (triangle).
    Triangle,
    /// 2D six-node triangle.
    QuadraticTriangle,
    /// 2D tensor-product cell (quad).
    Quadrilateral,
    /// 2D eight-node quad.
    QuadraticQuadrilateral,
    /// 3D simplex (tet).
    Tetrahedron,
    /// 3D tensor-product cell (hex).
    Hexahedron,
    /// 3D wedge/prism.
    Prism,
    /// 3D pyramid.
    Pyramid,
    /// Element with `n` nodes that could not be mapped to a known shape.
    Unclassified(usize),
}

impl CellType {
    /// Returns the topological dimension of the cell, when known.
    pub fn dimension(self) -> Option<u8> {
        match self {
            CellType::Vertex => Some(0),
            CellType::Segment | CellType::QuadraticSegment => Some(1),
            CellType::Triangle
            | CellType::QuadraticTriangle
            | CellType::Quadrilateral
            | CellType::QuadraticQuadrilateral => Some(2),
            CellType::Tetrahedron | CellType::Hexahedron | CellType::Prism | CellType::Pyramid => {
                Some(3)
            }
            CellType::Unclassified(_) => None,
        }
    }

    /// Number of nodes in the connectivity.
    pub fn node_count(self) -> usize {
        match self {
            CellType::Vertex => 1,
            CellType::Segment => 2,
            CellType::QuadraticSegment | CellType::Triangle => 3,
            CellType::Quadrilateral | CellType::Tetrahedron => 4,
            CellType::Pyramid => 5,
            CellType::QuadraticTriangle | CellType::Prism => 6,
            CellType::QuadraticQuadrilateral | CellType::Hexahedron => 8,
            CellType::Unclassified(n) => n,
        }
    }

    /// VTK cell type code; `None` for unclassified elements.
    pub fn vtk_code(self) -> Option<u8> {
        match self {
            CellType::Vertex => Some(1),
            CellType::Segment => Some(3),
            CellType::Triangle => Some(5),
            CellType::Quadrilateral => Some(9),
            CellType::Tetrahedron => Some(10),
            CellType::Hexahedron => Some(12),
            CellType::Prism => Some(13),
            CellType::Pyramid => Some(14),
            CellType::QuadraticSegment => Some(21),
            CellType::QuadraticTriangle => Some(22),
            CellType::QuadraticQuadrilateral => Some(23),
            CellType::Unclassified(_) => None,
        }
    }

    /// Whether a UNV FE descriptor denotes a rod or beam. Their 2412 records
    /// may carry an orientation line before the connectivity.
    pub fn is_unv_beam_descriptor(descriptor: u32) -> bool {
        matches!(descriptor, 11 | 21 | 22 | 23 | 24)
    }

    /// Higher-order UNV descriptors without a mapping here (cubic shells,
    /// parabolic and cubic solids). Their node count says nothing reliable
    /// about the shape.
    fn is_unmapped_unv_descriptor(descriptor: u32) -> bool {
        matches!(
            descriptor,
            43 | 53 | 63 | 73 | 83 | 93 | 46 | 56 | 66 | 76 | 86 | 96 | 113 | 114 | 116 | 117
                | 118 | 119
        )
    }

    fn from_unv_descriptor(descriptor: u32) -> Option<CellType> {
        match descriptor {
            11 | 21 | 22 => Some(CellType::Segment),
            23 | 24 => Some(CellType::QuadraticSegment),
            41 | 51 | 61 | 71 | 81 | 91 => Some(CellType::Triangle),
            42 | 52 | 62 | 72 | 82 | 92 => Some(CellType::QuadraticTriangle),
            44 | 54 | 64 | 74 | 84 | 94 => Some(CellType::Quadrilateral),
            45 | 55 | 65 | 75 | 85 | 95 => Some(CellType::QuadraticQuadrilateral),
            111 => Some(CellType::Tetrahedron),
            112 => Some(CellType::Prism),
            115 => Some(CellType::Hexahedron),
            _ => None,
        }
    }

    /// Classify a UNV element.
    ///
    /// The FE descriptor decides when it agrees with the node count. Unmapped
    /// higher-order descriptors yield [`CellType::Unclassified`]. Otherwise
    /// the linear shape with that node count is used. Never fails; shapes
    /// nothing can describe come back unclassified.
    pub fn from_unv(descriptor: Option<u32>, node_count: usize) -> CellType {
        if let Some(d) = descriptor {
            match Self::from_unv_descriptor(d) {
                Some(ct) if ct.node_count() == node_count => return ct,
                None if Self::is_unmapped_unv_descriptor(d) => {
                    return CellType::Unclassified(node_count);
                }
                _ => {}
            }
        }
        Self::from_node_count(node_count)
    }

    fn from_node_count(node_count: usize) -> CellType {
        match node_count {
            1 => CellType::Vertex,
            2 => CellType::Segment,
            3 => CellType::Triangle,
            4 => CellType::Tetrahedron,
            5 => CellType::Pyramid,
            6 => CellType::Prism,
            8 => CellType::Hexahedron,
            n => CellType::Unclassified(n),
        }
    }

    /// Permute a UNV connectivity list into VTK node order.
    ///
    /// UNV lists higher-order nodes corner, midside, corner, ...; VTK lists
    /// all corners first. Linear cells are left untouched.
    pub fn unv_to_vtk_order(self, conn: &mut [usize]) {
        let order: &[usize] = match self {
            CellType::QuadraticSegment => &[0, 2, 1],
            CellType::QuadraticTriangle => &[0, 2, 4, 1, 3, 5],
            CellType::QuadraticQuadrilateral => &[0, 2, 4, 6, 1, 3, 5, 7],
            _ => return,
        };
        if conn.len() != order.len() {
            return;
        }
        let unv = conn.to_vec();
        for (dst, &src) in conn.iter_mut().zip(order) {
            *dst = unv[src];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_wins_over_node_count() {
        assert_eq!(CellType::from_unv(Some(94), 4), CellType::Quadrilateral);
        assert_eq!(CellType::from_unv(Some(111), 4), CellType::Tetrahedron);
        assert_eq!(CellType::from_unv(None, 4), CellType::Tetrahedron);
    }

    #[test]
    fn mismatched_descriptor_falls_back_to_node_count() {
        assert_eq!(CellType::from_unv(Some(91), 2), CellType::Segment);
        assert_eq!(CellType::from_unv(Some(115), 4), CellType::Tetrahedron);
        assert_eq!(CellType::from_unv(Some(999), 7), CellType::Unclassified(7));
    }

    #[test]
    fn parabolic_descriptors_are_quadratic() {
        assert_eq!(CellType::from_unv(Some(92), 6), CellType::QuadraticTriangle);
        assert_eq!(CellType::from_unv(Some(45), 8), CellType::QuadraticQuadrilateral);
        assert_eq!(CellType::from_unv(Some(24), 3), CellType::QuadraticSegment);
        assert_eq!(CellType::from_unv(Some(118), 10), CellType::Unclassified(10));
        assert_eq!(CellType::from_unv(Some(116), 8), CellType::Unclassified(8));
    }

    #[test]
    fn quadratic_nodes_reordered_corners_first() {
        let mut tri = [10, 11, 12, 13, 14, 15];
        CellType::QuadraticTriangle.unv_to_vtk_order(&mut tri);
        assert_eq!(tri, [10, 12, 14, 11, 13, 15]);
        let mut seg = [1, 2, 3];
        CellType::Segment.unv_to_vtk_order(&mut seg);
        assert_eq!(seg, [1, 2, 3]);
    }

    #[test]
    fn vtk_codes_match_node_counts() {
        assert_eq!(CellType::Hexahedron.vtk_code(), Some(12));
        assert_eq!(CellType::Hexahedron.node_count(), 8);
        assert_eq!(CellType::QuadraticTriangle.vtk_code(), Some(22));
        assert_eq!(CellType::Unclassified(7).vtk_code(), None);
        assert_eq!(CellType::Prism.dimension(), Some(3));
    }
}
