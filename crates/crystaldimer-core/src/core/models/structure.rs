use super::element::Element;
use crate::core::utils::geometry;
use nalgebra::{Point3, Vector3};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use thiserror::Error;

/// Bond graph whose node `i` is atom `i`, weighted by its element.
pub type BondGraph = UnGraph<Element, ()>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Atom count mismatch: {elements} elements but {positions} positions")]
    LengthMismatch { elements: usize, positions: usize },
    #[error("Bond ({0}, {1}) references an atom outside the structure")]
    BondOutOfRange(usize, usize),
    #[error("Atom {0} is bonded to itself")]
    SelfBond(usize),
}

/// Atomic coordinates together with the covalent bond graph.
///
/// Used both for single molecules and for assembled dimers, which are the two
/// kinds of subject the equivalence pipeline compares.
#[derive(Debug, Clone)]
pub struct Structure {
    positions: Vec<Point3<f64>>,
    graph: BondGraph,
}

impl Structure {
    /// Builds a structure from parallel element/position lists and index-based bonds.
    ///
    /// Duplicate bonds are collapsed.
    pub fn new(
        elements: Vec<Element>,
        positions: Vec<Point3<f64>>,
        bonds: &[(usize, usize)],
    ) -> Result<Self, StructureError> {
        if elements.len() != positions.len() {
            return Err(StructureError::LengthMismatch {
                elements: elements.len(),
                positions: positions.len(),
            });
        }
        let mut graph = BondGraph::with_capacity(elements.len(), bonds.len());
        for element in elements {
            graph.add_node(element);
        }
        for &(a, b) in bonds {
            if a >= positions.len() || b >= positions.len() {
                return Err(StructureError::BondOutOfRange(a, b));
            }
            if a == b {
                return Err(StructureError::SelfBond(a));
            }
            graph.update_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }
        Ok(Self { positions, graph })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn element(&self, index: usize) -> &Element {
        &self.graph[NodeIndex::new(index)]
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.graph.node_weights()
    }

    pub fn position(&self, index: usize) -> &Point3<f64> {
        &self.positions[index]
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn graph(&self) -> &BondGraph {
        &self.graph
    }

    /// Bonds as atom-index pairs in edge insertion order.
    pub fn bonds(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
    }

    /// Positions of every non-hydrogen atom, in atom order.
    pub fn heavy_positions(&self) -> Vec<Point3<f64>> {
        self.positions
            .iter()
            .zip(self.elements())
            .filter(|(_, element)| !element.is_hydrogen())
            .map(|(position, _)| *position)
            .collect()
    }

    pub fn centroid(&self) -> Option<Point3<f64>> {
        geometry::centroid(&self.positions)
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            positions: self.positions.iter().map(|p| p + offset).collect(),
            graph: self.graph.clone(),
        }
    }

    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for position in &mut self.positions {
            *position += offset;
        }
    }

    /// Concatenates two structures; atoms of `other` follow those of `self`.
    pub fn concat(&self, other: &Structure) -> Self {
        let offset = self.len();
        let mut graph = self.graph.clone();
        for element in other.elements() {
            graph.add_node(element.clone());
        }
        for (a, b) in other.bonds() {
            graph.add_edge(NodeIndex::new(a + offset), NodeIndex::new(b + offset), ());
        }
        let mut positions = self.positions.clone();
        positions.extend_from_slice(&other.positions);
        Self { positions, graph }
    }
}
