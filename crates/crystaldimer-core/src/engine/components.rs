use super::error::EngineError;
use crate::core::models::lattice::{Lattice, LatticeDisplacement};
use crate::core::models::structure::Structure;
use crate::core::topology::covalent::BondLengthTable;
use petgraph::unionfind::UnionFind;
use std::collections::BTreeSet;

/// Lattice shifts that carry each wrapped fragment of a molecule back onto
/// its unwrapped reference placement. Sorted, deduplicated, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedComponentPlacement {
    shifts: Vec<LatticeDisplacement>,
}

impl WrappedComponentPlacement {
    pub fn shifts(&self) -> &[LatticeDisplacement] {
        &self.shifts
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Placement of a molecule that is intact inside its reference cell.
    pub fn intact() -> Self {
        Self {
            shifts: vec![LatticeDisplacement::ZERO],
        }
    }
}

/// Splits a molecule into the fragments produced by wrapping it into the
/// reference cell and returns the shift of each fragment.
pub fn locate_placements(
    structure: &Structure,
    lattice: &Lattice,
    table: &impl BondLengthTable,
    integrality_tolerance: f64,
) -> Result<WrappedComponentPlacement, EngineError> {
    if structure.is_empty() {
        return Ok(WrappedComponentPlacement::intact());
    }

    let wrapped: Vec<_> = structure.positions().iter().map(|p| lattice.wrap(p)).collect();

    let mut components = UnionFind::<usize>::new(structure.len());
    for (a, b) in structure.bonds() {
        let length = (wrapped[a] - wrapped[b]).norm();
        if length <= table.max_bond_length(structure.element(a), structure.element(b)) {
            components.union(a, b);
        }
    }

    // Atom indices ascend, so the first atom seen per label is the lowest index.
    let mut seen_labels = BTreeSet::new();
    let mut shifts = BTreeSet::new();
    for atom in 0..structure.len() {
        if !seen_labels.insert(components.find(atom)) {
            continue;
        }
        let offset = structure.position(atom) - wrapped[atom];
        let fractional = lattice.to_fractional(&offset);
        let rounded = fractional.map(f64::round);
        if (fractional - rounded).amax() > integrality_tolerance {
            return Err(EngineError::NonIntegralDisplacement {
                context: format!("wrapped fragment starting at atom {}", atom),
                fractional: [fractional.x, fractional.y, fractional.z],
            });
        }
        shifts.insert(LatticeDisplacement::new(
            rounded.x as i32,
            rounded.y as i32,
            rounded.z as i32,
        ));
    }

    Ok(WrappedComponentPlacement {
        shifts: shifts.into_iter().collect(),
    })
}
