use super::ids::{DimerId, MoleculeId};
use super::lattice::LatticeDisplacement;
use nalgebra::Vector3;

/// A numbered pair of molecules, the second translated by a lattice displacement.
///
/// The assembled coordinates are `molecule_1 ++ (molecule_2 + cartesian_displacement)`,
/// all shifted by `recentering`, which is always a whole-lattice translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimer {
    pub id: DimerId,
    pub molecule_1: MoleculeId,
    pub molecule_2: MoleculeId,
    pub displacement: LatticeDisplacement,
    pub cartesian_displacement: Vector3<f64>,
    pub recentering_shift: LatticeDisplacement,
    pub recentering: Vector3<f64>,
    /// `None` when the dimer was reloaded from a ledger without re-scoring.
    pub distance: Option<f64>,
}

impl Dimer {
    /// Identity of a dimer independent of its number.
    pub fn key(&self) -> (MoleculeId, MoleculeId, LatticeDisplacement) {
        (self.molecule_1, self.molecule_2, self.displacement)
    }
}
