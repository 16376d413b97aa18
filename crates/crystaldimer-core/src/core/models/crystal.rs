use super::ids::MoleculeId;
use super::lattice::Lattice;
use super::molecule::Molecule;
use super::symmetry::SymmetryOperation;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CrystalError {
    #[error("Duplicate molecule id: {0}")]
    DuplicateMolecule(MoleculeId),
    #[error("Molecule ids must be positive (found 0)")]
    ZeroMoleculeId,
}

/// A periodic structure already decomposed into bonded molecules.
#[derive(Debug, Clone)]
pub struct Crystal {
    lattice: Lattice,
    molecules: BTreeMap<MoleculeId, Molecule>,
    symmetry: Vec<SymmetryOperation>,
}

impl Crystal {
    pub fn new(
        lattice: Lattice,
        molecules: Vec<Molecule>,
        symmetry: Vec<SymmetryOperation>,
    ) -> Result<Self, CrystalError> {
        let mut by_id = BTreeMap::new();
        for molecule in molecules {
            if molecule.id.0 == 0 {
                return Err(CrystalError::ZeroMoleculeId);
            }
            let id = molecule.id;
            if by_id.insert(id, molecule).is_some() {
                return Err(CrystalError::DuplicateMolecule(id));
            }
        }
        Ok(Self {
            lattice,
            molecules: by_id,
            symmetry,
        })
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn molecule(&self, id: MoleculeId) -> Option<&Molecule> {
        self.molecules.get(&id)
    }

    /// Molecules in ascending id order.
    pub fn molecules(&self) -> impl Iterator<Item = &Molecule> {
        self.molecules.values()
    }

    pub fn molecule_ids(&self) -> Vec<MoleculeId> {
        self.molecules.keys().copied().collect()
    }

    pub fn molecule_count(&self) -> usize {
        self.molecules.len()
    }

    pub fn symmetry_operations(&self) -> &[SymmetryOperation] {
        &self.symmetry
    }
}
