use super::ids::MoleculeId;
use super::structure::Structure;

/// A molecule of the decomposed crystal.
///
/// Coordinates are the molecule's unwrapped reference placement as handed over
/// by the decomposer; they are never modified afterwards.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub id: MoleculeId,
    pub structure: Structure,
    /// Marked by the decomposer's solvent predicate.
    pub is_solvent: bool,
}

impl Molecule {
    pub fn new(id: MoleculeId, structure: Structure) -> Self {
        Self {
            id,
            structure,
            is_solvent: false,
        }
    }

    pub fn with_solvent_flag(mut self, is_solvent: bool) -> Self {
        self.is_solvent = is_solvent;
        self
    }
}
