use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::equivalence::PartitionError;
use crate::core::models::ids::MoleculeId;
use crate::core::models::lattice::LatticeDisplacement;
use crate::core::models::structure::StructureError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Duplicate {kind} key ({molecule_1}, {molecule_2}, {displacement})")]
    DuplicateKey {
        kind: &'static str,
        molecule_1: MoleculeId,
        molecule_2: MoleculeId,
        displacement: LatticeDisplacement,
    },

    #[error("Equivalence partition violated: {source}")]
    Partition {
        #[from]
        source: PartitionError,
    },

    #[error("Grouped entities do not match the declared universe: {reason}")]
    UniverseMismatch { reason: String },

    #[error("Equivalence pair ({first}, {second}) mentions an entity outside the universe")]
    PairOutsideUniverse { first: String, second: String },

    #[error("Non-integral lattice displacement for {context}: fractional offset {fractional:?}")]
    NonIntegralDisplacement {
        context: String,
        fractional: [f64; 3],
    },

    #[error("Symmetry operation {index} carries a non-zero translation; only point-group rotations are supported")]
    SymmetryTranslation { index: usize },

    #[error("Molecule {0} is not part of the crystal")]
    UnknownMolecule(MoleculeId),

    #[error("Invalid structure: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Comparator failed on ({first}, {second}): {reason}")]
    Comparator {
        first: String,
        second: String,
        reason: String,
    },
}
