use crate::core::models::crystal::CrystalError;
use crate::core::models::element::ParseElementError;
use crate::core::models::equivalence::PartitionError;
use crate::core::models::lattice::LatticeError;
use crate::core::models::structure::StructureError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("Invalid TOML document: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to serialize TOML document: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid element: {0}")]
    Element(#[from] ParseElementError),
    #[error("Invalid lattice: {0}")]
    Lattice(#[from] LatticeError),
    #[error("Invalid molecule {molecule}: {source}")]
    Structure {
        molecule: u32,
        #[source]
        source: StructureError,
    },
    #[error("Invalid crystal: {0}")]
    Crystal(#[from] CrystalError),
    #[error("Invalid equivalence groups: {0}")]
    Partition(#[from] PartitionError),
}

impl FormatError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}
