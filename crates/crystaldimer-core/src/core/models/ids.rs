use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Identifier of anything the equivalence pipeline can group.
///
/// Persisted files store ids as plain unsigned integers.
pub trait EntityId:
    Copy + Ord + Hash + fmt::Debug + fmt::Display + From<u32> + Send + Sync + 'static
{
    fn raw(self) -> u32;
}

/// Stable positive-integer identifier of a molecule, assigned by the decomposer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MoleculeId(pub u32);

/// 1-based dimer number, assigned in canonical neighbor order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DimerId(pub u32);

impl EntityId for MoleculeId {
    fn raw(self) -> u32 {
        self.0
    }
}

impl EntityId for DimerId {
    fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MoleculeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MoleculeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<u32> for DimerId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
