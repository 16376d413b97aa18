use super::config::ConfigError;
use crate::core::utils::geometry::{min_pairwise_distance, round_to};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal places kept on reported distances.
const DISTANCE_DECIMALS: i32 = 4;

/// How the separation of two molecules is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistancePolicy {
    /// Minimum distance over all non-hydrogen atom pairs.
    #[default]
    NearestAtom,
    CenterOfMass,
    MolecularCenter,
    AverageDistance,
}

impl DistancePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NearestAtom => "nearest-atom",
            Self::CenterOfMass => "center-of-mass",
            Self::MolecularCenter => "molecular-center",
            Self::AverageDistance => "average-distance",
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self, Self::NearestAtom)
    }
}

impl fmt::Display for DistancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistancePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest-atom" => Ok(Self::NearestAtom),
            "center-of-mass" => Ok(Self::CenterOfMass),
            "molecular-center" => Ok(Self::MolecularCenter),
            "average-distance" => Ok(Self::AverageDistance),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Scores candidate dimers under an implemented [`DistancePolicy`].
#[derive(Debug, Clone, Copy)]
pub struct DistanceEvaluator {
    policy: DistancePolicy,
}

impl DistanceEvaluator {
    /// Fails for policies that are declared but not implemented.
    pub fn new(policy: DistancePolicy) -> Result<Self, ConfigError> {
        if !policy.is_implemented() {
            return Err(ConfigError::UnimplementedPolicy(policy));
        }
        Ok(Self { policy })
    }

    pub fn policy(&self) -> DistancePolicy {
        self.policy
    }

    /// Distance between `first` and `second` translated by `displacement`,
    /// rounded to four decimals. `None` when either side has no atoms.
    pub fn evaluate(
        &self,
        first: &[Point3<f64>],
        second: &[Point3<f64>],
        displacement: &Vector3<f64>,
    ) -> Option<f64> {
        match self.policy {
            DistancePolicy::NearestAtom => min_pairwise_distance(first, second, displacement)
                .map(|d| round_to(d, DISTANCE_DECIMALS)),
            DistancePolicy::CenterOfMass
            | DistancePolicy::MolecularCenter
            | DistancePolicy::AverageDistance => None,
        }
    }
}
