use super::distance::DistancePolicy;
use crate::core::topology::covalent::DEFAULT_BOND_TOLERANCE;
use thiserror::Error;

/// Largest allowed deviation of a fractional shift from its nearest integer.
pub const DEFAULT_INTEGRALITY_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Distance policy '{0}' is declared but not implemented")]
    UnimplementedPolicy(DistancePolicy),

    #[error("Unknown distance policy '{0}'")]
    UnknownPolicy(String),

    #[error("Option '{option}' requires '{requires}' to be set")]
    MissingCompanion {
        option: &'static str,
        requires: &'static str,
    },

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

fn positive(parameter: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeighborSearchConfig {
    /// Candidates closer than this (Å) are accepted as dimers.
    pub cutoff: f64,
    pub distance_policy: DistancePolicy,
    /// Slack (Å) added to the sum of covalent radii when deciding whether a
    /// bond survived wrapping.
    pub bond_tolerance: f64,
    pub integrality_tolerance: f64,
    pub include_solvent: bool,
}

#[derive(Default)]
pub struct NeighborSearchConfigBuilder {
    cutoff: Option<f64>,
    distance_policy: Option<DistancePolicy>,
    bond_tolerance: Option<f64>,
    integrality_tolerance: Option<f64>,
    include_solvent: Option<bool>,
}

impl NeighborSearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cutoff(mut self, angstroms: f64) -> Self {
        self.cutoff = Some(angstroms);
        self
    }
    pub fn distance_policy(mut self, policy: DistancePolicy) -> Self {
        self.distance_policy = Some(policy);
        self
    }
    pub fn bond_tolerance(mut self, angstroms: f64) -> Self {
        self.bond_tolerance = Some(angstroms);
        self
    }
    pub fn integrality_tolerance(mut self, tolerance: f64) -> Self {
        self.integrality_tolerance = Some(tolerance);
        self
    }
    pub fn include_solvent(mut self, include: bool) -> Self {
        self.include_solvent = Some(include);
        self
    }

    pub fn build(self) -> Result<NeighborSearchConfig, ConfigError> {
        let cutoff = positive(
            "cutoff",
            self.cutoff.ok_or(ConfigError::MissingParameter("cutoff"))?,
        )?;
        let distance_policy = self.distance_policy.unwrap_or_default();
        if !distance_policy.is_implemented() {
            return Err(ConfigError::UnimplementedPolicy(distance_policy));
        }
        let bond_tolerance = self.bond_tolerance.unwrap_or(DEFAULT_BOND_TOLERANCE);
        if !(bond_tolerance.is_finite() && bond_tolerance >= 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "bond_tolerance",
                reason: format!("must be non-negative, got {}", bond_tolerance),
            });
        }
        Ok(NeighborSearchConfig {
            cutoff,
            distance_policy,
            bond_tolerance,
            integrality_tolerance: positive(
                "integrality_tolerance",
                self.integrality_tolerance
                    .unwrap_or(DEFAULT_INTEGRALITY_TOLERANCE),
            )?,
            include_solvent: self.include_solvent.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryConfig {
    /// Largest distance (Å) between a rotated atom and its matched partner.
    pub tolerance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquivalenceConfig {
    /// `None` disables the symmetry pre-pass.
    pub symmetry: Option<SymmetryConfig>,
    pub conformational: bool,
    pub integrality_tolerance: f64,
}

#[derive(Default)]
pub struct EquivalenceConfigBuilder {
    symmetry_prepass: Option<bool>,
    symmetry_tolerance: Option<f64>,
    conformational: Option<bool>,
    integrality_tolerance: Option<f64>,
}

impl EquivalenceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symmetry_prepass(mut self, enabled: bool) -> Self {
        self.symmetry_prepass = Some(enabled);
        self
    }
    pub fn symmetry_tolerance(mut self, angstroms: f64) -> Self {
        self.symmetry_tolerance = Some(angstroms);
        self
    }
    pub fn conformational(mut self, enabled: bool) -> Self {
        self.conformational = Some(enabled);
        self
    }
    pub fn integrality_tolerance(mut self, tolerance: f64) -> Self {
        self.integrality_tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> Result<EquivalenceConfig, ConfigError> {
        let symmetry = match self.symmetry_prepass.unwrap_or(false) {
            true => {
                let tolerance = self.symmetry_tolerance.ok_or(ConfigError::MissingCompanion {
                    option: "symmetry_prepass",
                    requires: "symmetry_tolerance",
                })?;
                Some(SymmetryConfig {
                    tolerance: positive("symmetry_tolerance", tolerance)?,
                })
            }
            false => None,
        };
        Ok(EquivalenceConfig {
            symmetry,
            conformational: self.conformational.unwrap_or(true),
            integrality_tolerance: positive(
                "integrality_tolerance",
                self.integrality_tolerance
                    .unwrap_or(DEFAULT_INTEGRALITY_TOLERANCE),
            )?,
        })
    }
}
