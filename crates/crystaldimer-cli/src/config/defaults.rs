use crystaldimer::core::topology::covalent::DEFAULT_BOND_TOLERANCE;
use crystaldimer::engine::config::DEFAULT_INTEGRALITY_TOLERANCE;
use crystaldimer::engine::distance::DistancePolicy;

/// Values used when neither the configuration file nor the command line
/// provides one. The cutoff has no default.
pub struct DefaultsConfig {
    pub distance_policy: DistancePolicy,
    pub bond_tolerance: f64,
    pub integrality_tolerance: f64,
    pub include_solvent: bool,
    pub symmetry_prepass: bool,
    pub symmetry_tolerance: f64,
    pub conformational: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            distance_policy: DistancePolicy::NearestAtom,
            bond_tolerance: DEFAULT_BOND_TOLERANCE,
            integrality_tolerance: DEFAULT_INTEGRALITY_TOLERANCE,
            include_solvent: true,
            symmetry_prepass: false,
            symmetry_tolerance: 0.1,
            conformational: true,
        }
    }
}
