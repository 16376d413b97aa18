use crate::core::models::element::Element;
use phf::{Map, phf_map};

/// Covalent radii in angstroms (Cordero et al., 2008).
#[rustfmt::skip]
static COVALENT_RADII: Map<&'static str, f64> = phf_map! {
    "H"  => 0.31, "D"  => 0.31, "T"  => 0.31, "He" => 0.28,
    "Li" => 1.28, "Be" => 0.96, "B"  => 0.84, "C"  => 0.76,
    "N"  => 0.71, "O"  => 0.66, "F"  => 0.57, "Ne" => 0.58,
    "Na" => 1.66, "Mg" => 1.41, "Al" => 1.21, "Si" => 1.11,
    "P"  => 1.07, "S"  => 1.05, "Cl" => 1.02, "Ar" => 1.06,
    "K"  => 2.03, "Ca" => 1.76, "Sc" => 1.70, "Ti" => 1.60,
    "V"  => 1.53, "Cr" => 1.39, "Mn" => 1.39, "Fe" => 1.32,
    "Co" => 1.26, "Ni" => 1.24, "Cu" => 1.32, "Zn" => 1.22,
    "Ga" => 1.22, "Ge" => 1.20, "As" => 1.19, "Se" => 1.20,
    "Br" => 1.20, "Kr" => 1.16, "Rb" => 2.20, "Sr" => 1.95,
    "Y"  => 1.90, "Zr" => 1.75, "Nb" => 1.64, "Mo" => 1.54,
    "Tc" => 1.47, "Ru" => 1.46, "Rh" => 1.42, "Pd" => 1.39,
    "Ag" => 1.45, "Cd" => 1.44, "In" => 1.42, "Sn" => 1.39,
    "Sb" => 1.39, "Te" => 1.38, "I"  => 1.39, "Xe" => 1.40,
    "Cs" => 2.44, "Ba" => 2.15, "Pt" => 1.36, "Au" => 1.36,
    "Hg" => 1.32, "Pb" => 1.46, "Bi" => 1.48,
};

/// Radius used for elements missing from the table.
const FALLBACK_RADIUS: f64 = 1.50;

/// Slack added to the sum of radii when deciding whether a bond survives.
pub const DEFAULT_BOND_TOLERANCE: f64 = 0.45;

/// Source of maximum covalent bond lengths per element pair.
pub trait BondLengthTable {
    /// Longest distance (Å) at which `a` and `b` are still considered bonded.
    fn max_bond_length(&self, a: &Element, b: &Element) -> f64;
}

/// Sum-of-covalent-radii table with an additive tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovalentRadii {
    pub tolerance: f64,
}

impl CovalentRadii {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn radius(element: &Element) -> f64 {
        COVALENT_RADII
            .get(element.symbol())
            .copied()
            .unwrap_or(FALLBACK_RADIUS)
    }
}

impl Default for CovalentRadii {
    fn default() -> Self {
        Self::new(DEFAULT_BOND_TOLERANCE)
    }
}

impl BondLengthTable for CovalentRadii {
    fn max_bond_length(&self, a: &Element, b: &Element) -> f64 {
        Self::radius(a) + Self::radius(b) + self.tolerance
    }
}
