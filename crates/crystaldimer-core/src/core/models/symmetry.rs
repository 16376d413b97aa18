use nalgebra::{Matrix3, Point3, Vector3};

const IDENTITY_TOLERANCE: f64 = 1e-6;

/// One operation of the crystal's point group, as reported by an external detector.
///
/// `rotation` acts on Cartesian coordinates about the lattice geometric center;
/// `translation` must be zero for the operation to be usable.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperation {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl SymmetryOperation {
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    pub fn is_identity(&self) -> bool {
        (self.rotation - Matrix3::identity()).amax() < IDENTITY_TOLERANCE
            && !self.has_translation()
    }

    pub fn has_translation(&self) -> bool {
        self.translation.amax() >= IDENTITY_TOLERANCE
    }

    /// Applies the rotation about `center`, ignoring the translation part.
    pub fn rotate_about(&self, point: &Point3<f64>, center: &Point3<f64>) -> Point3<f64> {
        center + self.rotation * (point - center)
    }
}
