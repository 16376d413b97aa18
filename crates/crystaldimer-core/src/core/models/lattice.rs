use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

/// Integer triple naming a periodic repeat cell relative to the origin cell.
///
/// Field order gives the lexicographic `(i, j, k)` ordering used for canonical
/// sorting and for shell visitation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LatticeDisplacement {
    pub i: i32,
    pub j: i32,
    pub k: i32,
}

impl LatticeDisplacement {
    pub const ZERO: Self = Self { i: 0, j: 0, k: 0 };

    pub const fn new(i: i32, j: i32, k: i32) -> Self {
        Self { i, j, k }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Largest absolute coordinate; the shell this vector belongs to.
    pub fn reach(&self) -> u32 {
        self.i
            .unsigned_abs()
            .max(self.j.unsigned_abs())
            .max(self.k.unsigned_abs())
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.i as f64, self.j as f64, self.k as f64)
    }
}

impl Add for LatticeDisplacement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.i + rhs.i, self.j + rhs.j, self.k + rhs.k)
    }
}

impl Sub for LatticeDisplacement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.i - rhs.i, self.j - rhs.j, self.k - rhs.k)
    }
}

impl Neg for LatticeDisplacement {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.i, -self.j, -self.k)
    }
}

impl fmt::Display for LatticeDisplacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.i, self.j, self.k)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LatticeError {
    #[error("Lattice vectors are linearly dependent (determinant {determinant:.3e})")]
    Singular { determinant: f64 },
}

/// Periodic cell. Columns of `matrix` are the lattice vectors a, b and c.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

const SINGULARITY_THRESHOLD: f64 = 1e-8;

impl Lattice {
    pub fn new(matrix: Matrix3<f64>) -> Result<Self, LatticeError> {
        let determinant = matrix.determinant();
        if determinant.abs() < SINGULARITY_THRESHOLD {
            return Err(LatticeError::Singular { determinant });
        }
        let inverse = matrix
            .try_inverse()
            .ok_or(LatticeError::Singular { determinant })?;
        Ok(Self { matrix, inverse })
    }

    pub fn from_vectors(
        a: Vector3<f64>,
        b: Vector3<f64>,
        c: Vector3<f64>,
    ) -> Result<Self, LatticeError> {
        Self::new(Matrix3::from_columns(&[a, b, c]))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn to_cartesian(&self, fractional: &Vector3<f64>) -> Vector3<f64> {
        self.matrix * fractional
    }

    pub fn to_fractional(&self, cartesian: &Vector3<f64>) -> Vector3<f64> {
        self.inverse * cartesian
    }

    /// Cartesian translation of a whole-cell displacement.
    pub fn displacement(&self, displacement: &LatticeDisplacement) -> Vector3<f64> {
        self.matrix * displacement.as_vector()
    }

    /// Maps a point into the reference cell `[0, 1)^3` in fractional space.
    pub fn wrap(&self, point: &Point3<f64>) -> Point3<f64> {
        let fractional = self.to_fractional(&point.coords);
        let wrapped = fractional.map(|x| x - x.floor());
        Point3::from(self.to_cartesian(&wrapped))
    }

    /// Geometric center of the reference cell.
    pub fn center(&self) -> Point3<f64> {
        Point3::from(self.to_cartesian(&Vector3::new(0.5, 0.5, 0.5)))
    }

    /// Expresses a Cartesian translation as an integer lattice displacement.
    ///
    /// Returns `None` when any fractional coordinate is further than `tolerance`
    /// from its nearest integer.
    pub fn quantize(
        &self,
        translation: &Vector3<f64>,
        tolerance: f64,
    ) -> Option<LatticeDisplacement> {
        let fractional = self.to_fractional(translation);
        let rounded = fractional.map(f64::round);
        if (fractional - rounded).amax() > tolerance {
            return None;
        }
        Some(LatticeDisplacement::new(
            rounded.x as i32,
            rounded.y as i32,
            rounded.z as i32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(edge: f64) -> Lattice {
        Lattice::new(Matrix3::from_diagonal_element(edge)).unwrap()
    }

    #[test]
    fn new_rejects_singular_matrix() {
        let flat = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            Lattice::new(flat),
            Err(LatticeError::Singular { .. })
        ));
    }

    #[test]
    fn wrap_moves_points_into_reference_cell() {
        let lattice = cubic(10.0);
        let wrapped = lattice.wrap(&Point3::new(12.0, -3.0, 5.0));
        assert!((wrapped - Point3::new(2.0, 7.0, 5.0)).norm() < 1e-12);
    }

    #[test]
    fn center_is_half_of_each_lattice_vector() {
        let lattice = Lattice::from_vectors(
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(2.0, 8.0, 0.0),
            Vector3::new(0.0, 0.0, 6.0),
        )
        .unwrap();
        assert!((lattice.center() - Point3::new(6.0, 4.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn quantize_recovers_integer_displacements() {
        let lattice = cubic(5.0);
        let shift = lattice.quantize(&Vector3::new(-5.0, 10.0, 0.0), 1e-6);
        assert_eq!(shift, Some(LatticeDisplacement::new(-1, 2, 0)));
    }

    #[test]
    fn quantize_rejects_fractional_translation() {
        let lattice = cubic(5.0);
        assert_eq!(lattice.quantize(&Vector3::new(2.5, 0.0, 0.0), 1e-6), None);
    }

    #[test]
    fn displacement_arithmetic_and_ordering() {
        let a = LatticeDisplacement::new(1, -2, 3);
        let b = LatticeDisplacement::new(0, 1, 1);
        assert_eq!(a + b, LatticeDisplacement::new(1, -1, 4));
        assert_eq!(a - b, LatticeDisplacement::new(1, -3, 2));
        assert_eq!(-a, LatticeDisplacement::new(-1, 2, -3));
        assert_eq!(a.reach(), 3);
        assert!(b < a);
        assert!(LatticeDisplacement::ZERO.is_zero());
    }
}
