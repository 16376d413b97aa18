use super::equivalence::{StructureComparator, Subject};
use super::error::EngineError;
use crate::core::models::element::Element;
use crate::core::models::ids::EntityId;
use crate::core::models::structure::Structure;
use crate::core::models::symmetry::SymmetryOperation;
use nalgebra::Point3;
use std::collections::BTreeMap;

/// Tests whether one entity maps onto another under a point-group rotation
/// about the cell center.
#[derive(Debug, Clone)]
pub struct SymmetryMatcher {
    rotations: Vec<SymmetryOperation>,
    center: Point3<f64>,
    tolerance: f64,
}

impl SymmetryMatcher {
    /// Keeps every non-identity rotation; an operation with a translation
    /// part is rejected.
    pub fn new(
        operations: &[SymmetryOperation],
        center: Point3<f64>,
        tolerance: f64,
    ) -> Result<Self, EngineError> {
        let mut rotations = Vec::new();
        for (index, op) in operations.iter().enumerate() {
            if op.has_translation() {
                return Err(EngineError::SymmetryTranslation { index });
            }
            if !op.is_identity() {
                rotations.push(op.clone());
            }
        }
        Ok(Self {
            rotations,
            center,
            tolerance,
        })
    }

    pub fn rotation_count(&self) -> usize {
        self.rotations.len()
    }

    /// Greedy atom correspondence under one rotation.
    ///
    /// Hydrogens are ignored unless neither structure has any other atom.
    /// Each rotated atom of `first` claims the closest unclaimed atom of the
    /// same element in `second`; the first candidate wins ties.
    pub fn matches_under(
        &self,
        operation: &SymmetryOperation,
        first: &Structure,
        second: &Structure,
    ) -> bool {
        let rotated = group_by_element(first, |p| operation.rotate_about(p, &self.center));
        let targets = group_by_element(second, |p| *p);
        if rotated.len() != targets.len() {
            return false;
        }

        for (element, points) in &rotated {
            let Some(candidates) = targets.get(element) else {
                return false;
            };
            if candidates.len() != points.len() {
                return false;
            }
            let mut claimed = vec![false; candidates.len()];
            for point in points {
                let closest = candidates
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| !claimed[*j])
                    .map(|(j, q)| (j, (q - point).norm()))
                    .filter(|(_, d)| *d <= self.tolerance)
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                match closest {
                    Some((j, _)) => claimed[j] = true,
                    None => return false,
                }
            }
        }
        true
    }
}

fn group_by_element(
    structure: &Structure,
    transform: impl Fn(&Point3<f64>) -> Point3<f64>,
) -> BTreeMap<&Element, Vec<Point3<f64>>> {
    let heavy_only = structure.elements().any(|e| !e.is_hydrogen());
    let mut grouped: BTreeMap<&Element, Vec<Point3<f64>>> = BTreeMap::new();
    for (element, position) in structure.elements().zip(structure.positions()) {
        if heavy_only && element.is_hydrogen() {
            continue;
        }
        grouped.entry(element).or_default().push(transform(position));
    }
    grouped
}

impl<T: EntityId> StructureComparator<T> for SymmetryMatcher {
    fn equivalent(
        &self,
        first: Subject<'_, T>,
        second: Subject<'_, T>,
    ) -> Result<bool, EngineError> {
        Ok(self
            .rotations
            .iter()
            .any(|operation| self.matches_under(operation, first.structure, second.structure)))
    }
}
