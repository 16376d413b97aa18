use super::error::EngineError;
use super::neighbors::NeighborRecord;
use crate::core::models::crystal::Crystal;
use crate::core::models::dimer::Dimer;
use crate::core::models::ids::{DimerId, MoleculeId};
use crate::core::models::lattice::{Lattice, LatticeDisplacement};
use crate::core::models::molecule::Molecule;
use crate::core::models::structure::Structure;
use nalgebra::{Point3, Vector3};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub type DimerKey = (MoleculeId, MoleculeId, LatticeDisplacement);

/// Fails on the first repeated `(molecule_1, molecule_2, displacement)` key.
pub fn check_unique_keys(records: &[NeighborRecord]) -> Result<(), EngineError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let (molecule_1, molecule_2, displacement) = record.key();
        if !seen.insert(record.key()) {
            return Err(EngineError::DuplicateKey {
                kind: "neighbor",
                molecule_1,
                molecule_2,
                displacement,
            });
        }
    }
    Ok(())
}

fn canonical_order(a: &NeighborRecord, b: &NeighborRecord) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.key().cmp(&b.key()))
}

/// Orders records by `(distance, molecule_1, molecule_2, i, j, k)`.
pub fn canonical_sort(records: &mut [NeighborRecord]) {
    records.sort_by(canonical_order);
}

/// Whole-lattice shift bringing `centroid` closest to the cell center.
///
/// Ties go to the lexicographically smallest shift.
pub fn recentering_shift(lattice: &Lattice, centroid: &Point3<f64>) -> LatticeDisplacement {
    let center = lattice.center();
    let rounded = lattice.to_fractional(&(center - centroid)).map(f64::round);
    let base = LatticeDisplacement::new(rounded.x as i32, rounded.y as i32, rounded.z as i32);

    let mut best = base;
    let mut best_distance = f64::INFINITY;
    for i in -1..=1 {
        for j in -1..=1 {
            for k in -1..=1 {
                let shift = base + LatticeDisplacement::new(i, j, k);
                let distance = (centroid + lattice.displacement(&shift) - center).norm_squared();
                if distance < best_distance {
                    best = shift;
                    best_distance = distance;
                }
            }
        }
    }
    best
}

fn molecule<'a>(crystal: &'a Crystal, id: MoleculeId) -> Result<&'a Molecule, EngineError> {
    crystal.molecule(id).ok_or(EngineError::UnknownMolecule(id))
}

fn raw_structure(
    crystal: &Crystal,
    molecule_1: MoleculeId,
    molecule_2: MoleculeId,
    cartesian_displacement: &Vector3<f64>,
) -> Result<Structure, EngineError> {
    let first = molecule(crystal, molecule_1)?;
    let second = molecule(crystal, molecule_2)?;
    Ok(first
        .structure
        .concat(&second.structure.translated(cartesian_displacement)))
}

/// Turns canonically sorted records into numbered, recentered dimers.
///
/// A persisted recentering vector for the same key wins over a fresh
/// computation; it must be a whole-lattice translation.
pub fn assemble(
    crystal: &Crystal,
    records: &[NeighborRecord],
    persisted: Option<&HashMap<DimerKey, Vector3<f64>>>,
    integrality_tolerance: f64,
) -> Result<Vec<Dimer>, EngineError> {
    let lattice = crystal.lattice();
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let candidate = &record.candidate;
            let shift = match persisted.and_then(|map| map.get(&record.key())) {
                Some(vector) => lattice.quantize(vector, integrality_tolerance).ok_or_else(|| {
                    let fractional = lattice.to_fractional(vector);
                    EngineError::NonIntegralDisplacement {
                        context: format!(
                            "persisted recentering of ({}, {}, {})",
                            candidate.molecule_1, candidate.molecule_2, candidate.displacement
                        ),
                        fractional: [fractional.x, fractional.y, fractional.z],
                    }
                })?,
                None => {
                    let structure = raw_structure(
                        crystal,
                        candidate.molecule_1,
                        candidate.molecule_2,
                        &candidate.cartesian_displacement,
                    )?;
                    match structure.centroid() {
                        Some(centroid) => recentering_shift(lattice, &centroid),
                        None => LatticeDisplacement::ZERO,
                    }
                }
            };
            Ok(Dimer {
                id: DimerId(index as u32 + 1),
                molecule_1: candidate.molecule_1,
                molecule_2: candidate.molecule_2,
                displacement: candidate.displacement,
                cartesian_displacement: candidate.cartesian_displacement,
                recentering_shift: shift,
                recentering: lattice.displacement(&shift),
                distance: Some(record.distance),
            })
        })
        .collect()
}

/// Recentered coordinates and union bond graph of a dimer.
pub fn assemble_structure(crystal: &Crystal, dimer: &Dimer) -> Result<Structure, EngineError> {
    let mut structure = raw_structure(
        crystal,
        dimer.molecule_1,
        dimer.molecule_2,
        &dimer.cartesian_displacement,
    )?;
    structure.translate(&dimer.recentering);
    Ok(structure)
}
