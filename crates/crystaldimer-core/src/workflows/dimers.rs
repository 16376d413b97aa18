use crate::core::io::ledger::DimerLedger;
use crate::core::models::crystal::Crystal;
use crate::core::models::dimer::Dimer;
use crate::engine::config::NeighborSearchConfig;
use crate::engine::dimers::{DimerKey, assemble};
use crate::engine::error::EngineError;
use crate::engine::neighbors::NeighborRecord;
use crate::engine::progress::ProgressReporter;
use crate::engine::tasks;
use nalgebra::Vector3;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct DimerSearchResult {
    pub records: Vec<NeighborRecord>,
    pub dimers: Vec<Dimer>,
}

fn persisted_recentering(
    ledger: &DimerLedger,
) -> Result<HashMap<DimerKey, Vector3<f64>>, EngineError> {
    let mut seen = HashSet::with_capacity(ledger.len());
    for entry in ledger.entries() {
        if !seen.insert(entry.key()) {
            return Err(EngineError::DuplicateKey {
                kind: "dimer",
                molecule_1: entry.molecule_1,
                molecule_2: entry.molecule_2,
                displacement: entry.displacement,
            });
        }
    }
    Ok(ledger.recentering_by_key())
}

/// Finds all neighbors closer than the cutoff and assembles them into dimers.
///
/// When `previous` is given, its recentering vectors are reused for every
/// dimer it already lists.
#[instrument(skip_all, name = "dimer_workflow")]
pub fn run(
    crystal: &Crystal,
    config: &NeighborSearchConfig,
    previous: Option<&DimerLedger>,
    reporter: &ProgressReporter,
) -> Result<DimerSearchResult, EngineError> {
    let persisted = previous.map(persisted_recentering).transpose()?;

    let records = reporter.phase("Neighbor Search", || {
        tasks::neighbor_search::run(crystal, config, reporter)
    })?;

    let dimers = reporter.phase("Dimer Assembly", || {
        assemble(
            crystal,
            &records,
            persisted.as_ref(),
            config.integrality_tolerance,
        )
    })?;

    if let Some(persisted) = &persisted {
        let reused = dimers
            .iter()
            .filter(|d| persisted.contains_key(&d.key()))
            .count();
        if reused < persisted.len() {
            warn!(
                stale = persisted.len() - reused,
                "Previous ledger lists dimers the current search did not find."
            );
        }
        info!(reused, "Reused persisted recentering vectors.");
    }

    info!(dimers = dimers.len(), "Dimer workflow complete.");
    Ok(DimerSearchResult { records, dimers })
}

/// Rebuilds dimers from a ledger without searching again.
///
/// Cartesian vectors are recomputed from the integer displacements so the
/// assembled coordinates match those of the run that wrote the ledger.
pub fn restore(
    crystal: &Crystal,
    ledger: &DimerLedger,
    integrality_tolerance: f64,
) -> Result<Vec<Dimer>, EngineError> {
    persisted_recentering(ledger)?;
    let lattice = crystal.lattice();
    ledger
        .entries()
        .iter()
        .map(|entry| {
            for id in [entry.molecule_1, entry.molecule_2] {
                if crystal.molecule(id).is_none() {
                    return Err(EngineError::UnknownMolecule(id));
                }
            }
            let shift = lattice
                .quantize(&entry.recentering, integrality_tolerance)
                .ok_or_else(|| {
                    let fractional = lattice.to_fractional(&entry.recentering);
                    EngineError::NonIntegralDisplacement {
                        context: format!("recentering of dimer {}", entry.id),
                        fractional: [fractional.x, fractional.y, fractional.z],
                    }
                })?;
            Ok(Dimer {
                id: entry.id,
                molecule_1: entry.molecule_1,
                molecule_2: entry.molecule_2,
                displacement: entry.displacement,
                cartesian_displacement: lattice.displacement(&entry.displacement),
                recentering_shift: shift,
                recentering: lattice.displacement(&shift),
                distance: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::ledger::LedgerEntry;
    use crate::core::models::ids::{DimerId, MoleculeId};
    use crate::core::models::lattice::{Lattice, LatticeDisplacement};
    use crate::core::models::molecule::Molecule;
    use crate::core::models::structure::Structure;
    use crate::engine::config::NeighborSearchConfigBuilder;
    use crate::engine::dimers::assemble_structure;
    use nalgebra::{Matrix3, Point3};

    fn chain(id: u32, xs: &[f64]) -> Molecule {
        let elements = xs.iter().map(|_| "C".parse().unwrap()).collect();
        let positions = xs.iter().map(|&x| Point3::new(x, 10.0, 10.0)).collect();
        let bonds: Vec<_> = (1..xs.len()).map(|i| (i - 1, i)).collect();
        Molecule::new(MoleculeId(id), Structure::new(elements, positions, &bonds).unwrap())
    }

    fn crystal() -> Crystal {
        let lattice = Lattice::new(Matrix3::from_diagonal_element(20.0)).unwrap();
        Crystal::new(
            lattice,
            vec![chain(1, &[17.0, 18.0, 19.0]), chain(2, &[1.5, 2.5, 3.5])],
            vec![],
        )
        .unwrap()
    }

    fn config() -> NeighborSearchConfig {
        NeighborSearchConfigBuilder::new().cutoff(8.0).build().unwrap()
    }

    #[test]
    fn run_finds_single_contact_dimer() {
        let result = run(&crystal(), &config(), None, &ProgressReporter::new()).unwrap();
        assert_eq!(result.dimers.len(), 1);
        let dimer = &result.dimers[0];
        assert_eq!(dimer.id, DimerId(1));
        assert_eq!(dimer.displacement, LatticeDisplacement::new(1, 0, 0));
        assert_eq!(dimer.distance, Some(2.5));
    }

    #[test]
    fn reusing_the_ledger_reproduces_dimers() {
        let first = run(&crystal(), &config(), None, &ProgressReporter::new()).unwrap();
        let ledger = DimerLedger::from_dimers(&first.dimers);
        let second = run(&crystal(), &config(), Some(&ledger), &ProgressReporter::new()).unwrap();
        assert_eq!(first.dimers, second.dimers);
    }

    #[test]
    fn restored_dimers_assemble_identical_coordinates() {
        let crystal = crystal();
        let fresh = run(&crystal, &config(), None, &ProgressReporter::new()).unwrap();
        let ledger = DimerLedger::from_dimers(&fresh.dimers);
        let restored = restore(&crystal, &ledger, 1e-4).unwrap();
        assert_eq!(restored[0].distance, None);
        assert_eq!(
            assemble_structure(&crystal, &restored[0]).unwrap().positions(),
            assemble_structure(&crystal, &fresh.dimers[0]).unwrap().positions()
        );
    }

    #[test]
    fn duplicate_ledger_keys_are_fatal() {
        let entry = LedgerEntry {
            id: DimerId(1),
            molecule_1: MoleculeId(1),
            molecule_2: MoleculeId(2),
            displacement: LatticeDisplacement::new(1, 0, 0),
            cartesian_displacement: Vector3::new(20.0, 0.0, 0.0),
            recentering: Vector3::zeros(),
        };
        let mut twin = entry.clone();
        twin.id = DimerId(2);
        let ledger = DimerLedger::new(vec![entry, twin]);
        assert!(matches!(
            restore(&crystal(), &ledger, 1e-4),
            Err(EngineError::DuplicateKey { kind: "dimer", .. })
        ));
        assert!(matches!(
            run(&crystal(), &config(), Some(&ledger), &ProgressReporter::new()),
            Err(EngineError::DuplicateKey { kind: "dimer", .. })
        ));
    }
}
