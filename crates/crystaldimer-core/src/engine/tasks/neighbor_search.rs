use crate::core::models::crystal::Crystal;
use crate::core::models::lattice::Lattice;
use crate::core::topology::covalent::CovalentRadii;
use crate::engine::config::NeighborSearchConfig;
use crate::engine::dimers::{canonical_sort, check_unique_keys};
use crate::engine::distance::DistanceEvaluator;
use crate::engine::error::EngineError;
use crate::engine::neighbors::{NeighborRecord, SearchSubject, search_pair};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs [`search_pair`] for every pair `(a, b)`, `a <= b`, as independent
/// tasks and concatenates the results in pair order.
pub fn search_parallel(
    lattice: &Lattice,
    subjects: &[SearchSubject],
    evaluator: &DistanceEvaluator,
    cutoff: f64,
    reporter: &ProgressReporter,
) -> Vec<NeighborRecord> {
    let pairs: Vec<(usize, usize)> = (0..subjects.len())
        .flat_map(|a| (a..subjects.len()).map(move |b| (a, b)))
        .collect();

    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pairs.par_iter();

    let batches: Vec<Vec<NeighborRecord>> = iterator
        .map(|&(a, b)| {
            let first = subjects[a].clone();
            let second = subjects[b].clone();
            let lattice = lattice.clone();
            let records = search_pair(&lattice, &first, &second, evaluator, cutoff);
            reporter.report(Progress::TaskIncrement);
            records
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    batches.concat()
}

/// Prepares every selected molecule and collects all accepted neighbors in
/// canonical order.
#[instrument(skip_all, name = "neighbor_search_task")]
pub fn run(
    crystal: &Crystal,
    config: &NeighborSearchConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<NeighborRecord>, EngineError> {
    let evaluator = DistanceEvaluator::new(config.distance_policy)?;
    let table = CovalentRadii::new(config.bond_tolerance);
    let lattice = crystal.lattice();

    let subjects = crystal
        .molecules()
        .filter(|m| config.include_solvent || !m.is_solvent)
        .map(|m| SearchSubject::prepare(m, lattice, &table, config.integrality_tolerance))
        .collect::<Result<Vec<_>, _>>()?;

    let fragmented = subjects.iter().filter(|s| s.placement.len() > 1).count();
    info!(
        molecules = subjects.len(),
        skipped_solvent = crystal.molecule_count() - subjects.len(),
        fragmented,
        cutoff = config.cutoff,
        policy = %evaluator.policy(),
        "Searching periodic neighbors."
    );

    #[cfg(feature = "parallel")]
    let mut records = search_parallel(lattice, &subjects, &evaluator, config.cutoff, reporter);

    #[cfg(not(feature = "parallel"))]
    let mut records = {
        reporter.report(Progress::Message("Searching all molecule pairs...".to_string()));
        crate::engine::neighbors::search_crystal(lattice, &subjects, &evaluator, config.cutoff)
    };

    check_unique_keys(&records)?;
    canonical_sort(&mut records);

    debug!(
        nearest = records.first().map(|r| r.distance),
        farthest = records.last().map(|r| r.distance),
        "Neighbor distances."
    );
    info!(neighbors = records.len(), "Neighbor search complete.");
    Ok(records)
}
