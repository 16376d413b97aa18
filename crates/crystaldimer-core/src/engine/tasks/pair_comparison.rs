use crate::core::models::equivalence::EquivalencePair;
use crate::core::models::ids::EntityId;
use crate::core::models::structure::Structure;
use crate::engine::equivalence::{StructureComparator, Subject};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

fn subject<'a, T: EntityId>(
    subjects: &'a BTreeMap<T, Structure>,
    id: T,
) -> Result<Subject<'a, T>, EngineError> {
    subjects
        .get(&id)
        .map(|structure| Subject { id, structure })
        .ok_or_else(|| EngineError::UniverseMismatch {
            reason: format!("no structure supplied for entity {}", id),
        })
}

/// Compares every pair `(a, b)`, `a < b`, of `universe` and returns the
/// equivalent ones in ascending order.
#[instrument(skip_all, name = "pair_comparison_task", fields(pass = pass))]
pub fn run<T, C>(
    pass: &'static str,
    subjects: &BTreeMap<T, Structure>,
    universe: &[T],
    comparator: &C,
    reporter: &ProgressReporter,
) -> Result<Vec<EquivalencePair<T>>, EngineError>
where
    T: EntityId,
    C: StructureComparator<T>,
{
    let pairs: Vec<(T, T)> = universe
        .iter()
        .copied()
        .sorted()
        .dedup()
        .tuple_combinations()
        .collect();

    if pairs.is_empty() {
        return Ok(Vec::new());
    }

    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pairs.par_iter();

    let verdicts = iterator
        .map(|&(a, b)| -> Result<Option<EquivalencePair<T>>, EngineError> {
            let verdict = comparator.equivalent(subject(subjects, a)?, subject(subjects, b)?);
            reporter.report(Progress::TaskIncrement);
            Ok(verdict?.then(|| EquivalencePair::new(a, b)))
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    reporter.report(Progress::TaskFinish);

    let equivalent: Vec<_> = verdicts.into_iter().flatten().collect();
    info!(
        compared = pairs.len(),
        equivalent = equivalent.len(),
        "Pairwise comparison complete."
    );
    Ok(equivalent)
}
