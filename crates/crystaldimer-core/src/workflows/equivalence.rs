use crate::core::models::crystal::Crystal;
use crate::core::models::dimer::Dimer;
use crate::core::models::equivalence::{EquivalenceGroups, EquivalencePair};
use crate::core::models::ids::{DimerId, EntityId, MoleculeId};
use crate::core::models::structure::Structure;
use crate::core::models::symmetry::SymmetryOperation;
use crate::engine::cliques::build_cliques;
use crate::engine::config::EquivalenceConfig;
use crate::engine::dimers::assemble_structure;
use crate::engine::equivalence::{ConformationalComparator, StructureComparator, merge_groups};
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::symmetry::SymmetryMatcher;
use crate::engine::tasks::pair_comparison;
use nalgebra::Point3;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct EquivalenceResult<T> {
    /// Groups found by the symmetry pre-pass alone; all singletons when the
    /// pre-pass is disabled.
    pub symmetry: EquivalenceGroups<T>,
    pub structural: EquivalenceGroups<T>,
    pub conformational: Option<EquivalenceGroups<T>>,
    /// Pairs each pass judged equivalent, in ascending `(a, b)` order. The
    /// structural and conformational lists cover representatives only.
    pub symmetry_pairs: Vec<EquivalencePair<T>>,
    pub structural_pairs: Vec<EquivalencePair<T>>,
    pub conformational_pairs: Option<Vec<EquivalencePair<T>>>,
}

/// Groups `subjects` into structural and, optionally, conformational species.
///
/// Symmetry-equivalent entities are found first; only their representatives
/// reach `comparator`, and the results are expanded back over the symmetry
/// groups afterwards.
#[instrument(skip_all, name = "equivalence_workflow")]
pub fn run<T, C>(
    subjects: &BTreeMap<T, Structure>,
    center: Point3<f64>,
    operations: &[SymmetryOperation],
    comparator: &C,
    config: &EquivalenceConfig,
    reporter: &ProgressReporter,
) -> Result<EquivalenceResult<T>, EngineError>
where
    T: EntityId,
    C: StructureComparator<T>,
{
    let universe: BTreeSet<T> = subjects.keys().copied().collect();
    info!(entities = universe.len(), "Starting equivalence grouping.");

    let (symmetry, symmetry_pairs) =
        reporter.phase("Symmetry Pre-pass", || match &config.symmetry {
            Some(settings) => {
                let matcher = SymmetryMatcher::new(operations, center, settings.tolerance)?;
                info!(
                    rotations = matcher.rotation_count(),
                    "Matching under point-group rotations."
                );
                let ids: Vec<T> = universe.iter().copied().collect();
                let pairs = pair_comparison::run("symmetry", subjects, &ids, &matcher, reporter)?;
                Ok::<_, EngineError>((build_cliques(pairs.iter().copied(), &universe)?, pairs))
            }
            None => Ok((build_cliques(Vec::new(), &universe)?, Vec::new())),
        })?;

    let (structural, structural_pairs) = reporter.phase("Structural Comparison", || {
        let representatives = symmetry.representatives();
        let pairs =
            pair_comparison::run("structural", subjects, &representatives, comparator, reporter)?;
        let compared =
            build_cliques(pairs.iter().copied(), &representatives.iter().copied().collect())?;
        Ok::<_, EngineError>((merge_groups(&compared, &symmetry)?, pairs))
    })?;

    let (conformational, conformational_pairs) = if config.conformational {
        let (groups, pairs) = reporter.phase("Conformational Comparison", || {
            let representatives = structural.representatives();
            let pairs = pair_comparison::run(
                "conformational",
                subjects,
                &representatives,
                &ConformationalComparator,
                reporter,
            )?;
            let compared =
                build_cliques(pairs.iter().copied(), &representatives.iter().copied().collect())?;
            Ok::<_, EngineError>((merge_groups(&compared, &structural)?, pairs))
        })?;
        (Some(groups), Some(pairs))
    } else {
        (None, None)
    };

    info!(
        symmetry_groups = symmetry.len(),
        structural_groups = structural.len(),
        conformational_groups = conformational.as_ref().map(EquivalenceGroups::len),
        "Equivalence grouping complete."
    );
    Ok(EquivalenceResult {
        symmetry,
        structural,
        conformational,
        symmetry_pairs,
        structural_pairs,
        conformational_pairs,
    })
}

/// Groups the molecules of `crystal`.
pub fn run_molecules(
    crystal: &Crystal,
    comparator: &impl StructureComparator<MoleculeId>,
    config: &EquivalenceConfig,
    reporter: &ProgressReporter,
) -> Result<EquivalenceResult<MoleculeId>, EngineError> {
    let subjects = crystal
        .molecules()
        .map(|m| (m.id, m.structure.clone()))
        .collect();
    run(
        &subjects,
        crystal.lattice().center(),
        crystal.symmetry_operations(),
        comparator,
        config,
        reporter,
    )
}

/// Groups dimers by their assembled, recentered structures.
pub fn run_dimers(
    crystal: &Crystal,
    dimers: &[Dimer],
    comparator: &impl StructureComparator<DimerId>,
    config: &EquivalenceConfig,
    reporter: &ProgressReporter,
) -> Result<EquivalenceResult<DimerId>, EngineError> {
    let subjects = dimers
        .iter()
        .map(|d| assemble_structure(crystal, d).map(|structure| (d.id, structure)))
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    run(
        &subjects,
        crystal.lattice().center(),
        crystal.symmetry_operations(),
        comparator,
        config,
        reporter,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EquivalenceConfigBuilder;
    use crate::engine::equivalence::PairListComparator;
    use nalgebra::{Matrix3, Vector3};

    fn members(groups: &EquivalenceGroups<MoleculeId>) -> Vec<Vec<u32>> {
        groups
            .groups()
            .iter()
            .map(|g| g.members().map(|id| id.0).collect())
            .collect()
    }

    fn pairs(raw: &[(u32, u32)]) -> PairListComparator<MoleculeId> {
        PairListComparator::new(
            raw.iter()
                .map(|&(a, b)| EquivalencePair::new(MoleculeId(a), MoleculeId(b))),
        )
    }

    /// Carbon monoxide with the oxygen `dx` along x from the carbon.
    fn co(carbon: [f64; 3], dx: f64, bonded: bool) -> Structure {
        let p = Point3::from(carbon);
        let bonds: &[(usize, usize)] = if bonded { &[(0, 1)] } else { &[] };
        Structure::new(
            vec!["C".parse().unwrap(), "O".parse().unwrap()],
            vec![p, p + Vector3::new(dx, 0.0, 0.0)],
            bonds,
        )
        .unwrap()
    }

    fn subjects() -> BTreeMap<MoleculeId, Structure> {
        let mut map = BTreeMap::new();
        // 1 and 2 are inversion images through (5, 5, 5).
        map.insert(MoleculeId(1), co([2.0, 5.0, 5.0], 1.1, true));
        map.insert(MoleculeId(2), co([8.0, 5.0, 5.0], -1.1, true));
        map.insert(MoleculeId(3), co([0.0, 0.0, 0.0], 1.1, true));
        map.insert(MoleculeId(4), co([8.0, 8.0, 8.0], 1.1, false));
        map
    }

    fn inversion() -> Vec<SymmetryOperation> {
        vec![
            SymmetryOperation::identity(),
            SymmetryOperation::new(-Matrix3::identity(), Vector3::zeros()),
        ]
    }

    fn config(symmetry: bool) -> EquivalenceConfig {
        EquivalenceConfigBuilder::new()
            .symmetry_prepass(symmetry)
            .symmetry_tolerance(0.05)
            .build()
            .unwrap()
    }

    #[test]
    fn partial_comparator_equivalence_keeps_third_entity_apart() {
        let mut subjects = subjects();
        subjects.remove(&MoleculeId(4));
        let result = run(
            &subjects,
            Point3::new(5.0, 5.0, 5.0),
            &[],
            &pairs(&[(1, 2), (2, 3)]),
            &config(false),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(members(&result.structural), vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn symmetry_equivalents_are_folded_into_comparator_groups() {
        let result = run(
            &subjects(),
            Point3::new(5.0, 5.0, 5.0),
            &inversion(),
            &pairs(&[(1, 3)]),
            &config(true),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(members(&result.symmetry), vec![vec![1, 2], vec![3], vec![4]]);
        assert_eq!(members(&result.structural), vec![vec![1, 2, 3], vec![4]]);
    }

    #[test]
    fn each_pass_keeps_the_pairs_it_judged_equivalent() {
        let result = run(
            &subjects(),
            Point3::new(5.0, 5.0, 5.0),
            &inversion(),
            &pairs(&[(1, 3)]),
            &config(true),
            &ProgressReporter::new(),
        )
        .unwrap();
        let raw = |pairs: &[EquivalencePair<MoleculeId>]| -> Vec<(u32, u32)> {
            pairs.iter().map(|p| (p.first().0, p.second().0)).collect()
        };
        assert_eq!(raw(&result.symmetry_pairs), vec![(1, 2)]);
        assert_eq!(raw(&result.structural_pairs), vec![(1, 3)]);
        // Only representatives 1 and 4 are compared, and 4 carries no bond.
        assert!(result.conformational_pairs.unwrap().is_empty());
    }

    #[test]
    fn disabled_passes_record_no_pairs() {
        let mut config = config(false);
        config.conformational = false;
        let result = run(
            &subjects(),
            Point3::new(5.0, 5.0, 5.0),
            &inversion(),
            &pairs(&[(2, 4)]),
            &config,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(result.symmetry_pairs.is_empty());
        assert_eq!(result.structural_pairs.len(), 1);
        assert!(result.conformational_pairs.is_none());
        assert!(result.conformational.is_none());
    }

    #[test]
    fn conformational_pass_groups_by_connectivity_only() {
        let result = run(
            &subjects(),
            Point3::new(5.0, 5.0, 5.0),
            &[],
            &pairs(&[]),
            &config(false),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(result.structural.len(), 4);
        let conformational = result.conformational.unwrap();
        assert_eq!(members(&conformational), vec![vec![1, 2, 3], vec![4]]);
    }

    #[test]
    fn translated_symmetry_operation_is_fatal_only_when_prepass_runs() {
        let shifted = vec![SymmetryOperation::new(
            -Matrix3::identity(),
            Vector3::new(0.5, 0.0, 0.0),
        )];
        let center = Point3::new(5.0, 5.0, 5.0);
        let comparator = pairs(&[]);
        let reporter = ProgressReporter::new();
        assert!(matches!(
            run(&subjects(), center, &shifted, &comparator, &config(true), &reporter),
            Err(EngineError::SymmetryTranslation { index: 0 })
        ));
        assert!(run(&subjects(), center, &shifted, &comparator, &config(false), &reporter).is_ok());
    }

    #[test]
    fn representatives_only_reach_the_comparator() {
        // A pair between a non-representative (2) and 3 is never consulted.
        let result = run(
            &subjects(),
            Point3::new(5.0, 5.0, 5.0),
            &inversion(),
            &pairs(&[(2, 3)]),
            &config(true),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(members(&result.structural), vec![vec![1, 2], vec![3], vec![4]]);
    }
}
