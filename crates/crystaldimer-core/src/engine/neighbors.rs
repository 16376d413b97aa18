use super::components::{WrappedComponentPlacement, locate_placements};
use super::displacement::ShellEnumerator;
use super::distance::DistanceEvaluator;
use super::error::EngineError;
use crate::core::models::ids::MoleculeId;
use crate::core::models::lattice::{Lattice, LatticeDisplacement};
use crate::core::models::molecule::Molecule;
use crate::core::topology::covalent::BondLengthTable;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// A molecule pair proposed for evaluation: the second molecule's reference
/// placement translated by `displacement` relative to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePair {
    pub molecule_1: MoleculeId,
    pub molecule_2: MoleculeId,
    pub displacement: LatticeDisplacement,
    pub cartesian_displacement: Vector3<f64>,
}

impl CandidatePair {
    pub fn key(&self) -> (MoleculeId, MoleculeId, LatticeDisplacement) {
        (self.molecule_1, self.molecule_2, self.displacement)
    }
}

/// An accepted candidate together with its measured distance.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborRecord {
    pub candidate: CandidatePair,
    pub distance: f64,
}

impl NeighborRecord {
    pub fn key(&self) -> (MoleculeId, MoleculeId, LatticeDisplacement) {
        self.candidate.key()
    }
}

/// Everything the pair search needs to know about one molecule.
#[derive(Debug, Clone)]
pub struct SearchSubject {
    pub id: MoleculeId,
    pub placement: WrappedComponentPlacement,
    pub heavy_positions: Vec<Point3<f64>>,
}

impl SearchSubject {
    pub fn prepare(
        molecule: &Molecule,
        lattice: &Lattice,
        table: &impl BondLengthTable,
        integrality_tolerance: f64,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            id: molecule.id,
            placement: locate_placements(
                &molecule.structure,
                lattice,
                table,
                integrality_tolerance,
            )?,
            heavy_positions: molecule.structure.heavy_positions(),
        })
    }
}

/// Candidate generator for one fixed molecule pair.
///
/// Every combination of wrapped-fragment shifts gets its own shell walk; the
/// net displacement `v + s_1 - s_2` of each visited offset `v` is proposed
/// once. Repeats reuse the first verdict.
#[derive(Debug, Clone)]
pub struct PairSearch {
    lattice: Lattice,
    molecule_1: MoleculeId,
    molecule_2: MoleculeId,
    combinations: Vec<(LatticeDisplacement, LatticeDisplacement)>,
    combination: usize,
    enumerator: ShellEnumerator,
    verdicts: HashMap<LatticeDisplacement, bool>,
    pending: Option<LatticeDisplacement>,
}

impl PairSearch {
    pub fn new(
        lattice: &Lattice,
        first: (MoleculeId, &WrappedComponentPlacement),
        second: (MoleculeId, &WrappedComponentPlacement),
    ) -> Self {
        let mut search = Self {
            lattice: lattice.clone(),
            molecule_1: first.0,
            molecule_2: second.0,
            combinations: Vec::new(),
            combination: 0,
            enumerator: ShellEnumerator::new(),
            verdicts: HashMap::new(),
            pending: None,
        };
        search.retarget(first, second);
        search
    }

    /// Points the search at a new pair, keeping allocations.
    pub fn retarget(
        &mut self,
        first: (MoleculeId, &WrappedComponentPlacement),
        second: (MoleculeId, &WrappedComponentPlacement),
    ) {
        self.molecule_1 = first.0;
        self.molecule_2 = second.0;
        self.combinations.clear();
        for &s1 in first.1.shifts() {
            for &s2 in second.1.shifts() {
                self.combinations.push((s1, s2));
            }
        }
        self.combination = 0;
        self.enumerator.restart();
        self.verdicts.clear();
        self.pending = None;
    }

    fn is_self_pair(&self) -> bool {
        self.molecule_1 == self.molecule_2
    }

    /// Feeds the verdict for the previously returned candidate and produces
    /// the next one. Pass `None` on the first call; a missing verdict for a
    /// pending candidate counts as a rejection.
    pub fn advance(&mut self, accepted: Option<bool>) -> Option<CandidatePair> {
        if let Some(pending) = self.pending.take() {
            let verdict = accepted.unwrap_or(false);
            self.verdicts.insert(pending, verdict);
            if self.is_self_pair() {
                self.verdicts.insert(-pending, verdict);
            }
            self.enumerator.report(verdict);
        }

        loop {
            let &(s1, s2) = self.combinations.get(self.combination)?;
            if self.enumerator.exhausted() {
                self.combination += 1;
                self.enumerator.restart();
                continue;
            }

            let offset = self.enumerator.next_displacement();
            let displacement = offset + s1 - s2;
            if self.is_self_pair() && displacement.is_zero() {
                self.enumerator.report(true);
                continue;
            }
            if let Some(&verdict) = self.verdicts.get(&displacement) {
                self.enumerator.report(verdict);
                continue;
            }

            self.pending = Some(displacement);
            return Some(CandidatePair {
                molecule_1: self.molecule_1,
                molecule_2: self.molecule_2,
                displacement,
                cartesian_displacement: self.lattice.displacement(&displacement),
            });
        }
    }
}

/// Candidate generator over every molecule pair `(a, b)` with `a <= b`,
/// ascending, reusing one [`PairSearch`] throughout.
#[derive(Debug, Clone)]
pub struct CrystalSearch {
    placements: Vec<(MoleculeId, WrappedComponentPlacement)>,
    next_pair: (usize, usize),
    current: Option<PairSearch>,
    lattice: Lattice,
}

impl CrystalSearch {
    pub fn new(
        lattice: &Lattice,
        mut placements: Vec<(MoleculeId, WrappedComponentPlacement)>,
    ) -> Self {
        placements.sort_by_key(|(id, _)| *id);
        Self {
            placements,
            next_pair: (0, 0),
            current: None,
            lattice: lattice.clone(),
        }
    }

    fn start_next_pair(&mut self) -> bool {
        let (a, b) = self.next_pair;
        if a >= self.placements.len() {
            return false;
        }
        let first = (self.placements[a].0, &self.placements[a].1);
        let second = (self.placements[b].0, &self.placements[b].1);
        match self.current.as_mut() {
            Some(search) => search.retarget(first, second),
            None => self.current = Some(PairSearch::new(&self.lattice, first, second)),
        }
        self.next_pair = if b + 1 < self.placements.len() {
            (a, b + 1)
        } else {
            (a + 1, a + 1)
        };
        true
    }

    /// Same protocol as [`PairSearch::advance`].
    pub fn advance(&mut self, accepted: Option<bool>) -> Option<CandidatePair> {
        let mut verdict = accepted;
        loop {
            if let Some(candidate) = self.current.as_mut().and_then(|s| s.advance(verdict)) {
                return Some(candidate);
            }
            verdict = None;
            if !self.start_next_pair() {
                self.current = None;
                return None;
            }
        }
    }
}

fn drive(
    mut advance: impl FnMut(Option<bool>) -> Option<CandidatePair>,
    mut measure: impl FnMut(&CandidatePair) -> Option<f64>,
    cutoff: f64,
) -> Vec<NeighborRecord> {
    let mut records = Vec::new();
    let mut verdict = None;
    while let Some(candidate) = advance(verdict) {
        let distance = measure(&candidate).filter(|&d| d < cutoff);
        verdict = Some(distance.is_some());
        if let Some(distance) = distance {
            records.push(NeighborRecord {
                candidate,
                distance,
            });
        }
    }
    records
}

/// Accepted neighbors of one molecule pair, in discovery order.
pub fn search_pair(
    lattice: &Lattice,
    first: &SearchSubject,
    second: &SearchSubject,
    evaluator: &DistanceEvaluator,
    cutoff: f64,
) -> Vec<NeighborRecord> {
    let mut search = PairSearch::new(
        lattice,
        (first.id, &first.placement),
        (second.id, &second.placement),
    );
    drive(
        |verdict| search.advance(verdict),
        |candidate| {
            evaluator.evaluate(
                &first.heavy_positions,
                &second.heavy_positions,
                &candidate.cartesian_displacement,
            )
        },
        cutoff,
    )
}

/// Accepted neighbors of every molecule pair in a single pass.
pub fn search_crystal(
    lattice: &Lattice,
    subjects: &[SearchSubject],
    evaluator: &DistanceEvaluator,
    cutoff: f64,
) -> Vec<NeighborRecord> {
    let by_id: HashMap<MoleculeId, &SearchSubject> = subjects.iter().map(|s| (s.id, s)).collect();
    let mut search = CrystalSearch::new(
        lattice,
        subjects
            .iter()
            .map(|s| (s.id, s.placement.clone()))
            .collect(),
    );
    drive(
        |verdict| search.advance(verdict),
        |candidate| {
            let first = by_id.get(&candidate.molecule_1)?;
            let second = by_id.get(&candidate.molecule_2)?;
            evaluator.evaluate(
                &first.heavy_positions,
                &second.heavy_positions,
                &candidate.cartesian_displacement,
            )
        },
        cutoff,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::Structure;
    use crate::core::topology::covalent::CovalentRadii;
    use crate::engine::distance::DistancePolicy;
    use nalgebra::Matrix3;
    use std::collections::HashSet;

    fn cubic(edge: f64) -> Lattice {
        Lattice::new(Matrix3::from_diagonal_element(edge)).unwrap()
    }

    fn chain(id: u32, xs: &[f64], y: f64) -> Molecule {
        let elements = xs.iter().map(|_| "C".parse().unwrap()).collect();
        let positions = xs.iter().map(|&x| Point3::new(x, y, 10.0)).collect();
        let bonds: Vec<_> = (1..xs.len()).map(|i| (i - 1, i)).collect();
        Molecule::new(MoleculeId(id), Structure::new(elements, positions, &bonds).unwrap())
    }

    fn subjects(lattice: &Lattice, molecules: &[Molecule]) -> Vec<SearchSubject> {
        molecules
            .iter()
            .map(|m| SearchSubject::prepare(m, lattice, &CovalentRadii::default(), 1e-4).unwrap())
            .collect()
    }

    fn evaluator() -> DistanceEvaluator {
        DistanceEvaluator::new(DistancePolicy::NearestAtom).unwrap()
    }

    fn all_pairs(
        lattice: &Lattice,
        subjects: &[SearchSubject],
        cutoff: f64,
    ) -> Vec<NeighborRecord> {
        let mut records = Vec::new();
        for (a, first) in subjects.iter().enumerate() {
            for second in &subjects[a..] {
                records.extend(search_pair(lattice, first, second, &evaluator(), cutoff));
            }
        }
        records
    }

    #[test]
    fn adjacent_cell_contact_yields_single_record() {
        let lattice = cubic(20.0);
        let molecules = [
            chain(1, &[17.0, 18.0, 19.0], 10.0),
            chain(2, &[1.5, 2.5, 3.5], 10.0),
        ];
        let records = search_crystal(&lattice, &subjects(&lattice, &molecules), &evaluator(), 8.0);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(
            record.key(),
            (MoleculeId(1), MoleculeId(2), LatticeDisplacement::new(1, 0, 0))
        );
        assert_eq!(record.distance, 2.5);
        assert_eq!(record.candidate.cartesian_displacement, Vector3::new(20.0, 0.0, 0.0));
    }

    #[test]
    fn self_pair_never_proposes_zero_or_mirrored_displacement() {
        let lattice = cubic(6.0);
        let subject = &subjects(&lattice, &[chain(1, &[2.0, 3.5], 3.0)])[0];
        let mut search = PairSearch::new(
            &lattice,
            (subject.id, &subject.placement),
            (subject.id, &subject.placement),
        );
        let mut seen = HashSet::new();
        let mut verdict = None;
        while let Some(candidate) = search.advance(verdict) {
            assert!(!candidate.displacement.is_zero());
            assert!(!seen.contains(&(-candidate.displacement)));
            assert!(seen.insert(candidate.displacement));
            verdict = Some(candidate.displacement.reach() <= 1);
        }
        // Half of shell 1 is accepted, half of shell 2 is rejected, then the walk stops.
        assert_eq!(seen.len(), 13 + 49);
        assert!(seen.iter().all(|d| d.reach() <= 2));
    }

    #[test]
    fn generator_never_yields_the_same_key_twice() {
        let lattice = cubic(10.0);
        let molecules = [
            chain(1, &[8.0, 9.5, 11.0], 5.0),
            chain(2, &[4.0, 5.5], 5.0),
            chain(3, &[-0.5, 1.0], 8.0),
        ];
        let records = search_crystal(&lattice, &subjects(&lattice, &molecules), &evaluator(), 6.0);
        let keys: HashSet<_> = records.iter().map(NeighborRecord::key).collect();
        assert_eq!(keys.len(), records.len());
        assert!(!records.is_empty());
    }

    #[test]
    fn pair_and_crystal_variants_agree() {
        let lattice = cubic(10.0);
        let molecules = [
            chain(1, &[8.0, 9.5, 11.0], 5.0),
            chain(2, &[4.0, 5.5], 5.0),
            chain(3, &[-0.5, 1.0], 8.0),
        ];
        let prepared = subjects(&lattice, &molecules);
        let single_pass = search_crystal(&lattice, &prepared, &evaluator(), 6.0);
        let per_pair = all_pairs(&lattice, &prepared, 6.0);
        assert_eq!(single_pass, per_pair);
    }

    #[test]
    fn cutoff_is_exclusive() {
        let lattice = cubic(20.0);
        let molecules = [
            chain(1, &[17.0, 18.0, 19.0], 10.0),
            chain(2, &[1.5, 2.5, 3.5], 10.0),
        ];
        let records = search_crystal(&lattice, &subjects(&lattice, &molecules), &evaluator(), 2.5);
        assert!(records.is_empty());
    }

    #[test]
    fn missing_verdict_counts_as_rejection() {
        let lattice = cubic(20.0);
        let prepared = subjects(&lattice, &[chain(1, &[1.0, 2.5], 10.0)]);
        let mut search = CrystalSearch::new(
            &lattice,
            prepared.iter().map(|s| (s.id, s.placement.clone())).collect(),
        );
        let mut proposed = 0;
        while search.advance(None).is_some() {
            proposed += 1;
        }
        // Shell 1 of a self pair yields 13 distinct displacements before stopping.
        assert_eq!(proposed, 13);
    }
}
