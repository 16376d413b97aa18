use super::ids::EntityId;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Unordered observation "`a` and `b` are structurally identical within tolerance".
///
/// Stored normalized so that `a <= b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquivalencePair<T> {
    a: T,
    b: T,
}

impl<T: EntityId> EquivalencePair<T> {
    pub fn new(x: T, y: T) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn first(&self) -> T {
        self.a
    }

    pub fn second(&self) -> T {
        self.b
    }

    pub fn contains(&self, id: T) -> bool {
        self.a == id || self.b == id
    }

    pub fn is_trivial(&self) -> bool {
        self.a == self.b
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    #[error("Entity {0} appears in more than one equivalence group")]
    DuplicateMember(String),
    #[error("Equivalence groups cannot be empty")]
    EmptyGroup,
}

/// A set of mutually equivalent entities, represented by its smallest id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceGroup<T> {
    representative: T,
    others: Vec<T>,
}

impl<T: EntityId> EquivalenceGroup<T> {
    /// Builds a group from arbitrary members; the minimum becomes the representative.
    fn from_members(members: BTreeSet<T>) -> Option<Self> {
        let mut iter = members.into_iter();
        let representative = iter.next()?;
        Some(Self {
            representative,
            others: iter.collect(),
        })
    }

    pub fn representative(&self) -> T {
        self.representative
    }

    /// Members other than the representative, ascending.
    pub fn others(&self) -> &[T] {
        &self.others
    }

    /// All members, ascending, representative first.
    pub fn members(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::once(self.representative).chain(self.others.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.others.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Partition of a universe of entities into disjoint equivalence groups,
/// ordered by representative.
#[derive(Debug, Clone)]
pub struct EquivalenceGroups<T> {
    groups: Vec<EquivalenceGroup<T>>,
    index: HashMap<T, usize>,
}

impl<T: EntityId> PartialEq for EquivalenceGroups<T> {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}

impl<T: EntityId> Eq for EquivalenceGroups<T> {}

impl<T: EntityId> Default for EquivalenceGroups<T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: EntityId> EquivalenceGroups<T> {
    /// Builds a partition from member lists, rejecting overlaps and empty groups.
    pub fn from_groups<I, G>(groups: I) -> Result<Self, PartitionError>
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = T>,
    {
        let mut built = Vec::new();
        let mut seen = BTreeSet::new();
        for group in groups {
            let mut members = BTreeSet::new();
            for id in group {
                if !seen.insert(id) {
                    return Err(PartitionError::DuplicateMember(id.to_string()));
                }
                members.insert(id);
            }
            built.push(EquivalenceGroup::from_members(members).ok_or(PartitionError::EmptyGroup)?);
        }
        built.sort_by_key(|g| g.representative);
        let index = built
            .iter()
            .enumerate()
            .flat_map(|(i, g)| g.members().map(move |id| (id, i)))
            .collect();
        Ok(Self {
            groups: built,
            index,
        })
    }

    pub fn groups(&self) -> &[EquivalenceGroup<T>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_of(&self, id: T) -> Option<&EquivalenceGroup<T>> {
        self.index.get(&id).map(|&i| &self.groups[i])
    }

    pub fn representative_of(&self, id: T) -> Option<T> {
        self.group_of(id).map(EquivalenceGroup::representative)
    }

    pub fn representatives(&self) -> Vec<T> {
        self.groups.iter().map(|g| g.representative).collect()
    }

    /// Every grouped entity, ascending.
    pub fn universe(&self) -> BTreeSet<T> {
        self.index.keys().copied().collect()
    }

    pub fn contains(&self, id: T) -> bool {
        self.index.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::MoleculeId;

    fn ids(raw: &[u32]) -> Vec<MoleculeId> {
        raw.iter().copied().map(MoleculeId).collect()
    }

    #[test]
    fn pair_is_normalized() {
        let pair = EquivalencePair::new(MoleculeId(5), MoleculeId(2));
        assert_eq!(pair.first(), MoleculeId(2));
        assert_eq!(pair.second(), MoleculeId(5));
        assert_eq!(pair, EquivalencePair::new(MoleculeId(2), MoleculeId(5)));
    }

    #[test]
    fn groups_are_sorted_by_representative_with_sorted_members() {
        let groups =
            EquivalenceGroups::from_groups(vec![ids(&[9, 4]), ids(&[3, 7, 1])]).unwrap();
        assert_eq!(groups.representatives(), ids(&[1, 4]));
        assert_eq!(groups.groups()[0].others(), ids(&[3, 7]).as_slice());
        assert_eq!(groups.representative_of(MoleculeId(9)), Some(MoleculeId(4)));
        assert_eq!(groups.universe().len(), 5);
    }

    #[test]
    fn overlapping_groups_are_rejected() {
        let result = EquivalenceGroups::from_groups(vec![ids(&[1, 2]), ids(&[2, 3])]);
        assert_eq!(result, Err(PartitionError::DuplicateMember("2".into())));
    }

    #[test]
    fn empty_groups_are_rejected() {
        let result = EquivalenceGroups::from_groups(vec![ids(&[1]), ids(&[])]);
        assert_eq!(result, Err(PartitionError::EmptyGroup));
    }
}
