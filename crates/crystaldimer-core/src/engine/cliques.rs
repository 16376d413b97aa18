use super::error::EngineError;
use crate::core::models::equivalence::{EquivalenceGroups, EquivalencePair};
use crate::core::models::ids::EntityId;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Groups `universe` into cliques of the equivalence graph given by `pairs`.
///
/// Pairs are visited in ascending order. An entity joins an existing group
/// only if it is paired with every current member; entities left over become
/// singletons. The result partitions `universe` exactly.
pub fn build_cliques<T: EntityId>(
    pairs: impl IntoIterator<Item = EquivalencePair<T>>,
    universe: &BTreeSet<T>,
) -> Result<EquivalenceGroups<T>, EngineError> {
    let mut sorted: Vec<_> = pairs.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    for pair in &sorted {
        if !universe.contains(&pair.first()) || !universe.contains(&pair.second()) {
            return Err(EngineError::PairOutsideUniverse {
                first: pair.first().to_string(),
                second: pair.second().to_string(),
            });
        }
    }
    let declared: HashSet<EquivalencePair<T>> = sorted.iter().copied().collect();

    let mut groups: Vec<Vec<T>> = Vec::new();
    let mut index: HashMap<T, usize> = HashMap::new();
    for pair in sorted.iter().filter(|p| !p.is_trivial()) {
        let (a, b) = (pair.first(), pair.second());
        match (index.get(&a).copied(), index.get(&b).copied()) {
            (Some(_), Some(_)) => {}
            (Some(group), None) | (None, Some(group)) => {
                let newcomer = if index.contains_key(&a) { b } else { a };
                let joins = groups[group]
                    .iter()
                    .all(|&member| declared.contains(&EquivalencePair::new(member, newcomer)));
                if joins {
                    groups[group].push(newcomer);
                    index.insert(newcomer, group);
                }
            }
            (None, None) => {
                index.insert(a, groups.len());
                index.insert(b, groups.len());
                groups.push(vec![a, b]);
            }
        }
    }

    let singletons = universe.iter().filter(|id| !index.contains_key(id)).count();
    debug!(
        pairs = sorted.len(),
        cliques = groups.len(),
        singletons,
        "Clique construction finished."
    );
    groups.extend(
        universe
            .iter()
            .filter(|id| !index.contains_key(id))
            .map(|&id| vec![id]),
    );

    let partition = EquivalenceGroups::from_groups(groups)?;
    if partition.universe() != *universe {
        return Err(EngineError::UniverseMismatch {
            reason: format!(
                "{} entities grouped, {} declared",
                partition.universe().len(),
                universe.len()
            ),
        });
    }
    Ok(partition)
}
