use super::error::EngineError;
use crate::core::models::element::Element;
use crate::core::models::equivalence::{EquivalenceGroups, EquivalencePair};
use crate::core::models::ids::EntityId;
use crate::core::models::structure::Structure;
use petgraph::algo::is_isomorphic_matching;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{BTreeSet, HashMap, HashSet};

/// One entity handed to a comparator.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a, T> {
    pub id: T,
    pub structure: &'a Structure,
}

/// Black-box test deciding whether two entities are equivalent.
pub trait StructureComparator<T: EntityId>: Sync {
    fn equivalent(&self, first: Subject<'_, T>, second: Subject<'_, T>)
    -> Result<bool, EngineError>;
}

/// Answers from a precomputed list of equivalence pairs, typically produced
/// by an external structural-invariance tool.
#[derive(Debug, Clone)]
pub struct PairListComparator<T> {
    pairs: HashSet<EquivalencePair<T>>,
}

impl<T: EntityId> PairListComparator<T> {
    pub fn new(pairs: impl IntoIterator<Item = EquivalencePair<T>>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<T: EntityId> StructureComparator<T> for PairListComparator<T> {
    fn equivalent(
        &self,
        first: Subject<'_, T>,
        second: Subject<'_, T>,
    ) -> Result<bool, EngineError> {
        Ok(self
            .pairs
            .contains(&EquivalencePair::new(first.id, second.id)))
    }
}

/// Node label of the conformational graph: element and the number of
/// terminal hydrogens folded into the atom.
pub type ConformationalNode = (Element, usize);
pub type ConformationalGraph = UnGraph<ConformationalNode, ()>;

/// Bond graph with terminal hydrogens folded into their heavy neighbour.
///
/// A hydrogen is folded when it is bonded to exactly one atom and that atom
/// is not itself a hydrogen; any other hydrogen stays a node.
pub fn conformational_graph(structure: &Structure) -> ConformationalGraph {
    let bonds = structure.graph();
    let folded_into = |atom: NodeIndex| -> Option<NodeIndex> {
        if !bonds[atom].is_hydrogen() {
            return None;
        }
        let mut neighbors = bonds.neighbors(atom);
        match (neighbors.next(), neighbors.next()) {
            (Some(host), None) if !bonds[host].is_hydrogen() => Some(host),
            _ => None,
        }
    };

    let mut folded_counts: HashMap<NodeIndex, usize> = HashMap::new();
    let mut kept = Vec::new();
    for atom in bonds.node_indices() {
        match folded_into(atom) {
            Some(host) => *folded_counts.entry(host).or_default() += 1,
            None => kept.push(atom),
        }
    }

    let mut graph = ConformationalGraph::with_capacity(kept.len(), bonds.edge_count());
    let mut remap = HashMap::with_capacity(kept.len());
    for &atom in &kept {
        let count = folded_counts.get(&atom).copied().unwrap_or(0);
        remap.insert(atom, graph.add_node((bonds[atom].clone(), count)));
    }
    for (a, b) in structure.bonds() {
        if let (Some(&a), Some(&b)) = (
            remap.get(&NodeIndex::new(a)),
            remap.get(&NodeIndex::new(b)),
        ) {
            graph.add_edge(a, b, ());
        }
    }
    graph
}

/// Compares connectivity only: two entities match when their conformational
/// graphs are isomorphic with identical node labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConformationalComparator;

impl<T: EntityId> StructureComparator<T> for ConformationalComparator {
    fn equivalent(
        &self,
        first: Subject<'_, T>,
        second: Subject<'_, T>,
    ) -> Result<bool, EngineError> {
        let g0 = conformational_graph(first.structure);
        let g1 = conformational_graph(second.structure);
        if g0.node_count() != g1.node_count() || g0.edge_count() != g1.edge_count() {
            return Ok(false);
        }
        Ok(is_isomorphic_matching(&g0, &g1, |a, b| a == b, |_, _| true))
    }
}

/// Expands every group of `grouped` by the `base` equivalents of its members.
///
/// `grouped` usually partitions the representatives of `base`; `base` groups
/// no member of `grouped` touches are kept as they are.
pub fn merge_groups<T: EntityId>(
    grouped: &EquivalenceGroups<T>,
    base: &EquivalenceGroups<T>,
) -> Result<EquivalenceGroups<T>, EngineError> {
    let mut absorbed = HashSet::new();
    let mut merged: Vec<BTreeSet<T>> = Vec::with_capacity(grouped.len());
    for group in grouped.groups() {
        let mut members = BTreeSet::new();
        for member in group.members() {
            match base.group_of(member) {
                Some(equivalents) => {
                    absorbed.insert(equivalents.representative());
                    members.extend(equivalents.members());
                }
                None => {
                    members.insert(member);
                }
            }
        }
        merged.push(members);
    }
    merged.extend(
        base.groups()
            .iter()
            .filter(|g| !absorbed.contains(&g.representative()))
            .map(|g| g.members().collect()),
    );
    Ok(EquivalenceGroups::from_groups(merged)?)
}
