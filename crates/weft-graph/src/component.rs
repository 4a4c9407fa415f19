//! Weakly connected components.

use std::collections::{BTreeSet, HashMap};

use petgraph::unionfind::UnionFind;

use crate::arena::VertexId;
use crate::dag::Dag;

/// Partitions the vertices of `dag` into weakly connected components.
///
/// Edge direction is ignored. Components are returned in the order of their
/// smallest vertex id, which keeps fork numbering reproducible.
pub fn connected_components(dag: &Dag) -> Vec<BTreeSet<VertexId>> {
    let vertices = dag.vertices();
    let position: HashMap<VertexId, usize> = vertices
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect();

    let mut sets = UnionFind::<usize>::new(vertices.len());
    for (from, to) in dag.edges() {
        if let (Some(&from), Some(&to)) = (position.get(&from), position.get(&to)) {
            sets.union(from, to);
        }
    }

    let mut components: Vec<BTreeSet<VertexId>> = Vec::new();
    let mut by_root: HashMap<usize, usize> = HashMap::new();
    for (index, id) in vertices.iter().enumerate() {
        let slot = *by_root.entry(sets.find(index)).or_insert_with(|| {
            components.push(BTreeSet::new());
            components.len() - 1
        });
        components[slot].insert(*id);
    }
    components
}
