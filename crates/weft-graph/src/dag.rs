//! Directed acyclic graph over arena vertex ids.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::arena::VertexId;
use crate::error::{GraphError, GraphResult};

/// Edge payload.
///
/// The condition is reserved for decision nodes and is never set by the
/// compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowEdge {
    /// Predicate guarding the transition.
    pub condition: Option<String>,
}

/// A mutable DAG that rejects edges closing a cycle.
///
/// Uses petgraph's `StableDiGraph` so that removing vertices keeps the
/// remaining indices valid.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    graph: StableDiGraph<VertexId, WorkflowEdge>,
    node_indices: HashMap<VertexId, NodeIndex>,
}

impl Dag {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns whether the vertex is part of the graph.
    pub fn contains(&self, id: VertexId) -> bool {
        self.node_indices.contains_key(&id)
    }

    /// Adds a vertex. Adding a vertex twice is a no-op.
    pub fn add_vertex(&mut self, id: VertexId) {
        if !self.node_indices.contains_key(&id) {
            let index = self.graph.add_node(id);
            self.node_indices.insert(id, index);
        }
    }

    /// Removes a vertex and its edges.
    pub fn remove_vertex(&mut self, id: VertexId) {
        if let Some(index) = self.node_indices.remove(&id) {
            self.graph.remove_node(index);
        }
    }

    /// Adds the edge `from -> to`.
    ///
    /// Fails with [`GraphError::Cycle`] if the edge is a self-loop or if `to`
    /// already reaches `from`. Adding an existing edge is a no-op.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> GraphResult<()> {
        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;

        if from == to || has_path_connecting(&self.graph, to_index, from_index, None) {
            return Err(GraphError::Cycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        if self.graph.find_edge(from_index, to_index).is_none() {
            self.graph
                .add_edge(from_index, to_index, WorkflowEdge::default());
        }
        Ok(())
    }

    /// Returns the number of incoming edges of a vertex.
    pub fn in_degree(&self, id: VertexId) -> usize {
        self.degree(id, Direction::Incoming)
    }

    /// Returns the number of outgoing edges of a vertex.
    pub fn out_degree(&self, id: VertexId) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    /// Returns the sources of the incoming edges, in ascending id order.
    pub fn incoming(&self, id: VertexId) -> Vec<VertexId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Returns the targets of the outgoing edges, in ascending id order.
    pub fn outgoing(&self, id: VertexId) -> Vec<VertexId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Returns all vertices in ascending id order.
    pub fn vertices(&self) -> Vec<VertexId> {
        let mut vertices: Vec<_> = self.node_indices.keys().copied().collect();
        vertices.sort_unstable();
        vertices
    }

    /// Returns all edges, sorted by source and then target.
    pub fn edges(&self) -> Vec<(VertexId, VertexId)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|edge| (self.graph[edge.source()], self.graph[edge.target()]))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Returns the vertices without incoming edges.
    pub fn sources(&self) -> Vec<VertexId> {
        self.vertices()
            .into_iter()
            .filter(|id| self.in_degree(*id) == 0)
            .collect()
    }

    /// Returns the vertices without outgoing edges.
    pub fn sinks(&self) -> Vec<VertexId> {
        self.vertices()
            .into_iter()
            .filter(|id| self.out_degree(*id) == 0)
            .collect()
    }

    /// Returns the subgraph induced by `subset`.
    ///
    /// Ids not present in this graph are ignored.
    pub fn induced(&self, subset: &BTreeSet<VertexId>) -> Self {
        let mut result = Self::new();
        for id in subset.iter().filter(|id| self.contains(**id)) {
            result.add_vertex(*id);
        }
        for (from, to) in self.edges() {
            if subset.contains(&from) && subset.contains(&to) {
                result.insert_edge_unchecked(from, to);
            }
        }
        result
    }

    /// Copies every vertex and edge of `other` into this graph.
    ///
    /// When the two graphs share no vertex the union is acyclic, so edges are
    /// copied without a reachability check. Otherwise every edge goes through
    /// [`Dag::add_edge`].
    pub fn merge(&mut self, other: &Dag) -> GraphResult<()> {
        let disjoint = other.node_indices.keys().all(|id| !self.contains(*id));
        for id in other.vertices() {
            self.add_vertex(id);
        }
        for (from, to) in other.edges() {
            if disjoint {
                self.insert_edge_unchecked(from, to);
            } else {
                self.add_edge(from, to)?;
            }
        }
        Ok(())
    }

    // Only for edges copied from a graph that is already acyclic.
    fn insert_edge_unchecked(&mut self, from: VertexId, to: VertexId) {
        if let (Some(&from), Some(&to)) = (self.node_indices.get(&from), self.node_indices.get(&to))
        {
            self.graph.add_edge(from, to, WorkflowEdge::default());
        }
    }

    fn index_of(&self, id: VertexId) -> GraphResult<NodeIndex> {
        self.node_indices
            .get(&id)
            .copied()
            .ok_or_else(|| GraphError::synthesis(format!("vertex {id} is not part of the graph")))
    }

    fn degree(&self, id: VertexId, direction: Direction) -> usize {
        self.node_indices.get(&id).map_or(0, |index| {
            self.graph.edges_directed(*index, direction).count()
        })
    }

    fn neighbors(&self, id: VertexId, direction: Direction) -> Vec<VertexId> {
        let Some(index) = self.node_indices.get(&id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<_> = self
            .graph
            .neighbors_directed(*index, direction)
            .map(|neighbor| self.graph[neighbor])
            .collect();
        neighbors.sort_unstable();
        neighbors
    }
}
