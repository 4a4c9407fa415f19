//! Vertex storage.
//!
//! Every vertex of a workflow, declared or synthetic, lives in one
//! [`VertexArena`] and is referred to by its [`VertexId`]. Graphs only hold
//! ids, so subgraphs can be split and merged without touching vertex data.

use std::ops::Index;

use derive_more::{Debug, Display, From, Into};
use weft_core::{Action, ControlTag};

/// Stable identifier of a vertex within its arena.
///
/// Ids are allocated in insertion order, so declared actions sort before
/// the synthetic vertices created for them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("v{_0}")]
pub struct VertexId(usize);

impl VertexId {
    /// Returns the position of the vertex in its arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Identifier shared by a fork and its matching join.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
pub struct ForkJoinId(usize);

/// What a vertex stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexKind {
    /// Workflow entry point.
    Start,
    /// Successful termination.
    End,
    /// Failed termination with its interpolated message.
    Kill { message: String },
    /// Opens the parallel region identified by the pair id.
    Fork(ForkJoinId),
    /// Closes the parallel region identified by the pair id.
    Join(ForkJoinId),
    /// A declared action or the error handler.
    Action(Box<Action>),
}

/// A named vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    /// Name used for transitions in the emitted document.
    pub name: String,
    /// Vertex kind and payload.
    pub kind: VertexKind,
}

impl Vertex {
    /// Creates a vertex for a declared action.
    pub fn action(action: Action) -> Self {
        Self {
            name: action.name.clone(),
            kind: VertexKind::Action(Box::new(action)),
        }
    }

    /// Returns the control tag of a synthetic vertex.
    pub fn control_tag(&self) -> Option<ControlTag> {
        match self.kind {
            VertexKind::Start => Some(ControlTag::Start),
            VertexKind::End => Some(ControlTag::End),
            VertexKind::Kill { .. } => Some(ControlTag::Kill),
            VertexKind::Fork(_) => Some(ControlTag::Fork),
            VertexKind::Join(_) => Some(ControlTag::Join),
            VertexKind::Action(_) => None,
        }
    }

    /// Returns the declared action behind this vertex, if any.
    pub fn as_action(&self) -> Option<&Action> {
        match &self.kind {
            VertexKind::Action(action) => Some(action),
            _ => None,
        }
    }
}

/// Owns every vertex of one workflow.
#[derive(Debug, Clone, Default)]
pub struct VertexArena {
    vertices: Vec<Vertex>,
}

impl VertexArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a vertex and returns its id.
    pub fn insert(&mut self, vertex: Vertex) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(vertex);
        id
    }

    /// Creates a fork/join pair named `fork-N`/`join-N`.
    pub fn insert_fork_join(&mut self, pair: ForkJoinId) -> (VertexId, VertexId) {
        let fork = self.insert(Vertex {
            name: format!("fork-{pair}"),
            kind: VertexKind::Fork(pair),
        });
        let join = self.insert(Vertex {
            name: format!("join-{pair}"),
            kind: VertexKind::Join(pair),
        });
        (fork, join)
    }

    /// Returns the vertex with the given id.
    pub fn get(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    /// Returns the name of a vertex, or an empty string for unknown ids.
    pub fn name(&self, id: VertexId) -> &str {
        self.get(id).map_or("", |vertex| vertex.name.as_str())
    }

    /// Finds a vertex by name.
    pub fn find(&self, name: &str) -> Option<VertexId> {
        self.vertices
            .iter()
            .position(|vertex| vertex.name == name)
            .map(VertexId)
    }

    /// Returns the number of stored vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over all vertices with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(index, vertex)| (VertexId(index), vertex))
    }
}

impl Index<VertexId> for VertexArena {
    type Output = Vertex;

    fn index(&self, id: VertexId) -> &Self::Output {
        &self.vertices[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut arena = VertexArena::new();
        let a1 = arena.insert(Vertex::action(Action::new("a1", "java")));
        let (fork, join) = arena.insert_fork_join(ForkJoinId::from(3));

        assert!(a1 < fork && fork < join);
        assert_eq!(arena.name(fork), "fork-3");
        assert_eq!(arena.name(join), "join-3");
        assert_eq!(arena.find("a1"), Some(a1));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_control_tags() {
        let mut arena = VertexArena::new();
        let a1 = arena.insert(Vertex::action(Action::new("a1", "java")));
        let (fork, join) = arena.insert_fork_join(ForkJoinId::from(0));

        assert_eq!(arena[a1].control_tag(), None);
        assert_eq!(arena[a1].as_action().map(|a| a.name.as_str()), Some("a1"));
        assert_eq!(arena[fork].control_tag(), Some(ControlTag::Fork));
        assert_eq!(arena[join].kind, VertexKind::Join(ForkJoinId::from(0)));
    }
}
