//! Structured graph synthesis.
//!
//! Rewrites an arbitrary dependency DAG into a graph made only of serial
//! steps and matched fork/join pairs:
//!
//! - several weakly connected components are synthesized one by one and
//!   wrapped in an outer fork/join pair;
//! - a single component is peeled: its sources become a serial step (one
//!   source) or a parallel layer (several), then the next wavefront of the
//!   remainder is peeled the same way. A remainder that splits into several
//!   components is synthesized as independent branches and spliced after
//!   the last layer.
//!
//! The result always has exactly one entry and one exit vertex.

use crate::TRACING_TARGET;
use crate::arena::{ForkJoinId, VertexArena, VertexId};
use crate::component::connected_components;
use crate::dag::Dag;
use crate::error::{GraphError, GraphResult};

/// A synthesized graph together with its unique entry and exit.
#[derive(Debug, Clone)]
pub struct Synthesized {
    /// The structured graph.
    pub dag: Dag,
    /// The only vertex without incoming edges.
    pub entry: VertexId,
    /// The only vertex without outgoing edges.
    pub exit: VertexId,
}

/// State shared by one top-level synthesis.
///
/// Owns the fork/join counter, so pairs are numbered `0, 1, 2, ...` in
/// creation order within a workflow. Components are synthesized before the
/// fork that wraps them, and a layer's fork is created before its remainder.
pub struct SynthesisContext<'a> {
    arena: &'a mut VertexArena,
    next_pair: usize,
}

impl<'a> SynthesisContext<'a> {
    /// Creates a context allocating synthetic vertices in `arena`.
    pub fn new(arena: &'a mut VertexArena) -> Self {
        Self {
            arena,
            next_pair: 0,
        }
    }

    /// Returns the number of fork/join pairs created so far.
    pub fn pair_count(&self) -> usize {
        self.next_pair
    }

    /// Synthesizes a structured graph from a non-empty acyclic graph.
    pub fn synthesize(&mut self, input: &Dag) -> GraphResult<Synthesized> {
        let components = connected_components(input);

        let mut parts = Vec::with_capacity(components.len());
        for component in &components {
            parts.push(self.peel(input.induced(component))?);
        }

        match parts.len() {
            0 => Err(GraphError::synthesis("cannot synthesize an empty graph")),
            1 => parts
                .pop()
                .ok_or_else(|| GraphError::synthesis("component vanished during synthesis")),
            _ => {
                let mut dag = Dag::new();
                for part in &parts {
                    dag.merge(&part.dag)?;
                }

                let (fork, join) = self.fork_join();
                dag.add_vertex(fork);
                dag.add_vertex(join);
                for part in &parts {
                    dag.add_edge(fork, part.entry)?;
                    dag.add_edge(part.exit, join)?;
                }

                tracing::trace!(
                    target: TRACING_TARGET,
                    fork = self.arena.name(fork),
                    branches = parts.len(),
                    "wrapped independent branches"
                );

                Ok(Synthesized {
                    dag,
                    entry: fork,
                    exit: join,
                })
            }
        }
    }

    /// Peels the sources off a connected component, layer by layer.
    ///
    /// Layers are chained in place while the remainder stays connected.
    /// Once it splits, the remainder is synthesized as independent branches
    /// and spliced after the last layer.
    fn peel(&mut self, mut remaining: Dag) -> GraphResult<Synthesized> {
        let mut dag = Dag::new();
        let mut entry = None;
        let mut exit = None;

        loop {
            let wavefront = remaining.sources();
            let (layer_entry, layer_exit) = self.layer(&mut dag, &wavefront)?;
            match exit {
                Some(previous) => dag.add_edge(previous, layer_entry)?,
                None => entry = Some(layer_entry),
            }
            exit = Some(layer_exit);

            for id in &wavefront {
                remaining.remove_vertex(*id);
            }
            if remaining.is_empty() {
                break;
            }

            if connected_components(&remaining).len() > 1 {
                let rest = self.synthesize(&remaining)?;
                dag.merge(&rest.dag)?;
                dag.add_edge(layer_exit, rest.entry)?;
                exit = Some(rest.exit);
                break;
            }
        }

        match (entry, exit) {
            (Some(entry), Some(exit)) => Ok(Synthesized { dag, entry, exit }),
            _ => Err(GraphError::synthesis("component produced no layer")),
        }
    }

    /// Adds one wavefront to `dag` as a serial step or a parallel layer.
    fn layer(
        &mut self,
        dag: &mut Dag,
        wavefront: &[VertexId],
    ) -> GraphResult<(VertexId, VertexId)> {
        match wavefront {
            [] => Err(GraphError::synthesis(
                "component has no vertex without dependencies",
            )),
            [single] => {
                dag.add_vertex(*single);
                Ok((*single, *single))
            }
            layer => {
                let (fork, join) = self.fork_join();
                dag.add_vertex(fork);
                dag.add_vertex(join);
                for id in layer {
                    dag.add_vertex(*id);
                    dag.add_edge(fork, *id)?;
                    dag.add_edge(*id, join)?;
                }

                tracing::trace!(
                    target: TRACING_TARGET,
                    fork = self.arena.name(fork),
                    width = layer.len(),
                    "created parallel layer"
                );

                Ok((fork, join))
            }
        }
    }

    fn fork_join(&mut self) -> (VertexId, VertexId) {
        let pair = ForkJoinId::from(self.next_pair);
        self.next_pair += 1;
        self.arena.insert_fork_join(pair)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use weft_core::Action;

    use super::*;
    use crate::arena::{Vertex, VertexKind};

    /// Builds an arena and input graph from `(name, dependencies)` pairs.
    fn input(actions: &[(&str, &[&str])]) -> (VertexArena, Dag) {
        let mut arena = VertexArena::new();
        let mut dag = Dag::new();
        for (name, _) in actions {
            let id = arena.insert(Vertex::action(Action::new(*name, "test")));
            dag.add_vertex(id);
        }
        for (name, dependencies) in actions {
            let to = arena.find(name).unwrap();
            for dependency in *dependencies {
                dag.add_edge(arena.find(dependency).unwrap(), to).unwrap();
            }
        }
        (arena, dag)
    }

    fn edges(arena: &VertexArena, synthesized: &Synthesized) -> BTreeSet<String> {
        synthesized
            .dag
            .edges()
            .into_iter()
            .map(|(from, to)| format!("{}:{}", arena.name(from), arena.name(to)))
            .collect()
    }

    fn expected(edges: &[&str]) -> BTreeSet<String> {
        edges.iter().map(|edge| edge.to_string()).collect()
    }

    fn run(actions: &[(&str, &[&str])]) -> (VertexArena, Synthesized) {
        let (mut arena, dag) = input(actions);
        let synthesized = SynthesisContext::new(&mut arena).synthesize(&dag).unwrap();
        (arena, synthesized)
    }

    #[test]
    fn test_single_action() {
        let (arena, result) = run(&[("a1", &[])]);
        assert_eq!(result.dag.vertex_count(), 1);
        assert_eq!(arena.name(result.entry), "a1");
        assert_eq!(result.entry, result.exit);
    }

    #[test]
    fn test_no_dependencies() {
        let (arena, result) = run(&[("a1", &[]), ("a2", &[]), ("a3", &[])]);

        assert_eq!(
            edges(&arena, &result),
            expected(&[
                "fork-0:a1", "fork-0:a2", "fork-0:a3", "a1:join-0", "a2:join-0", "a3:join-0",
            ])
        );
        assert_eq!(arena.name(result.entry), "fork-0");
        assert_eq!(arena.name(result.exit), "join-0");
    }

    #[test]
    fn test_chain() {
        let (arena, result) = run(&[("a1", &[]), ("a2", &["a1"]), ("a3", &["a2"])]);

        assert_eq!(edges(&arena, &result), expected(&["a1:a2", "a2:a3"]));
        assert_eq!(arena.name(result.entry), "a1");
        assert_eq!(arena.name(result.exit), "a3");
    }

    #[test]
    fn test_two_branch_merge() {
        let (arena, result) = run(&[("a1", &[]), ("a2", &[]), ("a3", &["a1", "a2"])]);

        assert_eq!(
            edges(&arena, &result),
            expected(&["fork-0:a1", "fork-0:a2", "a1:join-0", "a2:join-0", "join-0:a3"])
        );
    }

    #[test]
    fn test_single_start_node() {
        let (arena, result) = run(&[("a1", &[]), ("a2", &["a1"]), ("a3", &["a1"])]);

        assert_eq!(
            edges(&arena, &result),
            expected(&["a1:fork-0", "fork-0:a2", "fork-0:a3", "a2:join-0", "a3:join-0"])
        );
        assert_eq!(arena.name(result.entry), "a1");
        assert_eq!(arena.name(result.exit), "join-0");
    }

    #[test]
    fn test_disconnected_then_joined() {
        let (arena, result) = run(&[("a1", &[]), ("a2", &[]), ("a3", &["a2"])]);

        assert_eq!(
            edges(&arena, &result),
            expected(&["fork-0:a1", "fork-0:a2", "a2:a3", "a1:join-0", "a3:join-0"])
        );
    }

    #[test]
    fn test_inner_pairs_are_numbered_first() {
        // Two independent diamonds: each gets its own inner pair, then the
        // outer pair wrapping both is created last.
        let (arena, result) = run(&[
            ("a1", &[]),
            ("a2", &["a1"]),
            ("a3", &["a1"]),
            ("b1", &[]),
            ("b2", &["b1"]),
            ("b3", &["b1"]),
        ]);

        assert_eq!(arena.name(result.entry), "fork-2");
        assert_eq!(arena.name(result.exit), "join-2");
        assert!(edges(&arena, &result).contains("a1:fork-0"));
        assert!(edges(&arena, &result).contains("b1:fork-1"));
    }

    #[test]
    fn test_single_entry_and_exit() {
        let (_, result) = run(&[
            ("a1", &[]),
            ("a2", &["a1"]),
            ("a3", &[]),
            ("a4", &["a2", "a3"]),
            ("a5", &["a1"]),
            ("a6", &["a4", "a5"]),
            ("a7", &[]),
        ]);

        assert_eq!(result.dag.sources(), [result.entry]);
        assert_eq!(result.dag.sinks(), [result.exit]);
    }

    #[test]
    fn test_every_fork_has_matching_join() {
        let (arena, result) = run(&[
            ("a1", &[]),
            ("a2", &[]),
            ("a3", &["a1"]),
            ("a4", &["a1", "a2"]),
            ("a5", &["a3", "a4"]),
        ]);

        let names: BTreeSet<_> = result
            .dag
            .vertices()
            .into_iter()
            .map(|id| arena.name(id).to_owned())
            .collect();
        for name in names.iter().filter(|name| name.starts_with("fork-")) {
            assert!(names.contains(&name.replace("fork", "join")));
        }
    }

    #[test]
    fn test_empty_graph_is_rejected() {
        let mut arena = VertexArena::new();
        let result = SynthesisContext::new(&mut arena).synthesize(&Dag::new());
        assert!(matches!(result, Err(GraphError::GraphSynthesis(_))));
    }

    /// Deterministic xorshift generator for reproducible random graphs.
    struct XorShift(u64);

    impl XorShift {
        fn next(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }
    }

    /// Builds a random DAG where action `i` may depend on any action `j < i`.
    fn random_input(rng: &mut XorShift) -> (VertexArena, Dag, Vec<(VertexId, VertexId)>) {
        let count = 1 + (rng.next() % 12) as usize;
        let mut arena = VertexArena::new();
        let mut dag = Dag::new();
        let ids: Vec<_> = (0..count)
            .map(|index| {
                let id = arena.insert(Vertex::action(Action::new(format!("a{index}"), "test")));
                dag.add_vertex(id);
                id
            })
            .collect();

        let mut dependencies = Vec::new();
        for to in 1..count {
            for from in 0..to {
                if rng.next() % 4 == 0 {
                    dag.add_edge(ids[from], ids[to]).unwrap();
                    dependencies.push((ids[from], ids[to]));
                }
            }
        }
        (arena, dag, dependencies)
    }

    fn reaches(dag: &Dag, from: VertexId, to: VertexId) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if seen.insert(id) {
                stack.extend(dag.outgoing(id));
            }
        }
        false
    }

    /// Vertices reachable from `from` without passing through `stop`.
    fn region(dag: &Dag, from: VertexId, stop: VertexId) -> BTreeSet<VertexId> {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(id) = stack.pop() {
            if id != stop && seen.insert(id) {
                stack.extend(dag.outgoing(id));
            }
        }
        seen
    }

    #[test]
    fn test_generated_graphs_keep_structure() {
        let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);

        for _ in 0..300 {
            let (mut arena, input, dependencies) = random_input(&mut rng);
            let result = SynthesisContext::new(&mut arena).synthesize(&input).unwrap();
            let graph = &result.dag;

            assert_eq!(graph.sources(), [result.entry]);
            assert_eq!(graph.sinks(), [result.exit]);

            for (from, to) in &dependencies {
                assert!(
                    reaches(graph, *from, *to),
                    "dependency {} -> {} lost",
                    arena.name(*from),
                    arena.name(*to)
                );
            }

            for id in graph.vertices() {
                match arena[id].kind {
                    VertexKind::Fork(pair) => {
                        let join = graph
                            .vertices()
                            .into_iter()
                            .find(|other| arena[*other].kind == VertexKind::Join(pair))
                            .unwrap_or_else(|| panic!("{} has no join", arena.name(id)));

                        for branch in graph.outgoing(id) {
                            for inner in region(graph, branch, join) {
                                assert!(
                                    graph.out_degree(inner) > 0 && reaches(graph, inner, join),
                                    "{} escapes {}",
                                    arena.name(inner),
                                    arena.name(id)
                                );
                            }
                        }
                    }
                    VertexKind::Join(_) => {}
                    _ => {
                        assert!(graph.in_degree(id) <= 1, "{} has several inputs", arena.name(id));
                        assert!(graph.out_degree(id) <= 1, "{} has several outputs", arena.name(id));
                    }
                }
            }
        }
    }

    #[test]
    fn test_long_chain() {
        let mut arena = VertexArena::new();
        let mut dag = Dag::new();
        let mut previous = None;
        for index in 0..1000 {
            let id = arena.insert(Vertex::action(Action::new(format!("a{index}"), "test")));
            dag.add_vertex(id);
            if let Some(previous) = previous {
                dag.add_edge(previous, id).unwrap();
            }
            previous = Some(id);
        }

        let mut context = SynthesisContext::new(&mut arena);
        let result = context.synthesize(&dag).unwrap();

        assert_eq!(context.pair_count(), 0);
        assert_eq!(result.dag.vertex_count(), 1000);
        assert_eq!(result.dag.edge_count(), 999);
        assert_eq!(result.entry, VertexId::from(0));
        assert_eq!(result.exit, VertexId::from(999));
    }
}
