//! Workflow compiler producing emission records from a workflow document.
//!
//! # Compilation Process
//!
//! 1. **Validation**: action names are unique, action types exist and none
//!    of them is a reserved control type
//! 2. **Dependency graph**: one vertex per declared action, one edge per
//!    dependency, rejecting unknown names and cycles
//! 3. **Synthesis**: rewrite the dependency graph into serial steps and
//!    matched fork/join pairs
//! 4. **Scaffolding**: attach start, end, kill and error handler
//! 5. **Resolution**: walk the graph and resolve every transition
//!
//! Phases 1 and 2 are exposed separately through
//! [`WorkflowCompiler::dependency_graph`] so callers can inspect the input
//! graph before synthesis.

use std::collections::{HashMap, HashSet};

use weft_core::config::Config;
use weft_core::{Action, Workflow};

use crate::TRACING_TARGET;
use crate::arena::{Vertex, VertexArena};
use crate::dag::Dag;
use crate::error::{GraphError, GraphResult};
use crate::record::EmissionRecord;
use crate::resolve::resolve;
use crate::scaffold::{END_NAME, START_NAME, Scaffold, ScaffoldOptions, scaffold};
use crate::synthesize::SynthesisContext;

/// The dependency graph of a workflow, before synthesis.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    arena: VertexArena,
    dag: Dag,
}

impl DependencyGraph {
    /// Returns the vertex storage.
    pub fn arena(&self) -> &VertexArena {
        &self.arena
    }

    /// Returns the graph with one edge per declared dependency.
    pub fn dag(&self) -> &Dag {
        &self.dag
    }
}

/// A fully compiled workflow.
#[derive(Debug, Clone)]
pub struct CompiledWorkflow {
    name: String,
    arena: VertexArena,
    graph: Dag,
    scaffold: Scaffold,
    records: Vec<EmissionRecord>,
}

impl CompiledWorkflow {
    /// Returns the workflow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the vertex storage.
    pub fn arena(&self) -> &VertexArena {
        &self.arena
    }

    /// Returns the final control-flow graph.
    pub fn graph(&self) -> &Dag {
        &self.graph
    }

    /// Returns handles to the start, end, kill and error-handler vertices.
    pub fn scaffold(&self) -> &Scaffold {
        &self.scaffold
    }

    /// Returns the emission records in document order.
    pub fn records(&self) -> &[EmissionRecord] {
        &self.records
    }

    /// Returns the graph edges as `(from, to)` vertex names.
    pub fn named_edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edges()
            .into_iter()
            .map(|(from, to)| (self.arena.name(from), self.arena.name(to)))
            .collect()
    }
}

/// Compiles workflows against a merged configuration.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowCompiler<'a> {
    /// Merged configuration used for action types and the kill node.
    config: &'a Config,
}

impl<'a> WorkflowCompiler<'a> {
    /// Creates a new workflow compiler.
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Compiles a workflow into its emission records.
    pub fn compile(&self, workflow: &Workflow) -> GraphResult<CompiledWorkflow> {
        let dependencies = self.dependency_graph(workflow)?;
        self.compile_graph(workflow, dependencies)
    }

    /// Validates a workflow and builds its dependency graph.
    pub fn dependency_graph(&self, workflow: &Workflow) -> GraphResult<DependencyGraph> {
        // Phase 1: Validate declared actions
        self.validate(workflow)?;

        // Phase 2: Build the dependency graph
        let mut arena = VertexArena::new();
        let mut dag = Dag::new();
        let mut ids = HashMap::with_capacity(workflow.actions.len());
        for action in &workflow.actions {
            let id = arena.insert(Vertex::action(action.clone()));
            dag.add_vertex(id);
            ids.insert(action.name.as_str(), id);
        }

        for action in &workflow.actions {
            let to = ids[action.name.as_str()];
            for dependency in &action.dependencies {
                let from = ids.get(dependency.as_str()).copied().ok_or_else(|| {
                    GraphError::MissingDependency {
                        action: action.name.clone(),
                        dependency: dependency.clone(),
                    }
                })?;
                dag.add_edge(from, to).map_err(|error| match error {
                    GraphError::Cycle { .. } => GraphError::Cycle {
                        from: dependency.clone(),
                        to: action.name.clone(),
                    },
                    other => other,
                })?;
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            workflow = %workflow.name,
            vertices = dag.vertex_count(),
            edges = dag.edge_count(),
            "built dependency graph"
        );

        Ok(DependencyGraph { arena, dag })
    }

    /// Compiles a dependency graph previously built for `workflow`.
    pub fn compile_graph(
        &self,
        workflow: &Workflow,
        dependencies: DependencyGraph,
    ) -> GraphResult<CompiledWorkflow> {
        let DependencyGraph { mut arena, dag } = dependencies;

        // Phase 3: Synthesize the structured graph
        let mut context = SynthesisContext::new(&mut arena);
        let (mut graph, body) = if dag.is_empty() {
            (Dag::new(), None)
        } else {
            let synthesized = context.synthesize(&dag)?;
            if synthesized.dag.sources() != [synthesized.entry]
                || synthesized.dag.sinks() != [synthesized.exit]
            {
                return Err(GraphError::synthesis(
                    "synthesized graph must have a single entry and exit",
                ));
            }
            (synthesized.dag, Some((synthesized.entry, synthesized.exit)))
        };
        let pairs = context.pair_count();

        // Phase 4: Attach control-flow scaffolding
        let options = ScaffoldOptions {
            workflow_name: &workflow.name,
            error_handler: workflow.error_handler.as_ref(),
            kill: self.config.kill(),
        };
        let scaffold = scaffold(&mut arena, &mut graph, body, options)?;

        // Phase 5: Resolve transitions
        let records = resolve(&arena, &graph, &scaffold, self.config)?;

        tracing::info!(
            target: TRACING_TARGET,
            workflow = %workflow.name,
            vertices = graph.vertex_count(),
            fork_join_pairs = pairs,
            records = records.len(),
            "compiled workflow"
        );

        Ok(CompiledWorkflow {
            name: workflow.name.clone(),
            arena,
            graph,
            scaffold,
            records,
        })
    }

    /// Checks names and types of the declared actions and error handler.
    fn validate(&self, workflow: &Workflow) -> GraphResult<()> {
        let mut names = HashSet::new();
        for action in workflow.actions.iter().chain(&workflow.error_handler) {
            if self.is_reserved_name(&action.name) {
                return Err(GraphError::ReservedActionName(action.name.clone()));
            }
            if !names.insert(action.name.as_str()) {
                return Err(GraphError::DuplicateAction(action.name.clone()));
            }
            self.check_type(action)?;
        }
        Ok(())
    }

    /// Returns whether `name` collides with a vertex the compiler generates:
    /// `start`, `end`, the configured kill node, or `fork-N`/`join-N`.
    fn is_reserved_name(&self, name: &str) -> bool {
        if name == START_NAME || name == END_NAME {
            return true;
        }
        if self.config.kill().is_some_and(|(kill, _)| kill == name) {
            return true;
        }
        name.strip_prefix("fork-")
            .or_else(|| name.strip_prefix("join-"))
            .is_some_and(|ordinal| {
                !ordinal.is_empty() && ordinal.bytes().all(|byte| byte.is_ascii_digit())
            })
    }

    fn check_type(&self, action: &Action) -> GraphResult<()> {
        if action.control_tag().is_some() {
            return Err(GraphError::ReservedActionType {
                action: action.name.clone(),
                action_type: action.action_type.clone(),
            });
        }
        if self.config.action_type(&action.action_type).is_none() {
            return Err(GraphError::UnknownActionType {
                action: action.name.clone(),
                action_type: action.action_type.clone(),
            });
        }
        Ok(())
    }
}
