//! Start, end, kill and error-handler wiring.

use weft_core::{Action, Variables};

use crate::TRACING_TARGET;
use crate::arena::{Vertex, VertexArena, VertexId, VertexKind};
use crate::dag::Dag;
use crate::error::GraphResult;

/// Name of the synthetic start vertex.
pub(crate) const START_NAME: &str = "start";
/// Name of the synthetic end vertex.
pub(crate) const END_NAME: &str = "end";

/// Inputs to [`scaffold`] beyond the synthesized graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaffoldOptions<'a> {
    /// Workflow name, available as `$$name$$` in the kill message.
    pub workflow_name: &'a str,
    /// Action inserted between the synthesized exit and `end`.
    pub error_handler: Option<&'a Action>,
    /// Kill node name and message template.
    pub kill: Option<(&'a str, &'a str)>,
}

/// Handles to the vertices created by [`scaffold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scaffold {
    /// Entry of the finished graph.
    pub start: VertexId,
    /// Successful termination.
    pub end: VertexId,
    /// Kill node, present only when both name and message are configured.
    pub kill: Option<VertexId>,
    /// Error handler vertex, if the workflow declares one.
    pub error_handler: Option<VertexId>,
}

/// Attaches control-flow scaffolding around a synthesized body.
///
/// Wires `start -> entry` and `exit -> [error handler ->] end`. Without a
/// body, `start` leads straight to the error handler or `end`. The kill
/// vertex gets no edges; it is only referenced as an error target.
pub fn scaffold(
    arena: &mut VertexArena,
    dag: &mut Dag,
    body: Option<(VertexId, VertexId)>,
    options: ScaffoldOptions<'_>,
) -> GraphResult<Scaffold> {
    let start = insert(arena, dag, START_NAME, VertexKind::Start);
    let end = insert(arena, dag, END_NAME, VertexKind::End);

    let exit = match body {
        Some((entry, exit)) => {
            dag.add_edge(start, entry)?;
            exit
        }
        None => start,
    };

    let error_handler = match options.error_handler {
        Some(action) => {
            let id = arena.insert(Vertex::action(action.clone()));
            dag.add_vertex(id);
            dag.add_edge(exit, id)?;
            dag.add_edge(id, end)?;
            Some(id)
        }
        None => {
            dag.add_edge(exit, end)?;
            None
        }
    };

    let kill = options.kill.map(|(name, message)| {
        let message = Variables::new()
            .with_value("name", options.workflow_name)
            .interpolate(message);
        insert(arena, dag, name, VertexKind::Kill { message })
    });

    tracing::trace!(
        target: TRACING_TARGET,
        workflow = options.workflow_name,
        error_handler = error_handler.is_some(),
        kill = kill.is_some(),
        "attached control-flow scaffolding"
    );

    Ok(Scaffold {
        start,
        end,
        kill,
        error_handler,
    })
}

fn insert(arena: &mut VertexArena, dag: &mut Dag, name: &str, kind: VertexKind) -> VertexId {
    let id = arena.insert(Vertex {
        name: name.to_owned(),
        kind,
    });
    dag.add_vertex(id);
    id
}
