//! Graphviz export of workflow graphs.
//!
//! The DOT output is a pure projection: vertices are labelled with their
//! names and edges carry no label. Rendering shells out to the `dot`
//! executable, which writes `<file>.<format>` next to the DOT file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;
use weft_graph::arena::VertexArena;
use weft_graph::dag::Dag;

use crate::TRACING_TARGET;
use crate::error::{OozieError, OozieResult};

/// Output format used when none is requested.
pub const DEFAULT_FORMAT: &str = "svg";

/// Projects a graph onto DOT source.
pub fn to_dot(arena: &VertexArena, dag: &Dag) -> String {
    let mut graph = DiGraph::<&str, &str>::with_capacity(dag.vertex_count(), dag.edge_count());
    let nodes: HashMap<_, _> = dag
        .vertices()
        .into_iter()
        .map(|id| (id, graph.add_node(arena.name(id))))
        .collect();
    for (from, to) in dag.edges() {
        graph.add_edge(nodes[&from], nodes[&to], "");
    }

    Dot::with_config(&graph, &[Config::EdgeNoLabel]).to_string()
}

/// Writes the DOT source of a graph to `path`.
pub fn write_dot(path: &Path, arena: &VertexArena, dag: &Dag) -> OozieResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| OozieError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, to_dot(arena, dag)).map_err(|source| OozieError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        target: TRACING_TARGET,
        path = %path.display(),
        vertices = dag.vertex_count(),
        "wrote graphviz file"
    );
    Ok(())
}

/// Renders a DOT file with `dot -T<format> <path> -O`.
pub fn render(path: &Path, format: &str) -> OozieResult<()> {
    let status = Command::new("dot")
        .arg(format!("-T{format}"))
        .arg(path)
        .arg("-O")
        .status()
        .map_err(|source| OozieError::Render {
            path: path.to_path_buf(),
            source,
        })?;

    if !status.success() {
        return Err(OozieError::RenderStatus {
            path: path.to_path_buf(),
            status,
        });
    }

    tracing::debug!(
        target: TRACING_TARGET,
        path = %path.display(),
        format,
        "rendered graphviz file"
    );
    Ok(())
}

/// Writes a graph to `path` and renders it when a format is given.
///
/// Failures are logged and swallowed; visualization never aborts the
/// compilation of a workflow.
pub fn export(path: &Path, arena: &VertexArena, dag: &Dag, format: Option<&str>) {
    let result = write_dot(path, arena, dag)
        .and_then(|()| format.map_or(Ok(()), |format| render(path, format)));

    if let Err(error) = result {
        tracing::warn!(
            target: TRACING_TARGET,
            path = %path.display(),
            error = %error,
            "graphviz export failed"
        );
    }
}
