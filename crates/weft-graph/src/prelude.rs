//! Prelude module for convenient imports.
//!
//! ```rust
//! use weft_graph::prelude::*;
//! ```

pub use crate::arena::{ForkJoinId, Vertex, VertexArena, VertexId, VertexKind};
pub use crate::compiler::{CompiledWorkflow, DependencyGraph, WorkflowCompiler};
pub use crate::dag::Dag;
pub use crate::error::{GraphError, GraphResult};
pub use crate::record::{ActionElement, ActionRecord, EmissionRecord};
