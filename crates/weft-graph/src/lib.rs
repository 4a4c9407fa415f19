#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod arena;
mod compiler;
mod component;
pub mod dag;
mod error;
mod record;
mod resolve;
mod scaffold;
mod synthesize;

#[doc(hidden)]
pub mod prelude;

pub use compiler::{CompiledWorkflow, DependencyGraph, WorkflowCompiler};
pub use component::connected_components;
pub use error::{GraphError, GraphResult};
pub use record::{ActionElement, ActionRecord, EmissionRecord};
pub use resolve::resolve;
pub use scaffold::{Scaffold, ScaffoldOptions, scaffold};
pub use synthesize::{SynthesisContext, Synthesized};

/// Tracing target for graph synthesis and transition resolution.
pub const TRACING_TARGET: &str = "weft_graph";
