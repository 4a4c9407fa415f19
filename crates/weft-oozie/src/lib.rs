#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod dot;
mod error;
mod xml;

#[doc(hidden)]
pub mod prelude;

pub use error::{OozieError, OozieResult};
pub use xml::{WORKFLOW_NAMESPACE, WorkflowXml, generation_timestamp};

/// Tracing target for XML and Graphviz output.
pub const TRACING_TARGET: &str = "weft_oozie";
