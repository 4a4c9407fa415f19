#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod config;
mod error;
mod interpolate;
pub mod reader;
mod workflow;

#[doc(hidden)]
pub mod prelude;

pub use error::{CoreError, CoreResult};
pub use interpolate::Variables;
pub use workflow::{Action, ActionBuildError, ActionBuilder, ControlTag, Workflow};

/// Tracing target for document loading and configuration merging.
pub const TRACING_TARGET: &str = "weft_core";
