//! Prelude module for convenient imports.
//!
//! ```rust
//! use weft_oozie::prelude::*;
//! ```

pub use crate::error::{OozieError, OozieResult};
pub use crate::xml::{WorkflowXml, generation_timestamp};
