//! Prelude module for convenient imports.
//!
//! ```rust
//! use weft_core::prelude::*;
//! ```

pub use crate::config::{ActionType, Config};
pub use crate::error::{CoreError, CoreResult};
pub use crate::interpolate::Variables;
pub use crate::workflow::{Action, ActionBuilder, ControlTag, Workflow};
