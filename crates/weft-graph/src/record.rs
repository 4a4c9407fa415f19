//! Records emitted by transition resolution.

use indexmap::IndexMap;

/// One element of the emitted workflow, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmissionRecord {
    /// `<start to="..."/>`
    Start { to: String },
    /// `<fork name="..">` with one path per branch.
    Fork { name: String, paths: Vec<String> },
    /// `<join name=".." to=".."/>`
    Join { name: String, to: String },
    /// A declared action or the error handler.
    Action(ActionRecord),
    /// `<kill name=".."><message>..</message></kill>`
    Kill { name: String, message: String },
    /// `<end name=".."/>`
    End { name: String },
}

impl EmissionRecord {
    /// Returns the `name` attribute of the element, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Start { .. } => None,
            Self::Fork { name, .. }
            | Self::Join { name, .. }
            | Self::Kill { name, .. }
            | Self::End { name } => Some(name),
            Self::Action(action) => Some(&action.name),
        }
    }

    /// Returns the action record, if this is an action.
    pub fn as_action(&self) -> Option<&ActionRecord> {
        match self {
            Self::Action(action) => Some(action),
            _ => None,
        }
    }
}

/// Resolved action with its transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    /// Action name.
    pub name: String,
    /// Element wrapping the arguments, from the action type.
    pub tag: String,
    /// Namespace of the wrapping element.
    pub xmlns: Option<String>,
    /// Argument elements with the configuration block in place.
    pub elements: Vec<ActionElement>,
    /// Success transition target.
    pub ok: String,
    /// Error transition target.
    pub error: String,
}

/// Child of an action's wrapping element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionElement {
    /// One `<name>value</name>` element per value.
    Argument { name: String, values: Vec<String> },
    /// `<configuration>` block of name/value properties.
    Configuration(IndexMap<String, String>),
}
