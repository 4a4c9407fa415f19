//! Action-type configuration.
//!
//! A [`Config`] document declares the action types workflows may use and,
//! optionally, the kill node every workflow receives. Several documents are
//! combined with [`merge`] before compilation.

mod merge;

use indexmap::IndexMap;
pub use merge::merge;
use serde::{Deserialize, Serialize};

/// Definition of a user action type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionType {
    /// Name that actions refer to in their `type` field.
    pub name: String,
    /// XML element wrapping the action's arguments.
    pub tag: String,
    /// Namespace attribute of the inner element, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xmlns: Option<String>,
    /// Argument elements emitted for every action of this type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub default_args: IndexMap<String, Vec<String>>,
    /// Configuration properties emitted for every action of this type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
    /// Fallback values for `$$name$$` tokens.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub default_interpolations: IndexMap<String, String>,
    /// Index among the argument elements where the configuration block goes.
    #[serde(default)]
    pub configuration_position: usize,
    /// Whether this definition came from a low-precedence source.
    #[serde(skip)]
    pub low_precedence: bool,
}

impl ActionType {
    /// Creates an action type with only a name and tag.
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            ..Default::default()
        }
    }
}

/// A configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Declared action types.
    #[serde(default)]
    pub action_types: Vec<ActionType>,
    /// Name of the kill node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_name: Option<String>,
    /// Message of the kill node; may reference `$$name$$`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_message: Option<String>,
}

impl Config {
    /// Looks up an action type by exact name.
    pub fn action_type(&self, name: &str) -> Option<&ActionType> {
        self.action_types.iter().find(|t| t.name == name)
    }

    /// Returns the kill node name and message when both are configured.
    pub fn kill(&self) -> Option<(&str, &str)> {
        match (&self.kill_name, &self.kill_message) {
            (Some(name), Some(message)) => Some((name, message)),
            _ => None,
        }
    }

    /// Marks every action type as coming from a low-precedence source.
    pub fn into_low_precedence(mut self) -> Self {
        for action_type in &mut self.action_types {
            action_type.low_precedence = true;
        }
        self
    }
}
