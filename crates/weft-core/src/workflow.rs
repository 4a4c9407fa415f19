//! Workflow documents and the actions they declare.

use std::collections::BTreeSet;

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString, IntoStaticStr};

/// Action types reserved for synthetic control vertices.
///
/// Declared actions never use these types; the compiler inserts them while
/// building the control-flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, IntoStaticStr, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ControlTag {
    /// Workflow entry point.
    Start,
    /// Successful workflow termination.
    End,
    /// Opens a parallel region.
    Fork,
    /// Closes the parallel region opened by its paired fork.
    Join,
    /// Failed workflow termination carrying a message.
    Kill,
}

impl ControlTag {
    /// Parses an action type name, returning `None` for user-defined types.
    pub fn from_type(action_type: &str) -> Option<Self> {
        action_type.parse().ok()
    }

    /// Returns the tag as it appears in emitted XML.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Error type for [`ActionBuilder`].
pub type ActionBuildError = derive_builder::UninitializedFieldError;

/// A single named step of a workflow.
///
/// Equality compares every field. Map fields keep their declaration order
/// for output but compare independently of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(
    name = "ActionBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(private, name = "build_inner", error = "ActionBuildError")
)]
pub struct Action {
    /// Name, unique within the workflow.
    pub name: String,
    /// Name of the action type this action instantiates.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Names of the actions that must complete before this one starts.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    #[builder(default)]
    pub dependencies: BTreeSet<String>,
    /// Dependencies guarded by a predicate expression.
    ///
    /// Parsed and carried along, but not used when building the graph.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub conditional_dependencies: IndexMap<String, String>,
    /// Overrides the computed success transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub force_ok: Option<String>,
    /// Overrides the computed error transition; may reference `$$okTransition$$`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub force_error: Option<String>,
    /// Argument elements emitted after the action type's defaults.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub positional_args: IndexMap<String, Vec<String>>,
    /// Values substituted into `$$name$$` tokens.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub named_args: IndexMap<String, String>,
    /// Properties overlaid on the action type's configuration.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub configuration_properties: IndexMap<String, String>,
}

impl ActionBuilder {
    /// Adds a single dependency.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies
            .get_or_insert_with(BTreeSet::new)
            .insert(name.into());
        self
    }

    /// Adds a single named argument.
    pub fn with_named_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.named_args
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds a positional argument with its values.
    pub fn with_positional_arg<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positional_args
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a single configuration property.
    pub fn with_configuration_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.configuration_properties
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builds the action.
    pub fn build(self) -> Result<Action, ActionBuildError> {
        self.build_inner()
    }
}

impl Action {
    /// Creates an action with no dependencies or arguments.
    pub fn new(name: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action_type: action_type.into(),
            dependencies: BTreeSet::new(),
            conditional_dependencies: IndexMap::new(),
            force_ok: None,
            force_error: None,
            positional_args: IndexMap::new(),
            named_args: IndexMap::new(),
            configuration_properties: IndexMap::new(),
        }
    }

    /// Creates a builder for an action.
    pub fn builder() -> ActionBuilder {
        ActionBuilder::default()
    }

    /// Returns the control tag if this action's type is reserved.
    pub fn control_tag(&self) -> Option<ControlTag> {
        ControlTag::from_type(&self.action_type)
    }
}

/// A workflow document: named actions plus an optional error handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Workflow name, used for the output directory and the root element.
    pub name: String,
    /// Declared actions in document order.
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Action run after the last step and targeted by failing actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_handler: Option<Action>,
}

impl Workflow {
    /// Creates an empty workflow.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            error_handler: None,
        }
    }

    /// Appends a declared action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Sets the error handler.
    pub fn with_error_handler(mut self, action: Action) -> Self {
        self.error_handler = Some(action);
        self
    }

    /// Looks up a declared action by name.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.name == name)
    }
}
