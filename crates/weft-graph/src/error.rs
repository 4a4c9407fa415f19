//! Graph construction and resolution errors.

use thiserror::Error;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that abort the compilation of a workflow.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An action depends on a name that no action declares.
    #[error("action {action} depends on undeclared action {dependency}")]
    MissingDependency {
        /// Name of the dependent action.
        action: String,
        /// Unresolved dependency name.
        dependency: String,
    },

    /// An edge would close a cycle, including a self-loop.
    #[error("edge {from} -> {to} would introduce a cycle")]
    Cycle {
        /// Source of the rejected edge.
        from: String,
        /// Target of the rejected edge.
        to: String,
    },

    /// A structural invariant of the synthesized graph does not hold.
    #[error("graph synthesis failed: {0}")]
    GraphSynthesis(String),

    /// An action references an action type missing from the configuration.
    #[error("action {action} references undeclared action type {action_type}")]
    UnknownActionType {
        /// Name of the action.
        action: String,
        /// Unresolved action type name.
        action_type: String,
    },

    /// A declared action uses one of the reserved control types.
    #[error("action {action} uses reserved control type {action_type}")]
    ReservedActionType {
        /// Name of the action.
        action: String,
        /// Reserved type name.
        action_type: String,
    },

    /// Two declared actions share a name.
    #[error("action {0} is declared more than once")]
    DuplicateAction(String),

    /// A declared action takes the name of a generated control node.
    #[error("action name {0} is reserved for a generated control node")]
    ReservedActionName(String),
}

impl GraphError {
    /// Creates a synthesis error from a message.
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::GraphSynthesis(message.into())
    }
}
