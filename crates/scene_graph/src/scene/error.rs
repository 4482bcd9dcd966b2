//! Scene graph error types

use thiserror::Error;

use super::param::ParamType;

/// Result type for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised while registering, building, or querying a scene graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A description names a node type that was never registered
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// A parameter was read (or supplied) at a type other than the one it holds
    #[error("Type mismatch for parameter '{name}': expected {expected:?}, found {found:?}")]
    TypeMismatch {
        /// Parameter name
        name: String,
        /// Type the caller asked for
        expected: ParamType,
        /// Type actually stored
        found: ParamType,
    },

    /// A child was attached to a slot its parent does not have, or a
    /// reference could not be resolved
    #[error("Schema mismatch on '{node}': {detail}")]
    SchemaMismatch {
        /// Type or name of the node that rejected the operation
        node: String,
        /// What went wrong
        detail: String,
    },

    /// The same type name was registered with two different factories
    #[error("Node type '{0}' is already registered with a different factory")]
    DuplicateTypeRegistration(String),

    /// A node was populated from a description more than once
    #[error("Node '{0}' has already been populated")]
    AlreadyPopulated(String),

    /// A handle does not name a live node
    #[error("Node not found")]
    NodeNotFound,

    /// A description is nested deeper than the configured limit
    #[error("Description nesting exceeds the depth limit of {0}")]
    DepthLimitExceeded(usize),

    /// Text could not be converted to or from a scene description or record list
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SceneError {
    /// Build a [`SceneError::SchemaMismatch`] for a slot the node does not have
    pub fn unknown_slot(node: &str, slot: &str) -> Self {
        Self::SchemaMismatch {
            node: node.to_string(),
            detail: format!("no child slot named '{slot}'"),
        }
    }
}
