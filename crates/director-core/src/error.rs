//! Error types for director-core

use crate::{GraphId, NodeId, NodeTypeId, PropertyType};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Connection rejected: {reason}")]
    ConnectionRejected { reason: String },

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        expected: PropertyType,
        got: PropertyType,
    },

    #[error("Value link {link} on {node} does not allow multiple connections")]
    MultiplicityExceeded { node: NodeId, link: String },

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Graph not found: {0}")]
    GraphNotFound(GraphId),

    #[error("Link not found: {link} on {node}")]
    LinkNotFound { node: NodeId, link: String },

    #[error("{0} is not a value node")]
    NotAValueNode(NodeId),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(NodeTypeId),

    #[error("Node type already registered: {0}")]
    DuplicateNodeType(NodeTypeId),

    #[error("The root graph cannot be removed")]
    CannotRemoveRoot,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Director faulted: {0}")]
    Faulted(String),
}

impl Error {
    /// Check whether this error is a refused connection (no state was changed)
    pub fn is_connection_rejected(&self) -> bool {
        matches!(
            self,
            Error::ConnectionRejected { .. }
                | Error::TypeMismatch { .. }
                | Error::MultiplicityExceeded { .. }
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Failure raised by a node behavior during `update`
///
/// A node failure never aborts a tick: the engine logs it, drops the
/// activation and discards any outputs the node fired during the failed call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Missing property: {0}")]
    MissingProperty(String),

    #[error("Property {name} has type {got}, expected {expected}")]
    PropertyType {
        name: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("Unknown link: {0}")]
    UnknownLink(String),

    #[error("Node panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Custom(String),
}

/// Result type returned by node behaviors
pub type NodeResult<T> = std::result::Result<T, NodeError>;
