use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::core::id::NodeId;

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// A handle no longer resolves to a live node.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// No node is registered under this name.
    #[error("no node named {0:?}")]
    NameNotFound(String),

    /// The name is already registered to another node.
    #[error("duplicate node name: {0}")]
    DuplicateName(String),

    /// The name contains characters that are not permitted.
    #[error("invalid node name: {0:?}")]
    InvalidName(String),

    /// No constructor is registered for a node kind.
    #[error("unknown node kind: {0}")]
    UnknownKind(String),

    /// A node's parent chain loops back on itself. This is a broken
    /// invariant, not a recoverable condition.
    #[error("cycle detected in parent chain of {0:?}")]
    Cycle(NodeId),

    /// The orphan list references state that no longer exists.
    #[error("orphan list corrupted: {0}")]
    OrphanList(String),

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Proposed parent.
        parent: NodeId,
        /// Proposed child.
        child: NodeId,
    },

    /// The node is not a child of the given parent.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Parent that was expected to own the child.
        parent: NodeId,
        /// Child that was not found.
        child: NodeId,
    },

    /// Two nodes were expected to share a parent.
    #[error("{node:?} is not a sibling of {sibling:?}")]
    NotASibling {
        /// Node being moved.
        node: NodeId,
        /// Reference node.
        sibling: NodeId,
    },

    /// A behavior was invoked while it was already executing.
    #[error("re-entrant behavior call on {0:?}")]
    ReentrantBehavior(NodeId),

    /// Malformed node or registry configuration.
    #[error("config: {0}")]
    Config(String),

    /// Failure raised by a behavior or listener.
    #[error("callback: {0}")]
    Callback(String),

    /// Rendering backend failure.
    #[error("render: {0}")]
    Render(String),

    /// Invalid request.
    #[error("invalid: {0}")]
    Invalid(String),

    /// Internal error.
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    /// Fatal errors indicate a broken tree invariant.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Cycle(_) | Self::OrphanList(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}
