use thiserror::Error;

use crate::NodeId;

/// Errors that can occur while walking or editing a block tree.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A walk starting at `node` came back to `revisited`, so the tree
    /// currently contains a cycle.
    #[error("malformed tree: walk from {node} revisited {revisited}")]
    MalformedTree { node: NodeId, revisited: NodeId },

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("attaching {node} below {parent} would create a cycle")]
    WouldCycle { node: NodeId, parent: NodeId },
}

pub type Result<T> = std::result::Result<T, Error>;
