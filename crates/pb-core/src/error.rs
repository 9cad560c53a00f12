//! Error types for pb-core.

use crate::id::NodeId;
use thiserror::Error;

/// A structural operation on the node tree that was refused.
///
/// Reparent rejections are reachable through ordinary pointer movement,
/// so the editing session swallows them; everything else is returned to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The referenced node does not exist in the project.
    #[error("node `{0}` not found")]
    NodeNotFound(NodeId),

    /// The root node cannot be removed, duplicated or reparented.
    #[error("the root node cannot be {0}")]
    RootImmutable(&'static str),

    /// A node cannot become its own parent.
    #[error("node `{0}` cannot be reparented onto itself")]
    SelfReparent(NodeId),

    /// The target type cannot hold children.
    #[error("node `{0}` is not a container")]
    NotAContainer(NodeId),

    /// The target lives inside the node being moved.
    #[error("reparenting `{node}` under `{target}` would create a cycle")]
    Cycle {
        /// Node being moved.
        node: NodeId,
        /// Requested new parent, a descendant of `node`.
        target: NodeId,
    },

    /// The drag payload or requested type has no template in the catalog.
    #[error("unknown template type: {0}")]
    UnknownTemplate(String),
}

/// An invariant of the node tree that does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// `rootNodeId` does not name a node in `nodesById`.
    #[error("root node `{0}` is missing")]
    MissingRoot(NodeId),

    /// The root has a parent.
    #[error("root node `{0}` has a parent")]
    RootHasParent(NodeId),

    /// A map key disagrees with the node's own `id` field.
    #[error("node stored under `{key}` has id `{id}`")]
    KeyMismatch {
        /// Key in `nodesById`.
        key: NodeId,
        /// The node's `id` field.
        id: NodeId,
    },

    /// A non-root node has no parent.
    #[error("node `{0}` has no parent")]
    Orphan(NodeId),

    /// `parentId` or a `children` entry points at a missing node.
    #[error("node `{node}` references missing node `{missing}`")]
    DanglingReference {
        /// Node holding the reference.
        node: NodeId,
        /// The id that does not exist.
        missing: NodeId,
    },

    /// `n.parentId == p` but `p.children` lacks `n`, or the reverse.
    #[error("parent/child links of `{parent}` and `{child}` disagree")]
    LinkMismatch {
        /// Parent side of the link.
        parent: NodeId,
        /// Child side of the link.
        child: NodeId,
    },

    /// A child is listed more than once.
    #[error("`{child}` is listed more than once under `{parent}`")]
    DuplicateChild {
        /// Parent whose `children` repeats an id.
        parent: NodeId,
        /// The repeated id.
        child: NodeId,
    },

    /// The parent relation contains a cycle.
    #[error("the node tree contains a cycle")]
    Cycle,

    /// A node cannot be reached from the root.
    #[error("node `{0}` is unreachable from the root")]
    Unreachable(NodeId),

    /// Width or height below the size floor (or not a number).
    #[error("node `{0}` is smaller than the minimum size")]
    Undersized(NodeId),
}

/// A persistence collaborator failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No project is stored under the id.
    #[error("project `{0}` not found")]
    NotFound(String),

    /// A project with the id already exists.
    #[error("project `{0}` already exists")]
    AlreadyExists(String),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// MessagePack decoding failed.
    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// The backing service reported a failure.
    #[error("backend error: {0}")]
    Backend(String),
}
