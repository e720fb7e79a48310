//! Error types for document tree operations.

use thiserror::Error;
use tsuzuri_types::{NodeId, NodeType};

/// Errors that can occur during tree operations.
///
/// These are misuse of the tree API by the caller. The attribution and
/// divider engines never surface them to the editing surface; they log and
/// degrade instead.
#[derive(Error, Debug)]
pub enum DocError {
    /// Node not found in the current tree.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Invalid reference node for insertion (e.g. inserting beside the root).
    #[error("invalid reference node: {0}")]
    InvalidReference(NodeId),

    /// Tried to give children to a leaf node.
    #[error("node {0} cannot have children")]
    NotAnElement(NodeId),

    /// Operation requires a different node variant.
    #[error("node {id} is a {found}, expected {expected}")]
    WrongKind {
        id: NodeId,
        expected: NodeType,
        found: NodeType,
    },

    /// Selection or text edit targeted a non-editable node.
    #[error("node {0} is not editable")]
    NotEditable(NodeId),

    /// The root node cannot be created, moved, or removed.
    #[error("the root node cannot be modified structurally")]
    RootImmutable,

    /// Text offset past the end of a text run.
    #[error("offset {offset} out of bounds for text of length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// Serialized content from a newer format than this build understands.
    #[error("unsupported format version {found} (supported up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// JSON encode/decode error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
