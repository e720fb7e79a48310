//! Typed identifiers for entries, nodes, and sessions.
//!
//! `EntryId` wraps a UUIDv7 (time-ordered, globally unique) and displays as
//! standard UUID text for logging. The `short()` form (first 8 hex chars) is
//! for human-facing output only, never as a lookup key.
//!
//! `NodeId` is document-local: a monotonically increasing sequence number
//! handed out by the tree. It is only meaningful together with the document
//! that issued it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal position of a session in an entry's session list.
///
/// Assigned at session creation, never reused.
pub type SessionIndex = u32;

/// A journal entry identifier (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(uuid::Uuid);

impl EntryId {
    /// Create a new time-ordered ID (UUIDv7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// First 8 hex characters, for human display only.
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }

    /// Full 32-character hex string (no hyphens).
    pub fn to_hex(&self) -> String {
        self.0.as_simple().to_string()
    }

    /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        uuid::Uuid::parse_str(s).map(Self)
    }

    /// A nil ID, for sentinel values only.
    pub fn nil() -> Self {
        Self(uuid::Uuid::nil())
    }

    /// Check if this is the nil ID.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<uuid::Uuid> for EntryId {
    fn from(u: uuid::Uuid) -> Self {
        Self(u)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Full UUID with hyphens for log readability
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.short())
    }
}

/// Document-local node address.
///
/// Issued by the tree in increasing order; the root is always `NodeId(0)`.
/// Dividers get fresh IDs every time they are regenerated.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// The root node of every document.
    pub const ROOT: NodeId = NodeId(0);

    /// Wrap a raw sequence number.
    pub fn from_raw(seq: u64) -> Self {
        Self(seq)
    }

    /// The raw sequence number.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Check if this is the root node.
    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
