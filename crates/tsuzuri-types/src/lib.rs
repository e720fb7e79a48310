//! Shared identity, session, and node types for Tsuzuri.
//!
//! This crate is the foundation: typed IDs, session records, the closed set of
//! node variants, and the serialized document format. It has **no internal
//! tsuzuri dependencies**: a pure leaf crate that the tree and engines build on.
//!
//! # Entity Overview
//!
//! ```text
//! Entry (EntryId) ← one journal entry = one document
//!     └── has ordered SessionRecord list (index 0, 1, 2, …)
//!     └── owns a node tree
//!         ├── Paragraph (session_id → SessionRecord.index)
//!         ├── Divider   (derived: session boundary marker)
//!         └── Heading / Quote / List / ListItem / Text / LineBreak
//! ```
//!
//! # Key Types
//!
//! |----------------------|-------------------------------------------------|
//! | Type                 | Purpose                                         |
//! |----------------------|-------------------------------------------------|
//! | [`EntryId`]          | Which journal entry (= document)                |
//! | [`NodeId`]           | Node address within one document                |
//! | [`SessionRecord`]    | One editing period: start, end, snapshot        |
//! | [`NodeKind`]         | Variant + payload of a tree node                |
//! | [`DividerLabel`]     | Presentation data carried by a divider          |
//! | [`SerializedDocument`] | Versioned export/import representation        |
//! |----------------------|-------------------------------------------------|

pub mod ids;
pub mod session;
pub mod node;
pub mod format;

// Re-export primary types at crate root for convenience.
pub use ids::{EntryId, NodeId, SessionIndex};
pub use session::SessionRecord;
pub use node::{DividerLabel, NodeKind, NodeType};
pub use format::{FORMAT_VERSION, SerializedBody, SerializedDocument, SerializedNode};
