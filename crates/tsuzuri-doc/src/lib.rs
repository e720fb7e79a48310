//! Versioned document tree for Tsuzuri journal entries.
//!
//! # Model
//!
//! ```text
//! Document ──current──▶ Arc<Tree> ──nodes──▶ Arc<Node> (shared across versions)
//!    │
//!    └── pending: [ChangeEvent]  ──dispatch──▶ Editor ──▶ ChangeListener(s)
//! ```
//!
//! - [`Tree`] is one immutable version: root, blocks, inline runs, selection.
//! - [`Transaction`] is a private working copy; writes clone only what they touch.
//! - [`Document::update`] commits a transaction as the next version and
//!   queues one [`ChangeEvent`] tagged with its [`ChangeOrigin`].
//! - [`Editor`] delivers queued events to listeners in commit order.
//!
//! Listeners that edit in response (session attribution, divider sync) tag
//! their own transactions and skip their own events, so dispatch always
//! settles.

pub mod document;
pub mod editor;
pub mod error;
pub mod event;
pub mod transaction;
pub mod tree;

pub use document::Document;
pub use editor::{ChangeListener, DEFAULT_MAX_DISPATCH_ROUNDS, Editor};
pub use error::DocError;
pub use event::{ChangeEvent, ChangeOrigin};
pub use transaction::Transaction;
pub use tree::{MAX_TREE_DEPTH, Node, Point, Selection, Tree};

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocError>;
