//! Node variants for the journal document tree.
//!
//! ## Design: closed sum type
//!
//! `NodeKind` is the complete set of things a node can *be*, each variant
//! carrying its own payload. Tree code matches on the variant instead of
//! dispatching through a class hierarchy:
//!
//! - **Element** variants own children: Root, Paragraph, Heading, Quote,
//!   List, ListItem
//! - **Leaf** variants never have children: Text, LineBreak, Divider
//!
//! Only `Paragraph` carries a session id. `Divider` is derived state: the
//! divider engine deletes and regenerates every divider on each pass, so no
//! divider has an identity worth preserving.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::SessionIndex;

/// Presentation data carried by a session divider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividerLabel {
    /// The session whose run this divider introduces.
    pub session_index: SessionIndex,
    /// Formatted start time (e.g. `09:30`, or `--:--` when unknown).
    pub start_time: String,
    /// Formatted duration (e.g. `5m`, `<1m`, or empty when unknown).
    pub duration_label: String,
}

impl DividerLabel {
    /// Create a divider label.
    pub fn new(
        session_index: SessionIndex,
        start_time: impl Into<String>,
        duration_label: impl Into<String>,
    ) -> Self {
        Self {
            session_index,
            start_time: start_time.into(),
            duration_label: duration_label.into(),
        }
    }

    /// Single-line display text: `"09:30 · 5m"`, skipping empty parts.
    pub fn display(&self) -> String {
        match (self.start_time.is_empty(), self.duration_label.is_empty()) {
            (false, false) => format!("{} · {}", self.start_time, self.duration_label),
            (false, true) => self.start_time.clone(),
            (true, false) => self.duration_label.clone(),
            (true, true) => String::new(),
        }
    }
}

/// What a node *is*, with per-variant payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root. Exactly one per tree, never removed.
    Root,
    /// A paragraph, attributed to the session that first typed into it.
    Paragraph { session_id: Option<SessionIndex> },
    /// Non-editable session boundary marker.
    Divider(DividerLabel),
    /// Section heading (level 1-6).
    Heading { level: u8 },
    /// Block quote.
    Quote,
    /// Bulleted or numbered list.
    List { ordered: bool },
    /// One item of a list.
    ListItem,
    /// A run of inline text.
    Text { text: String },
    /// Soft line break inside a block.
    LineBreak,
}

impl NodeKind {
    /// An unattributed, empty paragraph.
    pub fn paragraph() -> Self {
        NodeKind::Paragraph { session_id: None }
    }

    /// An inline text run.
    pub fn text(text: impl Into<String>) -> Self {
        NodeKind::Text { text: text.into() }
    }

    /// The variant tag, without payload.
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Root => NodeType::Root,
            NodeKind::Paragraph { .. } => NodeType::Paragraph,
            NodeKind::Divider(_) => NodeType::Divider,
            NodeKind::Heading { .. } => NodeType::Heading,
            NodeKind::Quote => NodeType::Quote,
            NodeKind::List { .. } => NodeType::List,
            NodeKind::ListItem => NodeType::ListItem,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::LineBreak => NodeType::LineBreak,
        }
    }

    /// Whether this variant may own children.
    pub fn is_element(&self) -> bool {
        matches!(
            self,
            NodeKind::Root
                | NodeKind::Paragraph { .. }
                | NodeKind::Heading { .. }
                | NodeKind::Quote
                | NodeKind::List { .. }
                | NodeKind::ListItem
        )
    }

    /// Whether this is a top-level block (a direct child of the root).
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph { .. }
                | NodeKind::Divider(_)
                | NodeKind::Heading { .. }
                | NodeKind::Quote
                | NodeKind::List { .. }
        )
    }

    /// Whether selection and text edits may land on this node.
    pub fn is_editable(&self) -> bool {
        !matches!(self, NodeKind::Divider(_) | NodeKind::Root)
    }

    /// Check if this is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, NodeKind::Paragraph { .. })
    }

    /// Check if this is a divider.
    pub fn is_divider(&self) -> bool {
        matches!(self, NodeKind::Divider(_))
    }

    /// The paragraph's session id. `None` for unattributed paragraphs and
    /// for every other variant.
    pub fn session_id(&self) -> Option<SessionIndex> {
        match self {
            NodeKind::Paragraph { session_id } => *session_id,
            _ => None,
        }
    }

    /// Inline text carried directly by this node (Text runs and line breaks).
    pub fn inline_text(&self) -> Option<&str> {
        match self {
            NodeKind::Text { text } => Some(text),
            NodeKind::LineBreak => Some("\n"),
            _ => None,
        }
    }
}

/// Variant tag for [`NodeKind`], used in the serialized format and in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum NodeType {
    Root,
    Paragraph,
    Divider,
    Heading,
    Quote,
    List,
    #[strum(serialize = "list_item", serialize = "listitem")]
    ListItem,
    Text,
    #[strum(serialize = "line_break", serialize = "linebreak")]
    LineBreak,
}

impl NodeType {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Paragraph => "paragraph",
            NodeType::Divider => "divider",
            NodeType::Heading => "heading",
            NodeType::Quote => "quote",
            NodeType::List => "list",
            NodeType::ListItem => "list_item",
            NodeType::Text => "text",
            NodeType::LineBreak => "line_break",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
