//! Serialized document format.
//!
//! The structured export/import representation for a journal document. This
//! is what session snapshots contain and what hosts persist.
//!
//! ```json
//! {
//!   "version": 1,
//!   "children": [
//!     { "type": "divider", "start_time": "09:30", "duration": "<1m", "session_id": 0, "version": 1 },
//!     { "type": "paragraph", "session_id": 0, "version": 1,
//!       "children": [{ "type": "text", "text": "Morning pages.", "version": 1 }] }
//!   ]
//! }
//! ```
//!
//! Every node carries a `version`; readers reject nodes from a newer format
//! instead of silently dropping fields they don't understand. A missing
//! version is read as version 1.

use serde::{Deserialize, Serialize};

use crate::ids::SessionIndex;
use crate::node::{DividerLabel, NodeKind, NodeType};

/// Current serialized format version.
pub const FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    1
}

/// A whole document: the root's children plus a format version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub children: Vec<SerializedNode>,
}

impl SerializedDocument {
    /// Wrap top-level nodes at the current format version.
    pub fn new(children: Vec<SerializedNode>) -> Self {
        Self {
            version: FORMAT_VERSION,
            children,
        }
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Plain text of the document: top-level blocks joined by a blank line.
    ///
    /// Dividers contribute nothing; they are presentation, not content.
    pub fn plain_text(&self) -> String {
        self.children
            .iter()
            .filter(|n| !matches!(n.body, SerializedBody::Divider { .. }))
            .map(SerializedNode::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Highest node version present anywhere in the document.
    pub fn max_version(&self) -> u32 {
        self.children
            .iter()
            .map(SerializedNode::max_version)
            .fold(self.version, u32::max)
    }
}

/// One serialized node: a variant body plus its format version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedNode {
    #[serde(flatten)]
    pub body: SerializedBody,
    #[serde(default = "default_version")]
    pub version: u32,
}

/// Variant payloads, internally tagged by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SerializedBody {
    Paragraph {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionIndex>,
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    Divider {
        start_time: String,
        duration: String,
        session_id: SessionIndex,
    },
    Heading {
        level: u8,
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    Quote {
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    List {
        #[serde(default)]
        ordered: bool,
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    ListItem {
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    Text {
        text: String,
    },
    LineBreak,
}

impl SerializedNode {
    /// Wrap a body at the current format version.
    pub fn new(body: SerializedBody) -> Self {
        Self {
            body,
            version: FORMAT_VERSION,
        }
    }

    /// A paragraph holding a single text run.
    pub fn paragraph(session_id: Option<SessionIndex>, text: impl Into<String>) -> Self {
        Self::new(SerializedBody::Paragraph {
            session_id,
            children: vec![Self::text(text)],
        })
    }

    /// An inline text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(SerializedBody::Text { text: text.into() })
    }

    /// The variant tag.
    pub fn node_type(&self) -> NodeType {
        self.body.node_type()
    }

    /// Child nodes (empty for leaves).
    pub fn children(&self) -> &[SerializedNode] {
        match &self.body {
            SerializedBody::Paragraph { children, .. }
            | SerializedBody::Heading { children, .. }
            | SerializedBody::Quote { children }
            | SerializedBody::List { children, .. }
            | SerializedBody::ListItem { children } => children.as_slice(),
            SerializedBody::Divider { .. } | SerializedBody::Text { .. } | SerializedBody::LineBreak => &[],
        }
    }

    /// Plain text of this node and its descendants.
    ///
    /// Inline children concatenate; nested block children (list items) are
    /// separated by a newline.
    pub fn plain_text(&self) -> String {
        match &self.body {
            SerializedBody::Text { text } => text.clone(),
            SerializedBody::LineBreak => "\n".to_string(),
            SerializedBody::Divider { .. } => String::new(),
            _ => {
                let mut out = String::new();
                let mut prev_was_block = false;
                for (i, child) in self.children().iter().enumerate() {
                    let is_block = child.body.is_element();
                    if i > 0 && (is_block || prev_was_block) {
                        out.push('\n');
                    }
                    out.push_str(&child.plain_text());
                    prev_was_block = is_block;
                }
                out
            }
        }
    }

    fn max_version(&self) -> u32 {
        self.children()
            .iter()
            .map(SerializedNode::max_version)
            .fold(self.version, u32::max)
    }
}

impl SerializedBody {
    /// The variant tag.
    pub fn node_type(&self) -> NodeType {
        match self {
            SerializedBody::Paragraph { .. } => NodeType::Paragraph,
            SerializedBody::Divider { .. } => NodeType::Divider,
            SerializedBody::Heading { .. } => NodeType::Heading,
            SerializedBody::Quote { .. } => NodeType::Quote,
            SerializedBody::List { .. } => NodeType::List,
            SerializedBody::ListItem { .. } => NodeType::ListItem,
            SerializedBody::Text { .. } => NodeType::Text,
            SerializedBody::LineBreak => NodeType::LineBreak,
        }
    }

    fn is_element(&self) -> bool {
        !matches!(
            self,
            SerializedBody::Divider { .. } | SerializedBody::Text { .. } | SerializedBody::LineBreak
        )
    }

    /// The node payload this body describes, without children.
    pub fn to_kind(&self) -> NodeKind {
        match self {
            SerializedBody::Paragraph { session_id, .. } => NodeKind::Paragraph {
                session_id: *session_id,
            },
            SerializedBody::Divider {
                start_time,
                duration,
                session_id,
            } => NodeKind::Divider(DividerLabel::new(*session_id, start_time, duration)),
            SerializedBody::Heading { level, .. } => NodeKind::Heading { level: *level },
            SerializedBody::Quote { .. } => NodeKind::Quote,
            SerializedBody::List { ordered, .. } => NodeKind::List { ordered: *ordered },
            SerializedBody::ListItem { .. } => NodeKind::ListItem,
            SerializedBody::Text { text } => NodeKind::Text { text: text.clone() },
            SerializedBody::LineBreak => NodeKind::LineBreak,
        }
    }

    /// Build a body from a node payload and already-serialized children.
    ///
    /// Returns `None` for the root, which is represented by
    /// [`SerializedDocument`] rather than a node.
    pub fn from_kind(kind: &NodeKind, children: Vec<SerializedNode>) -> Option<Self> {
        Some(match kind {
            NodeKind::Root => return None,
            NodeKind::Paragraph { session_id } => SerializedBody::Paragraph {
                session_id: *session_id,
                children,
            },
            NodeKind::Divider(label) => SerializedBody::Divider {
                start_time: label.start_time.clone(),
                duration: label.duration_label.clone(),
                session_id: label.session_index,
            },
            NodeKind::Heading { level } => SerializedBody::Heading {
                level: *level,
                children,
            },
            NodeKind::Quote => SerializedBody::Quote { children },
            NodeKind::List { ordered } => SerializedBody::List {
                ordered: *ordered,
                children,
            },
            NodeKind::ListItem => SerializedBody::ListItem { children },
            NodeKind::Text { text } => SerializedBody::Text { text: text.clone() },
            NodeKind::LineBreak => SerializedBody::LineBreak,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
