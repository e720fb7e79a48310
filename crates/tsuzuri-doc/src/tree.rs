//! Immutable tree snapshots.
//!
//! A [`Tree`] is one version of the document. Nodes live behind `Arc`s so a
//! new version shares every node it didn't touch with the previous one;
//! writing a node through a transaction clones just that node
//! (`Arc::make_mut`). Readers holding an older `Arc<Tree>` keep seeing a
//! consistent document no matter what is committed afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use tsuzuri_types::{
    NodeId, NodeKind, SerializedBody, SerializedDocument, SerializedNode, SessionIndex,
};

/// Maximum nesting depth walked by recursive tree helpers.
///
/// Journal documents nest a few levels at most (root → list → item → text).
/// Exceeding this indicates a parent cycle from a bug, not real content.
pub const MAX_TREE_DEPTH: usize = 64;

/// A node: identity, structural links, and its variant payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Session id of a paragraph; `None` for everything else.
    pub fn session_id(&self) -> Option<SessionIndex> {
        self.kind.session_id()
    }
}

/// A position inside a node (character offset for text runs, child index
/// for elements).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub node: NodeId,
    pub offset: usize,
}

impl Point {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// The current text selection. Anchor is where it started, focus where it
/// ends; either may come first in document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    /// A collapsed selection (caret).
    pub fn caret(node: NodeId, offset: usize) -> Self {
        let p = Point::new(node, offset);
        Self { anchor: p, focus: p }
    }

    /// A range selection.
    pub fn range(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// One immutable version of the document.
#[derive(Clone, Debug)]
pub struct Tree {
    pub(crate) nodes: HashMap<NodeId, Arc<Node>>,
    pub(crate) next_seq: u64,
    pub(crate) selection: Option<Selection>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// An empty document: just the root.
    pub fn new() -> Self {
        let root = Node {
            id: NodeId::ROOT,
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Root,
        };
        let mut nodes = HashMap::new();
        nodes.insert(NodeId::ROOT, Arc::new(root));
        Self {
            nodes,
            next_seq: 1,
            selection: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).map(|n| n.as_ref())
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// The root node. Always present.
    pub fn root(&self) -> &Node {
        &self.nodes[&NodeId::ROOT]
    }

    /// Children of a node, in order. Empty for leaves and unknown IDs.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Top-level blocks in document order.
    pub fn blocks(&self) -> &[NodeId] {
        self.children(NodeId::ROOT)
    }

    /// Position of a node among its siblings.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        self.children(parent).get(idx + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        idx.checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Number of nodes, not counting the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Whether the document has no content nodes.
    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    /// Top-level paragraphs in document order.
    pub fn paragraphs(&self) -> Vec<NodeId> {
        self.blocks_where(NodeKind::is_paragraph)
    }

    /// Top-level dividers in document order.
    pub fn dividers(&self) -> Vec<NodeId> {
        self.blocks_where(NodeKind::is_divider)
    }

    fn blocks_where(&self, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        self.blocks()
            .iter()
            .copied()
            .filter(|id| self.kind(*id).is_some_and(&pred))
            .collect()
    }

    /// All nodes except the root, in document (pre-)order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<(usize, NodeId)> =
            self.blocks().iter().rev().map(|id| (1, *id)).collect();

        while let Some((depth, id)) = stack.pop() {
            if depth > MAX_TREE_DEPTH {
                tracing::warn!("preorder() hit MAX_TREE_DEPTH ({MAX_TREE_DEPTH}), truncating");
                continue;
            }
            out.push(id);
            for child in self.children(id).iter().rev() {
                stack.push((depth + 1, *child));
            }
        }
        out
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Nodes touched by the selection, in document order.
    ///
    /// A caret touches one node. A range touches every node between anchor
    /// and focus (inclusive) in pre-order, which includes the block elements
    /// the range crosses into. Endpoints that no longer exist are ignored.
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        let Some(sel) = self.selection else {
            return Vec::new();
        };

        let anchor_ok = self.contains(sel.anchor.node);
        let focus_ok = self.contains(sel.focus.node);
        match (anchor_ok, focus_ok) {
            (false, false) => return Vec::new(),
            (true, false) => return vec![sel.anchor.node],
            (false, true) => return vec![sel.focus.node],
            (true, true) => {}
        }
        if sel.anchor.node == sel.focus.node {
            return vec![sel.anchor.node];
        }

        let order = self.preorder();
        let a = order.iter().position(|id| *id == sel.anchor.node);
        let f = order.iter().position(|id| *id == sel.focus.node);
        match (a, f) {
            (Some(a), Some(f)) => {
                let (lo, hi) = if a <= f { (a, f) } else { (f, a) };
                order[lo..=hi].to_vec()
            }
            // An endpoint on the root itself: treat as touching only the other one.
            (Some(a), None) => vec![order[a]],
            (None, Some(f)) => vec![order[f]],
            (None, None) => Vec::new(),
        }
    }

    // =========================================================================
    // Text & export
    // =========================================================================

    /// Plain text of one node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.serialize_node(id, 0)
            .map(|n| n.plain_text())
            .unwrap_or_default()
    }

    /// Plain text of the whole document: blocks joined by a blank line,
    /// dividers skipped.
    pub fn full_text(&self) -> String {
        self.export().plain_text()
    }

    /// Export to the versioned serialized format.
    pub fn export(&self) -> SerializedDocument {
        SerializedDocument::new(
            self.blocks()
                .iter()
                .filter_map(|id| self.serialize_node(*id, 1))
                .collect(),
        )
    }

    fn serialize_node(&self, id: NodeId, depth: usize) -> Option<SerializedNode> {
        if depth > MAX_TREE_DEPTH {
            tracing::warn!(node = %id, "export hit MAX_TREE_DEPTH ({MAX_TREE_DEPTH}), truncating");
            return None;
        }
        let node = self.node(id)?;
        let children = node
            .children
            .iter()
            .filter_map(|c| self.serialize_node(*c, depth + 1))
            .collect();
        SerializedBody::from_kind(&node.kind, children).map(SerializedNode::new)
    }
}

// ============================================================================
// Tests
// ============================================================================
