//! Write transactions.
//!
//! A [`Transaction`] is a private working copy of the latest tree. All
//! mutation goes through it: reads come from the working copy (via `Deref`
//! to [`Tree`]), writes clone only the nodes they touch. Nothing is visible
//! to readers until [`Document::update`](crate::Document::update) commits the
//! transaction as a new version.

use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::Arc;

use tsuzuri_types::{FORMAT_VERSION, NodeId, NodeKind, NodeType, SerializedNode, SessionIndex};

use crate::event::ChangeOrigin;
use crate::tree::{Node, Selection, Tree};
use crate::{DocError, Result};

/// A mutable working copy of the tree.
pub struct Transaction {
    tree: Tree,
    origin: ChangeOrigin,
    tags: BTreeSet<String>,
    dirty: BTreeSet<NodeId>,
    selection_changed: bool,
}

impl Deref for Transaction {
    type Target = Tree;

    fn deref(&self) -> &Tree {
        &self.tree
    }
}

impl Transaction {
    pub(crate) fn new(tree: Tree, origin: ChangeOrigin) -> Self {
        Self {
            tree,
            origin,
            tags: BTreeSet::new(),
            dirty: BTreeSet::new(),
            selection_changed: false,
        }
    }

    /// Who is making this change.
    pub fn origin(&self) -> ChangeOrigin {
        self.origin
    }

    /// Attach a host tag to the resulting change event.
    pub fn tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    /// Whether anything (content or selection) changed.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty() || self.selection_changed
    }

    pub(crate) fn into_parts(self) -> (Tree, BTreeSet<String>, Vec<NodeId>) {
        (self.tree, self.tags, self.dirty.into_iter().collect())
    }

    // =========================================================================
    // Copy-on-write access
    // =========================================================================

    /// Writable handle to a node; clones it if an older version shares it.
    fn writable(&mut self, id: NodeId) -> Result<&mut Node> {
        let node = self
            .tree
            .nodes
            .get_mut(&id)
            .ok_or(DocError::NodeNotFound(id))?;
        self.dirty.insert(id);
        Ok(Arc::make_mut(node))
    }

    fn expect_kind(&self, id: NodeId, expected: NodeType) -> Result<&Node> {
        let node = self.tree.node(id).ok_or(DocError::NodeNotFound(id))?;
        let found = node.kind.node_type();
        if found != expected {
            return Err(DocError::WrongKind { id, expected, found });
        }
        Ok(node)
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    fn new_node_id(&mut self) -> NodeId {
        let id = NodeId::from_raw(self.tree.next_seq);
        self.tree.next_seq += 1;
        id
    }

    /// Create a node of `kind` at `index` among `parent`'s children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, kind: NodeKind) -> Result<NodeId> {
        if matches!(kind, NodeKind::Root) {
            return Err(DocError::RootImmutable);
        }
        let parent_node = self.tree.node(parent).ok_or(DocError::NodeNotFound(parent))?;
        if !parent_node.kind.is_element() {
            return Err(DocError::NotAnElement(parent));
        }
        let index = index.min(parent_node.children.len());

        let id = self.new_node_id();
        self.tree.nodes.insert(
            id,
            Arc::new(Node {
                id,
                parent: Some(parent),
                children: Vec::new(),
                kind,
            }),
        );
        self.dirty.insert(id);
        self.writable(parent)?.children.insert(index, id);
        Ok(id)
    }

    /// Create a node of `kind` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId> {
        let end = self.tree.children(parent).len();
        self.insert_child(parent, end, kind)
    }

    /// Create a node of `kind` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, kind: NodeKind) -> Result<NodeId> {
        let (parent, idx) = self.sibling_slot(sibling)?;
        self.insert_child(parent, idx, kind)
    }

    /// Create a node of `kind` immediately after `sibling`.
    pub fn insert_after(&mut self, sibling: NodeId, kind: NodeKind) -> Result<NodeId> {
        let (parent, idx) = self.sibling_slot(sibling)?;
        self.insert_child(parent, idx + 1, kind)
    }

    fn sibling_slot(&self, sibling: NodeId) -> Result<(NodeId, usize)> {
        if sibling.is_root() {
            return Err(DocError::InvalidReference(sibling));
        }
        let parent = self
            .tree
            .parent(sibling)
            .ok_or(DocError::NodeNotFound(sibling))?;
        let idx = self
            .tree
            .index_in_parent(sibling)
            .ok_or(DocError::InvalidReference(sibling))?;
        Ok((parent, idx))
    }

    /// Remove a node and its whole subtree.
    ///
    /// A selection pointing into the removed subtree is cleared.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id.is_root() {
            return Err(DocError::RootImmutable);
        }
        let parent = self.tree.parent(id).ok_or(DocError::NodeNotFound(id))?;
        self.writable(parent)?.children.retain(|c| *c != id);

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.tree.nodes.remove(&next) {
                stack.extend(node.children.iter().copied());
                self.dirty.insert(next);
            }
        }

        if let Some(sel) = self.tree.selection {
            if !self.tree.contains(sel.anchor.node) || !self.tree.contains(sel.focus.node) {
                self.tree.selection = None;
                self.selection_changed = true;
            }
        }
        Ok(())
    }

    /// Move `id` (with its subtree) to the end of `new_parent`.
    fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
        let old_parent = self.tree.parent(id).ok_or(DocError::NodeNotFound(id))?;
        self.writable(old_parent)?.children.retain(|c| *c != id);
        self.writable(new_parent)?.children.push(id);
        self.writable(id)?.parent = Some(new_parent);
        Ok(())
    }

    // =========================================================================
    // Field writes
    // =========================================================================

    /// Stamp a paragraph with a session id.
    pub fn set_session_id(&mut self, paragraph: NodeId, session: SessionIndex) -> Result<()> {
        self.expect_kind(paragraph, NodeType::Paragraph)?;
        let node = self.writable(paragraph)?;
        node.kind = NodeKind::Paragraph {
            session_id: Some(session),
        };
        Ok(())
    }

    /// Replace the text of a text run.
    pub fn set_text(&mut self, text_node: NodeId, text: impl Into<String>) -> Result<()> {
        self.expect_kind(text_node, NodeType::Text)?;
        self.writable(text_node)?.kind = NodeKind::Text { text: text.into() };
        Ok(())
    }

    /// Append to the text of a text run.
    pub fn append_text(&mut self, text_node: NodeId, more: &str) -> Result<()> {
        self.expect_kind(text_node, NodeType::Text)?;
        if let NodeKind::Text { text } = &mut self.writable(text_node)?.kind {
            text.push_str(more);
        }
        Ok(())
    }

    /// Set (or clear) the selection.
    ///
    /// Both endpoints must exist and be editable. A caret never sits inside
    /// a divider.
    pub fn set_selection(&mut self, selection: Option<Selection>) -> Result<()> {
        if let Some(sel) = &selection {
            for point in [sel.anchor, sel.focus] {
                let kind = self
                    .tree
                    .kind(point.node)
                    .ok_or(DocError::NodeNotFound(point.node))?;
                if !kind.is_editable() {
                    return Err(DocError::NotEditable(point.node));
                }
            }
        }
        if self.tree.selection != selection {
            self.tree.selection = selection;
            self.selection_changed = true;
        }
        Ok(())
    }

    // =========================================================================
    // Editing conveniences
    // =========================================================================

    /// Append an unattributed paragraph holding `text` to the document and
    /// put the caret at its end. Returns the paragraph.
    pub fn append_paragraph(&mut self, text: &str) -> Result<NodeId> {
        let para = self.append_child(NodeId::ROOT, NodeKind::paragraph())?;
        let run = self.append_child(para, NodeKind::text(text))?;
        self.set_selection(Some(Selection::caret(run, text.chars().count())))?;
        Ok(para)
    }

    /// Insert an unattributed paragraph holding `text` after `block` and put
    /// the caret at its end. Returns the paragraph.
    pub fn insert_paragraph_after(&mut self, block: NodeId, text: &str) -> Result<NodeId> {
        let para = self.insert_after(block, NodeKind::paragraph())?;
        let run = self.append_child(para, NodeKind::text(text))?;
        self.set_selection(Some(Selection::caret(run, text.chars().count())))?;
        Ok(para)
    }

    /// Split the paragraph containing `text_node` at character `offset`
    /// (Enter key). Everything after the split point moves to a new,
    /// unattributed paragraph inserted right after; the caret lands at its
    /// start. Returns the new paragraph.
    pub fn split_paragraph(&mut self, text_node: NodeId, offset: usize) -> Result<NodeId> {
        let text = match self.tree.kind(text_node) {
            Some(NodeKind::Text { text }) => text.clone(),
            Some(other) => {
                return Err(DocError::WrongKind {
                    id: text_node,
                    expected: NodeType::Text,
                    found: other.node_type(),
                });
            }
            None => return Err(DocError::NodeNotFound(text_node)),
        };
        let para = self
            .tree
            .parent(text_node)
            .ok_or(DocError::NodeNotFound(text_node))?;
        self.expect_kind(para, NodeType::Paragraph)?;

        let len = text.chars().count();
        if offset > len {
            return Err(DocError::OffsetOutOfBounds { offset, len });
        }
        let byte_at = text
            .char_indices()
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let (head, tail) = text.split_at(byte_at);
        let tail = tail.to_string();

        let trailing: Vec<NodeId> = self
            .tree
            .children(para)
            .iter()
            .skip_while(|c| **c != text_node)
            .skip(1)
            .copied()
            .collect();

        self.set_text(text_node, head)?;
        let new_para = self.insert_after(para, NodeKind::paragraph())?;
        let new_run = self.append_child(new_para, NodeKind::text(tail))?;
        for sibling in trailing {
            self.reparent(sibling, new_para)?;
        }
        self.set_selection(Some(Selection::caret(new_run, 0)))?;
        Ok(new_para)
    }

    /// Rebuild serialized nodes as children of `parent`.
    ///
    /// Fails without partial effect on the caller's document if any node is
    /// from a newer format (the whole transaction is discarded on error).
    pub fn append_serialized(
        &mut self,
        parent: NodeId,
        nodes: &[SerializedNode],
    ) -> Result<Vec<NodeId>> {
        let mut created = Vec::with_capacity(nodes.len());
        for node in nodes {
            if node.version > FORMAT_VERSION {
                return Err(DocError::UnsupportedVersion {
                    found: node.version,
                    supported: FORMAT_VERSION,
                });
            }
            let id = self.append_child(parent, node.body.to_kind())?;
            self.append_serialized(id, node.children())?;
            created.push(id);
        }
        Ok(created)
    }
}

// ============================================================================
// Tests
// ============================================================================
