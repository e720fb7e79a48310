//! The versioned document container.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;
use tsuzuri_types::{EntryId, FORMAT_VERSION, NodeId, SerializedDocument};

use crate::event::{ChangeEvent, ChangeOrigin};
use crate::transaction::Transaction;
use crate::tree::Tree;
use crate::{DocError, Result};

/// A journal entry's document: the latest committed tree plus the queue of
/// change events not yet delivered to listeners.
///
/// Each successful [`update`](Self::update) that changes something bumps the
/// version, swaps in the new tree, and queues exactly one [`ChangeEvent`].
/// Delivery is the host's job (see [`Editor`](crate::Editor)).
#[derive(Debug)]
pub struct Document {
    entry_id: EntryId,
    current: Arc<Tree>,
    version: u64,
    pending: VecDeque<ChangeEvent>,
}

impl Document {
    /// An empty document.
    pub fn new(entry_id: EntryId) -> Self {
        Self {
            entry_id,
            current: Arc::new(Tree::new()),
            version: 0,
            pending: VecDeque::new(),
        }
    }

    /// Build a document from its serialized form.
    ///
    /// The load is committed as one `Import` change, left pending so the
    /// first dispatch brings dividers in line with the loaded content.
    pub fn import(entry_id: EntryId, serialized: &SerializedDocument) -> Result<Self> {
        let found = serialized.max_version();
        if found > FORMAT_VERSION {
            return Err(DocError::UnsupportedVersion {
                found,
                supported: FORMAT_VERSION,
            });
        }
        let mut doc = Self::new(entry_id);
        doc.update(ChangeOrigin::Import, |txn| {
            txn.append_serialized(NodeId::ROOT, &serialized.children)?;
            Ok(())
        })?;
        Ok(doc)
    }

    /// Parse and import a JSON-serialized document.
    pub fn from_json(entry_id: EntryId, json: &str) -> Result<Self> {
        let serialized = SerializedDocument::from_json(json)?;
        Self::import(entry_id, &serialized)
    }

    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    /// Number of committed changes so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The latest tree. Cheap; later commits never affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<Tree> {
        Arc::clone(&self.current)
    }

    /// Run a read-only closure against the latest tree.
    pub fn read<R>(&self, f: impl FnOnce(&Tree) -> R) -> R {
        f(&self.current)
    }

    /// Apply a transaction.
    ///
    /// The closure edits a private copy of the latest tree. If it returns an
    /// error nothing is committed. If it returns `Ok` but changed nothing,
    /// nothing is committed either and no event is queued. Otherwise the copy
    /// becomes the new version.
    pub fn update<R>(
        &mut self,
        origin: ChangeOrigin,
        f: impl FnOnce(&mut Transaction) -> Result<R>,
    ) -> Result<R> {
        let mut txn = Transaction::new((*self.current).clone(), origin);
        let out = f(&mut txn)?;
        if !txn.is_dirty() {
            return Ok(out);
        }

        let (tree, tags, dirty) = txn.into_parts();
        self.current = Arc::new(tree);
        self.version += 1;
        debug!(
            entry = %self.entry_id.short(),
            version = self.version,
            %origin,
            dirty = dirty.len(),
            "committed change"
        );
        self.pending.push_back(ChangeEvent {
            version: self.version,
            origin,
            tags,
            dirty,
        });
        Ok(out)
    }

    /// Queue a change event without touching the tree (host refresh).
    pub fn notify(&mut self, origin: ChangeOrigin) {
        self.pending.push_back(ChangeEvent {
            version: self.version,
            origin,
            tags: Default::default(),
            dirty: Vec::new(),
        });
    }

    /// Take the oldest undelivered change event.
    pub fn pop_pending(&mut self) -> Option<ChangeEvent> {
        self.pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop all undelivered events.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Export the latest tree.
    pub fn export(&self) -> SerializedDocument {
        self.current.export()
    }

    /// Export the latest tree as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(self.export().to_json()?)
    }
}

// ============================================================================
// Tests
// ============================================================================
