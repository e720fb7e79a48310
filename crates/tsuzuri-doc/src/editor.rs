//! Change dispatch.
//!
//! The editor owns a [`Document`] and a set of listeners. After every host
//! action it drains the document's pending events in commit order, handing
//! each one to every listener. A listener may commit further changes while
//! handling an event; those are queued behind the current one and delivered
//! in a later round, never re-entrantly.

use tracing::warn;

use crate::document::Document;
use crate::event::{ChangeEvent, ChangeOrigin};
use crate::transaction::Transaction;
use crate::Result;

/// Default cap on events delivered per dispatch.
pub const DEFAULT_MAX_DISPATCH_ROUNDS: usize = 64;

/// Something that reacts to committed changes.
///
/// Implementations that edit the document must tag their own transactions
/// with a distinct [`ChangeOrigin`] and ignore events carrying it.
pub trait ChangeListener {
    fn on_change(&mut self, event: &ChangeEvent, doc: &mut Document);
}

impl<A: ChangeListener, B: ChangeListener> ChangeListener for (A, B) {
    fn on_change(&mut self, event: &ChangeEvent, doc: &mut Document) {
        self.0.on_change(event, doc);
        self.1.on_change(event, doc);
    }
}

impl ChangeListener for Vec<Box<dyn ChangeListener>> {
    fn on_change(&mut self, event: &ChangeEvent, doc: &mut Document) {
        for listener in self.iter_mut() {
            listener.on_change(event, doc);
        }
    }
}

impl ChangeListener for () {
    fn on_change(&mut self, _event: &ChangeEvent, _doc: &mut Document) {}
}

/// A document with listeners attached.
pub struct Editor<L> {
    doc: Document,
    listeners: L,
    max_dispatch_rounds: usize,
}

impl<L: ChangeListener> Editor<L> {
    /// Attach listeners to a document and deliver anything already pending
    /// (e.g. the `Import` event of a freshly loaded document).
    pub fn new(doc: Document, listeners: L) -> Self {
        Self::with_max_rounds(doc, listeners, DEFAULT_MAX_DISPATCH_ROUNDS)
    }

    pub fn with_max_rounds(doc: Document, listeners: L, max_dispatch_rounds: usize) -> Self {
        let mut editor = Self {
            doc,
            listeners,
            max_dispatch_rounds: max_dispatch_rounds.max(1),
        };
        editor.dispatch();
        editor
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn listeners(&self) -> &L {
        &self.listeners
    }

    /// Mutable access to the listeners, for host configuration changes.
    ///
    /// Call [`refresh`](Self::refresh) afterwards if the change should take
    /// effect on the current content.
    pub fn listeners_mut(&mut self) -> &mut L {
        &mut self.listeners
    }

    /// Apply an edit and deliver the resulting events.
    pub fn update<R>(
        &mut self,
        origin: ChangeOrigin,
        f: impl FnOnce(&mut Transaction) -> Result<R>,
    ) -> Result<R> {
        let out = self.doc.update(origin, f)?;
        self.dispatch();
        Ok(out)
    }

    /// Apply a user edit.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Transaction) -> Result<R>) -> Result<R> {
        self.update(ChangeOrigin::User, f)
    }

    /// Re-run listeners without changing the tree.
    pub fn refresh(&mut self) {
        self.doc.notify(ChangeOrigin::Host);
        self.dispatch();
    }

    /// Deliver pending events until the queue is empty.
    ///
    /// Returns the number of events delivered. Stops after
    /// `max_dispatch_rounds` events and drops the remainder, which only
    /// happens if two listeners keep answering each other's changes.
    pub fn dispatch(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.doc.pop_pending() {
            if delivered >= self.max_dispatch_rounds {
                warn!(
                    limit = self.max_dispatch_rounds,
                    dropped = self.doc.pending_len() + 1,
                    origin = %event.origin,
                    "change dispatch limit reached, dropping remaining events"
                );
                self.doc.clear_pending();
                break;
            }
            self.listeners.on_change(&event, &mut self.doc);
            delivered += 1;
        }
        delivered
    }
}

// ============================================================================
// Tests
// ============================================================================
