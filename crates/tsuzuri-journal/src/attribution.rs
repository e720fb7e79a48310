//! Session attribution.
//!
//! Whenever the selection lands in a paragraph that has no session id yet,
//! the paragraph is stamped with the current session. Ids are sticky: once a
//! paragraph has one, later sessions editing it never overwrite it.

use tracing::{debug, warn};
use tsuzuri_doc::{ChangeEvent, ChangeListener, ChangeOrigin, Document, Tree};
use tsuzuri_types::{NodeId, SessionIndex};

/// Stamps selected paragraphs with the current session index.
#[derive(Clone, Debug, Default)]
pub struct AttributionEngine {
    current_session: Option<SessionIndex>,
}

impl AttributionEngine {
    pub fn new(current_session: Option<SessionIndex>) -> Self {
        Self { current_session }
    }

    /// Re-supply the current session (e.g. after a new session opens).
    pub fn set_current_session(&mut self, session: Option<SessionIndex>) {
        self.current_session = session;
    }

    pub fn current_session(&self) -> Option<SessionIndex> {
        self.current_session
    }

    /// The index paragraphs are stamped with. Without session context this
    /// is session 0.
    pub fn effective_session(&self) -> SessionIndex {
        self.current_session.unwrap_or(0)
    }

    /// Stamp every unattributed paragraph touched by the selection.
    ///
    /// All stamps go into a single `Attribution` transaction. When nothing
    /// needs stamping no transaction is committed. Returns the stamped
    /// paragraphs.
    pub fn stamp(&self, doc: &mut Document) -> tsuzuri_doc::Result<Vec<NodeId>> {
        let targets = doc.read(unstamped_selected_paragraphs);
        if targets.is_empty() {
            return Ok(targets);
        }

        let session = self.effective_session();
        doc.update(ChangeOrigin::Attribution, |txn| {
            for para in &targets {
                txn.set_session_id(*para, session)?;
            }
            Ok(())
        })?;
        debug!(
            target: "tsuzuri::attribution",
            session_index = session,
            stamped = targets.len(),
            "stamped paragraphs"
        );
        Ok(targets)
    }
}

impl ChangeListener for AttributionEngine {
    fn on_change(&mut self, event: &ChangeEvent, doc: &mut Document) {
        if event.is_from(ChangeOrigin::Attribution) {
            return;
        }
        if let Err(e) = self.stamp(doc) {
            warn!(target: "tsuzuri::attribution", version = event.version, "attribution pass failed: {e}");
        }
    }
}

/// Paragraphs without a session id that the selection touches, in document
/// order. Each selected node counts itself if it is a paragraph, otherwise
/// its parent if that is one.
fn unstamped_selected_paragraphs(tree: &Tree) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::new();
    for id in tree.selected_nodes() {
        let candidate = [Some(id), tree.parent(id)]
            .into_iter()
            .flatten()
            .find(|n| tree.kind(*n).is_some_and(|k| k.is_paragraph()));
        let Some(para) = candidate else {
            continue;
        };
        let unstamped = tree.kind(para).is_some_and(|k| k.session_id().is_none());
        if unstamped && !out.contains(&para) {
            out.push(para);
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
