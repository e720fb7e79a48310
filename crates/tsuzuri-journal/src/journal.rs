//! An open journal entry: document, engines, and session tracking wired
//! together.

use tracing::{debug, info};
use tsuzuri_doc::{Document, Editor, Transaction, Tree};
use tsuzuri_types::SessionRecord;

use crate::attribution::AttributionEngine;
use crate::clock::Clock;
use crate::config::JournalConfig;
use crate::dividers::DividerSync;
use crate::entry::JournalEntry;
use crate::error::JournalResult;
use crate::session_log::SessionLog;
use crate::time_travel::TimeTravel;

/// Attribution runs before divider sync, so a freshly stamped paragraph gets
/// its divider in the same dispatch.
pub type JournalEditor = Editor<(AttributionEngine, DividerSync)>;

/// An entry being edited.
pub struct Journal {
    config: JournalConfig,
    clock: Clock,
    log: SessionLog,
    editor: JournalEditor,
}

impl Journal {
    /// Open a stored entry. Dividers are brought up to date immediately.
    pub fn open(entry: JournalEntry, config: JournalConfig) -> JournalResult<Self> {
        Self::open_with_clock(entry, config, Clock::System)
    }

    pub fn open_with_clock(
        entry: JournalEntry,
        config: JournalConfig,
        clock: Clock,
    ) -> JournalResult<Self> {
        let doc = Document::import(entry.id, &entry.document)?;
        let log = SessionLog::from_sessions(entry.sessions, config.inactivity_timeout());
        let attribution = AttributionEngine::new(log.active_index());
        let dividers =
            DividerSync::from_config(log.sessions().to_vec(), &config).with_clock(clock);
        let editor =
            Editor::with_max_rounds(doc, (attribution, dividers), config.max_dispatch_rounds);
        info!(entry = %entry.id.short(), sessions = log.sessions().len(), "opened entry");
        Ok(Self {
            config,
            clock,
            log,
            editor,
        })
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    /// The latest tree.
    pub fn tree(&self) -> std::sync::Arc<Tree> {
        self.editor.document().snapshot()
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        self.log.sessions()
    }

    pub fn attribution(&self) -> &AttributionEngine {
        &self.editor.listeners().0
    }

    pub fn dividers(&self) -> &DividerSync {
        &self.editor.listeners().1
    }

    /// Change the time source (tests, replays of recorded input).
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
        self.editor.listeners_mut().1.set_clock(clock);
    }

    fn snapshot_json(&self) -> JournalResult<String> {
        Ok(self.editor.document().to_json()?)
    }

    /// Hand the current session state to both engines.
    fn push_sessions(&mut self) {
        let current = self.log.active_index();
        let sessions = self.log.sessions().to_vec();
        let (attribution, dividers) = self.editor.listeners_mut();
        attribution.set_current_session(current);
        dividers.set_sessions(sessions);
    }

    /// Apply a user edit.
    ///
    /// Counts as activity: opens a session if none is open, or rolls over to
    /// a new one if the open session has gone idle. The edit is then
    /// attributed and dividers resynced before this returns.
    ///
    /// A rejected edit is not activity; the session log is left as it was.
    pub fn edit<R>(
        &mut self,
        f: impl FnOnce(&mut Transaction) -> tsuzuri_doc::Result<R>,
    ) -> JournalResult<R> {
        let now = self.clock.now();
        let before = self.log.clone();
        if self.log.is_stale(now) {
            let snapshot = self.snapshot_json()?;
            self.log.close_idle(Some(snapshot));
        }
        self.log.touch(now);
        self.push_sessions();

        match self.editor.edit(f) {
            Ok(out) => Ok(out),
            Err(e) => {
                debug!(error = %e, "edit rejected, session log unchanged");
                self.log = before;
                self.push_sessions();
                Err(e.into())
            }
        }
    }

    /// Store the current document in the open session (periodic save).
    pub fn save(&mut self) -> JournalResult<bool> {
        let snapshot = self.snapshot_json()?;
        Ok(self.log.save_snapshot(snapshot))
    }

    /// Close the open session (writer leaves the entry). Dividers are
    /// refreshed to show the final duration.
    pub fn close_session(&mut self) -> JournalResult<bool> {
        let snapshot = self.snapshot_json()?;
        let closed = self.log.close(self.clock.now(), Some(snapshot)).is_some();
        if closed {
            self.push_sessions();
            self.editor.refresh();
        }
        Ok(closed)
    }

    /// Re-run both engines against the current content, e.g. after the
    /// host re-supplied configuration.
    pub fn refresh(&mut self) {
        self.push_sessions();
        self.editor.refresh();
    }

    /// A replay scrubber over this entry's sessions.
    pub fn time_travel(&self) -> TimeTravel {
        TimeTravel::from_config(self.log.sessions().to_vec(), &self.config).with_clock(self.clock)
    }

    /// The entry in its stored form.
    pub fn to_entry(&self) -> JournalEntry {
        JournalEntry {
            id: self.editor.document().entry_id(),
            sessions: self.log.sessions().to_vec(),
            document: self.editor.document().export(),
        }
    }
}
