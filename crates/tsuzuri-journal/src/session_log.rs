//! Session lifecycle tracking.
//!
//! A session opens on the first edit, stays open while edits keep coming,
//! and closes either explicitly (writer leaves the entry) or implicitly when
//! the next edit arrives after the inactivity timeout. An implicitly closed
//! session ends at its last activity, not at the moment the gap was noticed.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use tsuzuri_types::{SessionIndex, SessionRecord};

/// The ordered session list of one entry, plus activity tracking.
#[derive(Clone, Debug)]
pub struct SessionLog {
    sessions: Vec<SessionRecord>,
    last_activity: Option<DateTime<Utc>>,
    inactivity_timeout: Duration,
}

impl SessionLog {
    pub fn new(inactivity_timeout: Duration) -> Self {
        Self::from_sessions(Vec::new(), inactivity_timeout)
    }

    /// Resume from a persisted list.
    ///
    /// Activity within an active session at the end of the list isn't
    /// persisted, so its start time stands in for the last activity. The next
    /// edit continues it only if that falls within the inactivity timeout;
    /// otherwise the session is closed at its start and a new one opens.
    pub fn from_sessions(sessions: Vec<SessionRecord>, inactivity_timeout: Duration) -> Self {
        let last_activity = sessions
            .last()
            .filter(|s| s.is_active())
            .and_then(SessionRecord::start)
            .map(|start| start.with_timezone(&Utc));
        Self {
            sessions,
            last_activity,
            inactivity_timeout,
        }
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// The open session, if any. Only the last session can be open.
    pub fn active(&self) -> Option<&SessionRecord> {
        self.sessions.last().filter(|s| s.is_active())
    }

    pub fn active_index(&self) -> Option<SessionIndex> {
        self.active().map(|s| s.index)
    }

    fn next_index(&self) -> SessionIndex {
        self.sessions.iter().map(|s| s.index + 1).max().unwrap_or(0)
    }

    /// Whether an edit at `now` would start a new session because the open
    /// one has gone idle.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.active().is_some()
            && self
                .last_activity
                .is_some_and(|last| now.signed_duration_since(last) > self.inactivity_timeout)
    }

    /// Record user activity at `now` and return the session it belongs to,
    /// opening one if needed.
    pub fn touch(&mut self, now: DateTime<Utc>) -> SessionIndex {
        if self.is_stale(now) {
            self.close_idle(None);
        }
        self.last_activity = Some(now);

        if let Some(index) = self.active_index() {
            return index;
        }
        let index = self.next_index();
        self.sessions.push(SessionRecord::open(index, now));
        info!(session_index = index, "opened session");
        index
    }

    /// Close an idle session at its last activity time.
    ///
    /// Returns the closed index, or `None` if nothing was open.
    pub fn close_idle(&mut self, snapshot: Option<String>) -> Option<SessionIndex> {
        let end = self.last_activity?;
        self.close(end, snapshot)
    }

    /// Close the open session at `end`, storing `snapshot`.
    ///
    /// Returns the closed index, or `None` if nothing was open.
    pub fn close(&mut self, end: DateTime<Utc>, snapshot: Option<String>) -> Option<SessionIndex> {
        let session = self.sessions.last_mut().filter(|s| s.is_active())?;
        let end = session
            .start()
            .map(|start| end.max(start.with_timezone(&Utc)))
            .unwrap_or(end);
        session.close(end, snapshot);
        info!(session_index = session.index, "closed session");
        Some(session.index)
    }

    /// Update the open session's snapshot (periodic save).
    ///
    /// Returns `false` if no session is open; closed snapshots never change.
    pub fn save_snapshot(&mut self, snapshot: String) -> bool {
        match self.sessions.last_mut().filter(|s| s.is_active()) {
            Some(session) => {
                session.content_snapshot = Some(snapshot);
                debug!(session_index = session.index, "saved snapshot");
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
