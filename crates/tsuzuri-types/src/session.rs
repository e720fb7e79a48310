//! Session records.
//!
//! A `SessionRecord` captures one contiguous editing period on an entry. It is
//! opened on first edit (or after a period of inactivity) and closed when the
//! writer stops editing, at which point it gains an end time and a content
//! snapshot. Closed records are immutable.
//!
//! Timestamps are kept as the raw RFC 3339 strings they were persisted with.
//! Parsing happens at read time so that a malformed value degrades to a
//! placeholder in the UI instead of making the whole entry unloadable.

use chrono::{DateTime, Duration, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SessionIndex;

/// One editing period of a journal entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Ordinal position in the entry's session list. Stable, never reused.
    pub index: SessionIndex,
    /// When the session started (RFC 3339).
    pub start_time: String,
    /// When the session ended (RFC 3339). `None` while the session is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Opaque serialized document state captured at close or save time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_snapshot: Option<String>,
}

impl SessionRecord {
    /// Open a new, active session starting at `start`.
    pub fn open(index: SessionIndex, start: DateTime<Utc>) -> Self {
        Self {
            index,
            start_time: format_timestamp(start),
            end_time: None,
            content_snapshot: None,
        }
    }

    /// Build a closed session record (restore paths and tests).
    pub fn closed(
        index: SessionIndex,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        content_snapshot: Option<String>,
    ) -> Self {
        Self {
            index,
            start_time: format_timestamp(start),
            end_time: Some(format_timestamp(end)),
            content_snapshot,
        }
    }

    /// Whether the session is still open (no end time).
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Parsed start time, `None` if the stored value is malformed.
    pub fn start(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.start_time).ok()
    }

    /// Parsed end time, `None` if active or malformed.
    pub fn end(&self) -> Option<DateTime<FixedOffset>> {
        self.end_time
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }

    /// Session length, measuring an active session up to `now`.
    ///
    /// `None` when either bound is malformed. Clock skew that would yield a
    /// negative span is clamped to zero.
    pub fn duration_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        let start = self.start()?;
        let end = match &self.end_time {
            Some(_) => self.end()?.with_timezone(&Utc),
            None => now,
        };
        let span = end.signed_duration_since(start.with_timezone(&Utc));
        Some(span.max(Duration::zero()))
    }

    /// Close the session at `end`, capturing `snapshot` if one is given.
    ///
    /// Returns `false` (and changes nothing) if the session was already closed.
    pub fn close(&mut self, end: DateTime<Utc>, snapshot: Option<String>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.end_time = Some(format_timestamp(end));
        if snapshot.is_some() {
            self.content_snapshot = snapshot;
        }
        true
    }
}

/// Canonical timestamp encoding for session records.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// Tests
// ============================================================================
