//! Time travel: replaying an entry session by session.
//!
//! Each closed session carries a snapshot of the document as it stood when
//! the session ended. Scrubbing to session `k` shows snapshot `k`, with the
//! words added since snapshot `k - 1` highlighted. Removed words are
//! computed but never shown. The first session has no predecessor, so all
//! of its text counts as added.
//!
//! The engine works purely off the session list; it never reads or writes
//! the live document.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tsuzuri_types::{SerializedDocument, SessionIndex, SessionRecord};

use crate::clock::Clock;
use crate::config::JournalConfig;
use crate::diff::{DiffPart, diff_words};
use crate::labels::{duration_label, time_label};

/// How a segment of a frame renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present before this session (rendered muted).
    Unchanged,
    /// Written during this session (highlighted).
    Added,
}

/// A run of frame text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub kind: ChangeKind,
}

/// What the replay view shows for one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFrame {
    pub session_index: SessionIndex,
    pub segments: Vec<Segment>,
    /// Session start time, or `--:--` if unknown.
    pub time_label: String,
    /// Session length, or empty if unknown.
    pub duration_label: String,
}

impl DiffFrame {
    /// The snapshot text this frame shows.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Only the text added in this session.
    pub fn added_text(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter(|s| s.kind == ChangeKind::Added)
            .map(|s| s.text.as_str())
    }
}

/// Extract plain text from a content snapshot.
///
/// Snapshots that don't parse as a serialized document are taken to be
/// plain text already.
pub fn plain_text(snapshot: &str) -> String {
    match SerializedDocument::from_json(snapshot) {
        Ok(doc) => doc.plain_text(),
        Err(e) => {
            warn!(
                target: "tsuzuri::time_travel",
                "snapshot is not a serialized document, using it verbatim: {e}"
            );
            snapshot.to_string()
        }
    }
}

/// Scrubber over an entry's sessions.
#[derive(Clone, Debug)]
pub struct TimeTravel {
    sessions: Vec<SessionRecord>,
    active: Option<usize>,
    time_format: String,
    clock: Clock,
}

impl TimeTravel {
    /// Start at the most recent session.
    pub fn new(sessions: Vec<SessionRecord>) -> Self {
        Self::from_config(sessions, &JournalConfig::default())
    }

    pub fn from_config(sessions: Vec<SessionRecord>, config: &JournalConfig) -> Self {
        let active = sessions.len().checked_sub(1);
        Self {
            sessions,
            active,
            time_format: config.time_format.clone(),
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the session list and jump to its last session.
    pub fn set_sessions(&mut self, sessions: Vec<SessionRecord>) {
        self.active = sessions.len().checked_sub(1);
        self.sessions = sessions;
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Position of the active session in the list. `None` when empty.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_session(&self) -> Option<&SessionRecord> {
        self.sessions.get(self.active?)
    }

    /// Move one session later. Stays put at the end.
    pub fn step_forward(&mut self) -> Option<usize> {
        if let Some(i) = self.active {
            self.active = Some((i + 1).min(self.sessions.len() - 1));
        }
        self.active
    }

    /// Move one session earlier. Stays put at the start.
    pub fn step_backward(&mut self) -> Option<usize> {
        if let Some(i) = self.active {
            self.active = Some(i.saturating_sub(1));
        }
        self.active
    }

    /// Jump to a scrubber position, rounded to the nearest session and
    /// clamped to the list. Non-finite positions are ignored.
    pub fn jump_to(&mut self, position: f64) -> Option<usize> {
        if self.sessions.is_empty() || !position.is_finite() {
            return self.active;
        }
        let last = (self.sessions.len() - 1) as f64;
        self.active = Some(position.round().clamp(0.0, last) as usize);
        self.active
    }

    fn snapshot_text(&self, pos: usize) -> String {
        match self.sessions.get(pos).and_then(|s| s.content_snapshot.as_deref()) {
            Some(snapshot) => plain_text(snapshot),
            None => {
                debug!(target: "tsuzuri::time_travel", position = pos, "session has no snapshot");
                String::new()
            }
        }
    }

    /// Raw word diff for the active session, including removed parts.
    pub fn raw_diff(&self) -> Option<Vec<DiffPart>> {
        let pos = self.active?;
        let new = self.snapshot_text(pos);
        if pos == 0 {
            return Some(vec![DiffPart {
                value: new,
                added: true,
                removed: false,
            }]);
        }
        let old = self.snapshot_text(pos - 1);
        Some(diff_words(&old, &new))
    }

    /// The frame to show for the active session.
    pub fn frame(&self) -> Option<DiffFrame> {
        let session = self.active_session()?;
        let segments = self
            .raw_diff()?
            .into_iter()
            .filter(|p| !p.removed)
            .map(|p| Segment {
                kind: if p.added {
                    ChangeKind::Added
                } else {
                    ChangeKind::Unchanged
                },
                text: p.value,
            })
            .collect();

        Some(DiffFrame {
            session_index: session.index,
            segments,
            time_label: time_label(session.start(), &self.time_format),
            duration_label: session
                .duration_at(self.clock.now())
                .map(duration_label)
                .unwrap_or_default(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tsuzuri_types::SerializedNode;

    fn snapshot(paragraphs: &[&str]) -> String {
        SerializedDocument::new(
            paragraphs
                .iter()
                .map(|p| SerializedNode::paragraph(Some(0), *p))
                .collect(),
        )
        .to_json()
        .unwrap()
    }

    fn sessions(texts: &[&[&str]]) -> Vec<SessionRecord> {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        texts
            .iter()
            .enumerate()
            .map(|(i, paras)| {
                let start = t0 + Duration::hours(i as i64);
                SessionRecord::closed(
                    i as SessionIndex,
                    start,
                    start + Duration::minutes(20),
                    Some(snapshot(paras)),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_list_has_no_frame() {
        let mut tt = TimeTravel::new(vec![]);
        assert_eq!(tt.active_index(), None);
        assert_eq!(tt.step_forward(), None);
        assert_eq!(tt.step_backward(), None);
        assert_eq!(tt.jump_to(3.0), None);
        assert!(tt.frame().is_none());
    }

    #[test]
    fn test_starts_at_last_session() {
        let tt = TimeTravel::new(sessions(&[&["a"], &["a", "b"]]));
        assert_eq!(tt.active_index(), Some(1));
        assert_eq!(tt.len(), 2);
    }

    #[test]
    fn test_navigation_clamps() {
        let mut tt = TimeTravel::new(sessions(&[&["a"], &["b"], &["c"]]));
        assert_eq!(tt.step_forward(), Some(2));
        assert_eq!(tt.step_backward(), Some(1));
        assert_eq!(tt.step_backward(), Some(0));
        assert_eq!(tt.step_backward(), Some(0));
        assert_eq!(tt.jump_to(1.4), Some(1));
        assert_eq!(tt.jump_to(1.6), Some(2));
        assert_eq!(tt.jump_to(-5.0), Some(0));
        assert_eq!(tt.jump_to(99.0), Some(2));
        assert_eq!(tt.jump_to(f64::NAN), Some(2));
    }

    #[test]
    fn test_first_session_is_all_added() {
        let mut tt = TimeTravel::new(sessions(&[&["Dear diary,", "today was long."], &["x"]]));
        tt.jump_to(0.0);
        let frame = tt.frame().unwrap();
        assert_eq!(
            frame.segments,
            vec![Segment {
                text: "Dear diary,\n\ntoday was long.".to_string(),
                kind: ChangeKind::Added,
            }]
        );
        assert_eq!(frame.time_label, "09:00");
        assert_eq!(frame.duration_label, "20m");
    }

    #[test]
    fn test_later_session_highlights_additions_only() {
        let tt = TimeTravel::new(sessions(&[&["the quiet morning"], &["the loud morning", "then rain"]]));
        let frame = tt.frame().unwrap();
        assert_eq!(frame.session_index, 1);
        assert_eq!(frame.text(), "the loud morning\n\nthen rain");
        let added: Vec<&str> = frame.added_text().collect();
        assert_eq!(added, vec!["loud", "\n\nthen rain"]);
        assert!(frame.segments.iter().all(|s| !s.text.contains("quiet")));

        let raw = tt.raw_diff().unwrap();
        assert!(raw.iter().any(|p| p.removed && p.value == "quiet"));
    }

    #[test]
    fn test_dividers_excluded_from_text() {
        let doc = SerializedDocument::new(vec![
            SerializedNode::new(tsuzuri_types::SerializedBody::Divider {
                start_time: "09:00".into(),
                duration: "5m".into(),
                session_id: 0,
            }),
            SerializedNode::paragraph(Some(0), "body"),
        ]);
        assert_eq!(plain_text(&doc.to_json().unwrap()), "body");
    }

    #[test]
    fn test_unparseable_snapshot_used_verbatim() {
        assert_eq!(plain_text("just some words"), "just some words");
    }

    #[test]
    fn test_missing_snapshot_is_empty_text() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let tt = TimeTravel::new(vec![SessionRecord::open(0, t0)])
            .with_clock(Clock::Fixed(t0 + Duration::seconds(30)));
        let frame = tt.frame().unwrap();
        assert_eq!(frame.text(), "");
        assert_eq!(frame.duration_label, "<1m");
    }

    #[test]
    fn test_malformed_timestamps_use_placeholders() {
        let mut records = sessions(&[&["a"]]);
        records[0].start_time = "not a time".into();
        let frame = TimeTravel::new(records).frame().unwrap();
        assert_eq!(frame.time_label, "--:--");
        assert_eq!(frame.duration_label, "");
    }
}
