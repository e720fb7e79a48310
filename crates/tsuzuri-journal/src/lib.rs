//! Session-aware journaling on top of the Tsuzuri document tree.
//!
//! - [`AttributionEngine`] stamps paragraphs with the session that first
//!   typed into them.
//! - [`DividerSync`] derives session dividers from those stamps.
//! - [`TimeTravel`] replays an entry session by session with word diffs.
//! - [`SessionLog`] opens and closes sessions from editing activity.
//! - [`Journal`] wires all of the above around one entry.
//!
//! Engines log through `tracing` under the `tsuzuri::attribution`,
//! `tsuzuri::dividers` and `tsuzuri::time_travel` targets. Anomalies in
//! engine passes (unknown sessions, bad timestamps, unreadable snapshots)
//! are logged and degrade the output; they never fail an edit.

pub mod attribution;
pub mod clock;
pub mod config;
pub mod diff;
pub mod dividers;
pub mod entry;
pub mod error;
pub mod journal;
pub mod labels;
pub mod session_log;
pub mod time_travel;

pub use attribution::AttributionEngine;
pub use clock::Clock;
pub use config::{ConfigError, JournalConfig};
pub use diff::{DiffPart, diff_words};
pub use dividers::{DividerPlan, DividerSync, PlannedDivider, SyncReport};
pub use entry::JournalEntry;
pub use error::{JournalError, JournalResult};
pub use journal::{Journal, JournalEditor};
pub use labels::{PLACEHOLDER_TIME, duration_label, time_label};
pub use session_log::SessionLog;
pub use time_travel::{ChangeKind, DiffFrame, Segment, TimeTravel, plain_text};
