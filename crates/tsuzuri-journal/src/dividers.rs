//! Session divider synchronization.
//!
//! Dividers are derived from paragraph session ids and the session list.
//! Every pass plans the full divider layout from scratch; if it differs from
//! what the tree holds, all dividers are removed and the planned ones are
//! inserted in a single `DividerSync` transaction.
//!
//! Layout rules, walking top-level blocks in order:
//!
//! - the first attributed paragraph always gets a divider, however short its
//!   session was;
//! - after that, a paragraph starting a new run of session ids gets a
//!   divider if its session lasted at least `min_divider`;
//! - paragraphs without a session id, and non-paragraph blocks, neither get
//!   a divider nor break a run;
//! - a paragraph naming an unknown session gets no divider and a warning,
//!   but still counts as the previous id for the next paragraph.

use chrono::Duration;
use tracing::{debug, warn};
use tsuzuri_doc::{ChangeEvent, ChangeListener, ChangeOrigin, Document, Tree};
use tsuzuri_types::{DividerLabel, NodeId, NodeKind, SessionIndex, SessionRecord};

use crate::clock::Clock;
use crate::config::JournalConfig;
use crate::labels::{duration_label, time_label};

/// One planned divider: the paragraph it goes before, and its label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedDivider {
    pub before: NodeId,
    pub label: DividerLabel,
}

/// Outcome of planning a pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DividerPlan {
    pub dividers: Vec<PlannedDivider>,
    /// Session ids found on paragraphs that match no known session.
    pub orphans: Vec<SessionIndex>,
}

/// Outcome of a sync pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Dividers removed from the tree.
    pub removed: usize,
    /// Dividers inserted, in document order.
    pub inserted: Vec<NodeId>,
    /// Unknown session ids encountered.
    pub orphans: Vec<SessionIndex>,
    /// Whether a transaction was committed.
    pub changed: bool,
}

/// Keeps divider nodes in line with paragraph attribution.
#[derive(Clone, Debug)]
pub struct DividerSync {
    sessions: Vec<SessionRecord>,
    min_divider: Duration,
    time_format: String,
    clock: Clock,
}

impl DividerSync {
    /// Divider sync with default thresholds and the system clock.
    pub fn new(sessions: Vec<SessionRecord>) -> Self {
        Self::from_config(sessions, &JournalConfig::default())
    }

    pub fn from_config(sessions: Vec<SessionRecord>, config: &JournalConfig) -> Self {
        Self {
            sessions,
            min_divider: config.min_divider(),
            time_format: config.time_format.clone(),
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_min_divider(mut self, min_divider: Duration) -> Self {
        self.min_divider = min_divider;
        self
    }

    /// Re-supply the session list. Takes effect on the next pass.
    pub fn set_sessions(&mut self, sessions: Vec<SessionRecord>) {
        self.sessions = sessions;
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn min_divider(&self) -> Duration {
        self.min_divider
    }

    fn session(&self, index: SessionIndex) -> Option<&SessionRecord> {
        self.sessions.iter().find(|s| s.index == index)
    }

    fn label_for(&self, session: &SessionRecord, duration: Option<Duration>) -> DividerLabel {
        DividerLabel::new(
            session.index,
            time_label(session.start(), &self.time_format),
            duration.map(duration_label).unwrap_or_default(),
        )
    }

    /// Work out where dividers belong in `tree`. Existing dividers are
    /// ignored.
    pub fn plan(&self, tree: &Tree) -> DividerPlan {
        let now = self.clock.now();
        let mut plan = DividerPlan::default();
        let mut previous: Option<SessionIndex> = None;
        let mut is_first = true;

        for &block in tree.blocks() {
            let Some(NodeKind::Paragraph {
                session_id: Some(id),
            }) = tree.kind(block)
            else {
                continue;
            };
            let id = *id;

            let Some(session) = self.session(id) else {
                warn!(
                    target: "tsuzuri::dividers",
                    session_index = id,
                    known = self.sessions.len(),
                    "paragraph references unknown session, skipping divider"
                );
                if !plan.orphans.contains(&id) {
                    plan.orphans.push(id);
                }
                previous = Some(id);
                continue;
            };

            let is_new_run = previous != Some(id);
            let duration = session.duration_at(now);
            if duration.is_none() && is_new_run {
                warn!(
                    target: "tsuzuri::dividers",
                    session_index = id,
                    start = %session.start_time,
                    "session has malformed timestamps"
                );
            }
            let long_enough = duration.is_some_and(|d| d >= self.min_divider);

            if is_first || (is_new_run && long_enough) {
                plan.dividers.push(PlannedDivider {
                    before: block,
                    label: self.label_for(session, duration),
                });
            }
            previous = Some(id);
            is_first = false;
        }
        plan
    }

    /// Bring the document's dividers in line with the plan.
    ///
    /// Commits nothing when the tree already holds exactly the planned
    /// dividers, so repeated passes over an unchanged tree are free.
    pub fn sync(&self, doc: &mut Document) -> tsuzuri_doc::Result<SyncReport> {
        let (plan, existing, up_to_date) = doc.read(|tree| {
            let plan = self.plan(tree);
            let existing = existing_dividers(tree);
            let up_to_date = existing.len() == plan.dividers.len()
                && existing
                    .iter()
                    .zip(&plan.dividers)
                    .all(|((_, current), planned)| current == planned);
            (plan, existing, up_to_date)
        });

        if up_to_date {
            return Ok(SyncReport {
                orphans: plan.orphans,
                ..Default::default()
            });
        }

        let inserted = doc.update(ChangeOrigin::DividerSync, |txn| {
            for (id, _) in &existing {
                txn.remove(*id)?;
            }
            let mut inserted = Vec::with_capacity(plan.dividers.len());
            for planned in &plan.dividers {
                inserted.push(txn.insert_before(planned.before, NodeKind::Divider(planned.label.clone()))?);
            }
            Ok(inserted)
        })?;

        debug!(
            target: "tsuzuri::dividers",
            removed = existing.len(),
            inserted = inserted.len(),
            version = doc.version(),
            "rebuilt dividers"
        );
        Ok(SyncReport {
            removed: existing.len(),
            inserted,
            orphans: plan.orphans,
            changed: true,
        })
    }
}

impl ChangeListener for DividerSync {
    fn on_change(&mut self, event: &ChangeEvent, doc: &mut Document) {
        if event.is_from(ChangeOrigin::DividerSync) {
            return;
        }
        if let Err(e) = self.sync(doc) {
            warn!(target: "tsuzuri::dividers", version = event.version, "divider sync failed: {e}");
        }
    }
}

/// Every divider in the tree, with the planned form it matches: the node it
/// sits before and its label. A divider with nothing after it (or nested
/// somewhere odd) gets a `before` of the root so it never matches a plan.
fn existing_dividers(tree: &Tree) -> Vec<(NodeId, PlannedDivider)> {
    tree.preorder()
        .into_iter()
        .filter_map(|id| match tree.kind(id) {
            Some(NodeKind::Divider(label)) => {
                let top_level = tree.parent(id) == Some(NodeId::ROOT);
                let before = tree
                    .next_sibling(id)
                    .filter(|_| top_level)
                    .unwrap_or(NodeId::ROOT);
                Some((
                    id,
                    PlannedDivider {
                        before,
                        label: label.clone(),
                    },
                ))
            }
            _ => None,
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
