//! Property tests for attribution, divider layout, and word diffs.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use tsuzuri_doc::{ChangeOrigin, Document};
use tsuzuri_journal::diff::{new_text, old_text};
use tsuzuri_journal::{AttributionEngine, Clock, DividerSync, diff_words};
use tsuzuri_types::{
    EntryId, NodeKind, SerializedDocument, SerializedNode, SessionIndex, SessionRecord,
};

const SESSIONS: u32 = 4;

fn sessions_with_lengths(lengths: &[i64]) -> Vec<SessionRecord> {
    let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
    lengths
        .iter()
        .enumerate()
        .map(|(i, len)| {
            let start = t0 + Duration::hours(i as i64);
            SessionRecord::closed(i as SessionIndex, start, start + Duration::seconds(*len), None)
        })
        .collect()
}

fn import(ids: &[Option<SessionIndex>]) -> Document {
    let nodes = ids
        .iter()
        .map(|sid| SerializedNode::paragraph(*sid, "text"))
        .collect();
    let mut doc = Document::import(EntryId::new(), &SerializedDocument::new(nodes)).unwrap();
    doc.clear_pending();
    doc
}

fn engine(lengths: &[i64]) -> DividerSync {
    let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
    DividerSync::new(sessions_with_lengths(lengths)).with_clock(Clock::Fixed(t0 + Duration::days(1)))
}

/// For each paragraph in order: (session id, whether a divider precedes it).
fn paragraphs_with_dividers(doc: &Document) -> Vec<(Option<SessionIndex>, bool)> {
    doc.read(|tree| {
        let mut out = Vec::new();
        let mut after_divider = false;
        for id in tree.blocks() {
            match tree.kind(*id) {
                Some(NodeKind::Divider(_)) => after_divider = true,
                Some(kind) => {
                    out.push((kind.session_id(), after_divider));
                    after_divider = false;
                }
                None => {}
            }
        }
        out
    })
}

fn lengths_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..600, SESSIONS as usize)
}

fn words_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-z]{1,6}",
            Just(" ".to_string()),
            Just("\n\n".to_string()),
            Just(", ".to_string()),
        ],
        0..20,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_session_ids_are_sticky(first in 0..SESSIONS, later in prop::collection::vec(0..SESSIONS, 1..6)) {
        let mut doc = Document::new(EntryId::new());
        let para = doc.update(ChangeOrigin::User, |txn| txn.append_paragraph("hello")).unwrap();
        AttributionEngine::new(Some(first)).stamp(&mut doc).unwrap();

        for session in later {
            let stamped = AttributionEngine::new(Some(session)).stamp(&mut doc).unwrap();
            prop_assert!(stamped.is_empty());
        }
        let sid = doc.read(|t| t.kind(para).and_then(NodeKind::session_id));
        prop_assert_eq!(sid, Some(first));
    }

    #[test]
    fn prop_divider_sync_is_idempotent(
        ids in prop::collection::vec(prop::option::of(0..SESSIONS + 1), 0..12),
        lengths in lengths_strategy(),
    ) {
        let mut doc = import(&ids);
        let sync = engine(&lengths);
        sync.sync(&mut doc).unwrap();
        let version = doc.version();
        let exported = doc.export();

        let again = sync.sync(&mut doc).unwrap();
        prop_assert!(!again.changed);
        prop_assert_eq!(doc.version(), version);
        prop_assert_eq!(doc.export(), exported);
    }

    #[test]
    fn prop_divider_before_run_starts_only(
        ids in prop::collection::vec(0..SESSIONS, 1..12),
        lengths in lengths_strategy(),
    ) {
        let mut doc = import(&ids.iter().copied().map(Some).collect::<Vec<_>>());
        engine(&lengths).sync(&mut doc).unwrap();

        let layout = paragraphs_with_dividers(&doc);
        prop_assert_eq!(layout.len(), ids.len());
        for (i, (sid, has_divider)) in layout.iter().enumerate() {
            let sid = sid.unwrap();
            let expected = i == 0 || (sid != ids[i - 1] && lengths[sid as usize] >= 60);
            prop_assert_eq!(*has_divider, expected, "paragraph {} in {:?}", i, ids);
        }
    }

    #[test]
    fn prop_first_attributed_paragraph_has_divider(
        ids in prop::collection::vec(prop::option::of(0..SESSIONS), 1..12),
        lengths in lengths_strategy(),
    ) {
        let mut doc = import(&ids);
        engine(&lengths).sync(&mut doc).unwrap();

        let layout = paragraphs_with_dividers(&doc);
        let dividers = layout.iter().filter(|(_, d)| *d).count();
        match layout.iter().find(|(sid, _)| sid.is_some()) {
            Some((_, has_divider)) => prop_assert!(*has_divider),
            None => prop_assert_eq!(dividers, 0),
        }
        prop_assert!(layout.iter().all(|(sid, d)| sid.is_some() || !d));
    }

    #[test]
    fn prop_diff_reassembles_both_texts(old in words_strategy(), new in words_strategy()) {
        let parts = diff_words(&old, &new);
        prop_assert_eq!(new_text(&parts), new);
        prop_assert_eq!(old_text(&parts), old);
        prop_assert!(parts.iter().all(|p| !(p.added && p.removed)));
    }
}
