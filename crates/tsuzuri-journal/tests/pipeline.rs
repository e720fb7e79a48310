//! End-to-end: edits flow through attribution and divider sync, sessions
//! roll over, and the history replays.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use tsuzuri_doc::Selection;
use tsuzuri_journal::{ChangeKind, Clock, Journal, JournalConfig, JournalEntry};
use tsuzuri_types::{NodeId, NodeKind, SessionRecord};

fn at(minutes: i64) -> Clock {
    let t0: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
    Clock::Fixed(t0 + Duration::minutes(minutes))
}

fn new_journal() -> Journal {
    Journal::open_with_clock(JournalEntry::new(), JournalConfig::default(), at(0)).unwrap()
}

/// `D(label)` for dividers, `P<sid>:text` for paragraphs.
fn outline(journal: &Journal) -> Vec<String> {
    let tree = journal.tree();
    tree.blocks()
        .iter()
        .map(|id| match tree.kind(*id) {
            Some(NodeKind::Divider(label)) => format!("D({})", label.display()),
            Some(NodeKind::Paragraph { session_id }) => {
                let sid = session_id.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
                format!("P{sid}:{}", tree.text_content(*id))
            }
            other => format!("{other:?}"),
        })
        .collect()
}

#[test]
fn test_typing_is_attributed_and_divided() {
    let mut journal = new_journal();
    journal.edit(|txn| txn.append_paragraph("Woke early.")).unwrap();
    assert_eq!(outline(&journal), vec!["D(09:00 · <1m)", "P0:Woke early."]);

    journal.set_clock(at(10));
    journal.edit(|txn| txn.append_paragraph("Coffee.")).unwrap();
    assert_eq!(
        outline(&journal),
        vec!["D(09:00 · 10m)", "P0:Woke early.", "P0:Coffee."]
    );
    assert_eq!(journal.document().pending_len(), 0);
}

#[test]
fn test_second_session_gets_divider_once_long_enough() {
    let mut journal = new_journal();
    journal.edit(|txn| txn.append_paragraph("Woke early.")).unwrap();
    journal.set_clock(at(10));
    journal.edit(|txn| txn.append_paragraph("Coffee.")).unwrap();
    assert!(journal.close_session().unwrap());

    journal.set_clock(at(120));
    journal.edit(|txn| txn.append_paragraph("Evening walk.")).unwrap();
    // Session 1 is still under a minute old.
    assert_eq!(
        outline(&journal),
        vec!["D(09:00 · 10m)", "P0:Woke early.", "P0:Coffee.", "P1:Evening walk."]
    );

    journal.set_clock(at(125));
    journal.edit(|txn| txn.append_paragraph("Rain.")).unwrap();
    assert_eq!(
        outline(&journal),
        vec![
            "D(09:00 · 10m)",
            "P0:Woke early.",
            "P0:Coffee.",
            "D(11:00 · 5m)",
            "P1:Evening walk.",
            "P1:Rain.",
        ]
    );
}

#[test]
fn test_idle_gap_rolls_over_session() {
    let mut journal = new_journal();
    journal.edit(|txn| txn.append_paragraph("Before lunch.")).unwrap();

    journal.set_clock(at(45));
    journal.edit(|txn| txn.append_paragraph("After lunch.")).unwrap();

    let sessions = journal.sessions();
    assert_eq!(sessions.len(), 2);
    assert!(!sessions[0].is_active());
    let snapshot = sessions[0].content_snapshot.as_deref().unwrap();
    assert_eq!(tsuzuri_journal::plain_text(snapshot), "Before lunch.");
    assert_eq!(journal.attribution().current_session(), Some(1));
}

#[test]
fn test_old_paragraph_keeps_its_session() {
    let mut journal = new_journal();
    let first = journal.edit(|txn| txn.append_paragraph("Draft")).unwrap();
    journal.close_session().unwrap();

    journal.set_clock(at(90));
    journal
        .edit(|txn| {
            let run = txn.children(first)[0];
            txn.append_text(run, " revised")?;
            txn.set_selection(Some(Selection::caret(run, 13)))
        })
        .unwrap();

    let tree = journal.tree();
    assert_eq!(tree.kind(first).and_then(NodeKind::session_id), Some(0));
    assert_eq!(tree.text_content(first), "Draft revised");
}

#[test]
fn test_split_tail_belongs_to_current_session() {
    let mut journal = new_journal();
    let first = journal
        .edit(|txn| txn.append_paragraph("Morning run. Felt good."))
        .unwrap();
    journal.close_session().unwrap();

    journal.set_clock(at(180));
    let tail = journal
        .edit(|txn| {
            let run = txn.children(first)[0];
            txn.split_paragraph(run, 12)
        })
        .unwrap();

    let tree = journal.tree();
    assert_eq!(tree.kind(first).and_then(NodeKind::session_id), Some(0));
    assert_eq!(tree.kind(tail).and_then(NodeKind::session_id), Some(1));
    assert_eq!(tree.text_content(tail), " Felt good.");
}

#[test]
fn test_replay_after_two_sessions() {
    let mut journal = new_journal();
    journal.edit(|txn| txn.append_paragraph("Woke early.")).unwrap();
    journal.set_clock(at(10));
    journal.close_session().unwrap();

    journal.set_clock(at(120));
    journal.edit(|txn| txn.append_paragraph("Evening walk.")).unwrap();
    journal.set_clock(at(130));
    journal.close_session().unwrap();

    let mut tt = journal.time_travel();
    assert_eq!(tt.len(), 2);
    assert_eq!(tt.active_index(), Some(1));

    let frame = tt.frame().unwrap();
    assert_eq!(frame.session_index, 1);
    assert_eq!(frame.text(), "Woke early.\n\nEvening walk.");
    assert_eq!(frame.added_text().collect::<String>(), "\n\nEvening walk.");
    assert_eq!(frame.time_label, "11:00");
    assert_eq!(frame.duration_label, "10m");

    tt.step_backward();
    let first = tt.frame().unwrap();
    assert_eq!(first.segments.len(), 1);
    assert_eq!(first.segments[0].kind, ChangeKind::Added);
    assert_eq!(first.text(), "Woke early.");
}

#[test]
fn test_entry_roundtrip_restores_dividers() {
    let mut journal = new_journal();
    journal.edit(|txn| txn.append_paragraph("One.")).unwrap();
    journal.set_clock(at(5));
    journal.close_session().unwrap();

    let json = journal.to_entry().to_json_pretty().unwrap();
    let restored = Journal::open_with_clock(
        JournalEntry::from_json(&json).unwrap(),
        JournalConfig::default(),
        at(500),
    )
    .unwrap();

    assert_eq!(outline(&restored), outline(&journal));
    assert_eq!(restored.document().entry_id(), journal.document().entry_id());
    assert_eq!(restored.sessions(), journal.sessions());
}

#[test]
fn test_loaded_entry_without_dividers_gets_them() {
    let json = r#"{
        "sessions": [
            {"index": 0, "start_time": "2026-03-14T09:00:00Z", "end_time": "2026-03-14T09:00:30Z"},
            {"index": 1, "start_time": "2026-03-14T12:00:00Z", "end_time": "2026-03-14T12:05:00Z"}
        ],
        "document": {"version": 1, "children": [
            {"type": "paragraph", "session_id": 0, "children": [{"type": "text", "text": "a"}]},
            {"type": "paragraph", "session_id": 0, "children": [{"type": "text", "text": "b"}]},
            {"type": "paragraph", "session_id": 1, "children": [{"type": "text", "text": "c"}]},
            {"type": "paragraph", "session_id": 1, "children": [{"type": "text", "text": "d"}]}
        ]}
    }"#;
    let journal = Journal::open_with_clock(
        JournalEntry::from_json(json).unwrap(),
        JournalConfig::default(),
        at(600),
    )
    .unwrap();

    assert_eq!(
        outline(&journal),
        vec!["D(09:00 · <1m)", "P0:a", "P0:b", "D(12:00 · 5m)", "P1:c", "P1:d"]
    );
}

#[test]
fn test_custom_config_applies() {
    let config = JournalConfig::from_ron_str(r#"(time_format: "%I:%M %p", min_divider_secs: 3600)"#)
        .unwrap();
    let mut journal = Journal::open_with_clock(JournalEntry::new(), config, at(0)).unwrap();
    journal.edit(|txn| txn.append_paragraph("x")).unwrap();
    journal.close_session().unwrap();
    journal.set_clock(at(200));
    journal.edit(|txn| txn.append_paragraph("y")).unwrap();
    journal.set_clock(at(225));
    journal.edit(|txn| txn.append_paragraph("z")).unwrap();

    // Session 1 is only 25 minutes old: below the configured hour.
    assert_eq!(
        outline(&journal),
        vec!["D(09:00 AM · <1m)", "P0:x", "P1:y", "P1:z"]
    );
}

#[test]
fn test_rejected_edit_opens_no_session() {
    let mut journal = new_journal();
    assert!(journal.edit(|txn| txn.remove(NodeId::ROOT)).is_err());

    assert!(journal.sessions().is_empty());
    assert_eq!(journal.attribution().current_session(), None);
    assert!(journal.tree().is_empty());
}

#[test]
fn test_rejected_edit_keeps_idle_session_open() {
    let mut journal = new_journal();
    journal.edit(|txn| txn.append_paragraph("Before lunch.")).unwrap();

    journal.set_clock(at(45));
    assert!(journal.edit(|txn| txn.remove(NodeId::ROOT)).is_err());
    assert_eq!(journal.sessions().len(), 1);
    assert!(journal.sessions()[0].is_active());
    assert_eq!(journal.attribution().current_session(), Some(0));

    // The next real edit still sees the original idle gap.
    journal.set_clock(at(50));
    journal.edit(|txn| txn.append_paragraph("After lunch.")).unwrap();
    let sessions = journal.sessions();
    assert_eq!(sessions.len(), 2);
    assert_eq!(
        sessions[0].end().map(|e| e.with_timezone(&Utc)),
        Some(at(0).now())
    );
}

#[test]
fn test_restored_idle_session_rolls_over() {
    let mut entry = JournalEntry::new();
    entry.sessions = vec![SessionRecord::open(0, at(0).now())];
    let mut journal =
        Journal::open_with_clock(entry, JournalConfig::default(), at(7 * 24 * 60)).unwrap();

    journal.edit(|txn| txn.append_paragraph("A week later.")).unwrap();

    let sessions = journal.sessions();
    assert_eq!(sessions.len(), 2);
    assert!(!sessions[0].is_active());
    assert_eq!(sessions[0].duration_at(at(0).now()), Some(Duration::zero()));
    assert_eq!(outline(&journal), vec!["D(09:00 · <1m)", "P1:A week later."]);
}

#[test]
fn test_restored_recent_session_continues() {
    let mut entry = JournalEntry::new();
    entry.sessions = vec![SessionRecord::open(0, at(0).now())];
    let mut journal = Journal::open_with_clock(entry, JournalConfig::default(), at(5)).unwrap();

    journal.edit(|txn| txn.append_paragraph("Back again.")).unwrap();

    assert_eq!(journal.sessions().len(), 1);
    assert_eq!(outline(&journal), vec!["D(09:00 · 5m)", "P0:Back again."]);
}
