//! Word-level diffing between snapshot texts.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

/// A run of text that is unchanged, added, or removed.
///
/// At most one of `added` and `removed` is set. Neighbouring parts always
/// differ in kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffPart {
    pub value: String,
    #[serde(default)]
    pub added: bool,
    #[serde(default)]
    pub removed: bool,
}

impl DiffPart {
    fn from_tag(tag: ChangeTag, value: &str) -> Self {
        Self {
            value: value.to_string(),
            added: tag == ChangeTag::Insert,
            removed: tag == ChangeTag::Delete,
        }
    }

    fn same_kind(&self, tag: ChangeTag) -> bool {
        self.added == (tag == ChangeTag::Insert) && self.removed == (tag == ChangeTag::Delete)
    }

    pub fn is_unchanged(&self) -> bool {
        !self.added && !self.removed
    }
}

/// Diff `old` against `new` word by word. Whitespace runs are tokens too, so
/// the non-removed parts concatenate back to exactly `new`, and the
/// non-added parts to exactly `old`.
pub fn diff_words(old: &str, new: &str) -> Vec<DiffPart> {
    let diff = TextDiff::from_words(old, new);
    let mut parts: Vec<DiffPart> = Vec::new();
    for change in diff.iter_all_changes() {
        let tag = change.tag();
        match parts.last_mut() {
            Some(last) if last.same_kind(tag) => last.value.push_str(change.value()),
            _ => parts.push(DiffPart::from_tag(tag, change.value())),
        }
    }
    parts
}

/// Reassemble the new text from a diff.
pub fn new_text(parts: &[DiffPart]) -> String {
    parts.iter().filter(|p| !p.removed).map(|p| p.value.as_str()).collect()
}

/// Reassemble the old text from a diff.
pub fn old_text(parts: &[DiffPart]) -> String {
    parts.iter().filter(|p| !p.added).map(|p| p.value.as_str()).collect()
}

// ============================================================================
// Tests
// ============================================================================
