//! Persisted journal entries.

use serde::{Deserialize, Serialize};
use tsuzuri_types::{EntryId, SerializedDocument, SessionRecord};

/// One entry as stored: its sessions and its document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub id: EntryId,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default = "empty_document")]
    pub document: SerializedDocument,
}

fn empty_document() -> SerializedDocument {
    SerializedDocument::new(Vec::new())
}

impl JournalEntry {
    /// A fresh, empty entry.
    pub fn new() -> Self {
        Self {
            id: EntryId::new(),
            sessions: Vec::new(),
            document: empty_document(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for JournalEntry {
    fn default() -> Self {
        Self::new()
    }
}
