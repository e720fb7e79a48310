//! Change notifications and origin tracking.
//!
//! Every committed transaction produces one [`ChangeEvent`] tagged with the
//! [`ChangeOrigin`] that caused it. Listeners that mutate the document in
//! response must check the origin and return early for their own changes,
//! or the attribution and divider engines trigger each other forever
//! (mutate → notify → mutate).

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;
use tsuzuri_types::NodeId;

/// Who produced a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum ChangeOrigin {
    /// Anything the editing surface does (typing, pasting, formatting).
    #[default]
    User,
    /// Session stamping by the attribution engine.
    Attribution,
    /// Divider teardown and rebuild.
    #[strum(serialize = "divider_sync", serialize = "dividers")]
    DividerSync,
    /// Content loaded from a serialized document.
    Import,
    /// Host-requested refresh (configuration re-supplied, no tree change).
    Host,
}

impl ChangeOrigin {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOrigin::User => "user",
            ChangeOrigin::Attribution => "attribution",
            ChangeOrigin::DividerSync => "divider_sync",
            ChangeOrigin::Import => "import",
            ChangeOrigin::Host => "host",
        }
    }

    /// Whether an engine (not a person) produced the change.
    pub fn is_engine(&self) -> bool {
        matches!(self, ChangeOrigin::Attribution | ChangeOrigin::DividerSync)
    }
}

impl std::fmt::Display for ChangeOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One committed change, delivered to every listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Document version after the change.
    pub version: u64,
    /// Who produced the change.
    pub origin: ChangeOrigin,
    /// Free-form host annotations (e.g. `"paste"`, `"history-merge"`).
    pub tags: BTreeSet<String>,
    /// Nodes written, inserted, or removed, in ID order.
    pub dirty: Vec<NodeId>,
}

impl ChangeEvent {
    /// Whether this change came from `origin`.
    pub fn is_from(&self, origin: ChangeOrigin) -> bool {
        self.origin == origin
    }

    /// Whether the change carries a host tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

// ============================================================================
// Tests
// ============================================================================
