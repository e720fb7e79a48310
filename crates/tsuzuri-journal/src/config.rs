//! Journal configuration, loaded from RON.
//!
//! ```ron
//! (
//!     min_divider_secs: 120,
//!     time_format: "%I:%M %p",
//! )
//! ```
//!
//! Every field is optional; a missing file means all defaults.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tsuzuri_doc::DEFAULT_MAX_DISPATCH_ROUNDS;

use crate::labels;

/// Tunables for attribution, divider sync, and session tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalConfig {
    /// A later session-run gets a divider only if that session lasted at
    /// least this long.
    pub min_divider_secs: u64,
    /// Idle time after which the next edit opens a new session.
    pub inactivity_timeout_secs: u64,
    /// strftime pattern for divider and replay time labels.
    pub time_format: String,
    /// Cap on change events delivered per edit.
    pub max_dispatch_rounds: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            min_divider_secs: 60,
            inactivity_timeout_secs: 30 * 60,
            time_format: "%H:%M".to_string(),
            max_dispatch_rounds: DEFAULT_MAX_DISPATCH_ROUNDS,
        }
    }
}

impl JournalConfig {
    /// Parse from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: JournalConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a RON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Load from a RON file, falling back to defaults when it doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no journal config, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn min_divider(&self) -> Duration {
        Duration::seconds(self.min_divider_secs.min(u32::MAX as u64) as i64)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::seconds(self.inactivity_timeout_secs.min(u32::MAX as u64) as i64)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !labels::is_valid_time_format(&self.time_format) {
            return Err(ConfigError::InvalidTimeFormat(self.time_format.clone()));
        }
        Ok(())
    }
}

/// Error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid time format: {0:?}")]
    InvalidTimeFormat(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        let config = JournalConfig::from_ron_str("()").unwrap();
        assert_eq!(config, JournalConfig::default());
        assert_eq!(config.min_divider(), Duration::seconds(60));
        assert_eq!(config.inactivity_timeout(), Duration::minutes(30));
    }

    #[test]
    fn test_partial_config() {
        let config = JournalConfig::from_ron_str(
            r#"(min_divider_secs: 300, time_format: "%I:%M %p")"#,
        )
        .unwrap();
        assert_eq!(config.min_divider_secs, 300);
        assert_eq!(config.time_format, "%I:%M %p");
        assert_eq!(config.max_dispatch_rounds, DEFAULT_MAX_DISPATCH_ROUNDS);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = JournalConfig::from_ron_str("(min_divider: 5)").unwrap_err();
        assert!(matches!(err, ConfigError::Ron(_)));
    }

    #[test]
    fn test_bad_time_format_rejected() {
        let err = JournalConfig::from_ron_str(r#"(time_format: "%Q")"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeFormat(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(inactivity_timeout_secs: 600)").unwrap();
        let config = JournalConfig::load(file.path()).unwrap();
        assert_eq!(config.inactivity_timeout(), Duration::minutes(10));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig::load_or_default(&dir.path().join("journal.ron")).unwrap();
        assert_eq!(config, JournalConfig::default());
    }

    #[test]
    fn test_missing_file_is_error_for_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = JournalConfig::load(&dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
