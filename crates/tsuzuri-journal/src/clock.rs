//! Time source for "now".

use chrono::{DateTime, Utc};

/// Where the engines read the current time from.
///
/// Active sessions have no end time; their length is measured up to now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall clock.
    #[default]
    System,
    /// A pinned instant (tests, replays of recorded activity).
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}
