//! Session outcome capture.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cure::GlobalState;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The cure reached completion before the country was lost.
    Victory,
    /// Every province became fully infected first.
    Defeat,
}

impl OutcomeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Victory => "victory",
            Self::Defeat => "defeat",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of the moment a session was decided. Created at most once
/// per session; later ticks and builds never produce a second outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    /// Day index of the most recent time advancement when the outcome fired.
    pub day: u32,
    pub provinces_saved: u32,
    pub provinces_fully_infected: u32,
    /// Global state captured at the moment of the outcome.
    pub global: GlobalState,
}
