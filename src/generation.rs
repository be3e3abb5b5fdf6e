//! Request generations: every request for a key takes a fresh, monotonically
//! increasing generation. Under fencing, an outcome may only land on the record
//! that still carries its generation, so stale provider results cannot
//! overwrite newer state.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// How provider outcomes are applied when requests for one key overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Whichever provider call resolves last writes last. Outcomes are written
    /// even after `clear` or a newer request.
    #[default]
    LastResolvedWins,
    /// Outcomes are applied only if no newer request and no `clear` happened
    /// for the key since the request was issued.
    LatestRequestWins,
}

impl WritePolicy {
    /// Whether an outcome from `issued` may overwrite a key whose current
    /// generation is `current` (`None` when the key is absent).
    #[inline]
    pub fn admits(self, issued: u64, current: Option<u64>) -> bool {
        match self {
            WritePolicy::LastResolvedWins => true,
            WritePolicy::LatestRequestWins => current == Some(issued),
        }
    }
}

impl std::str::FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "last-resolved" | "last-resolved-wins" => Ok(WritePolicy::LastResolvedWins),
            "latest-request" | "latest-request-wins" => Ok(WritePolicy::LatestRequestWins),
            other => Err(format!("unknown write policy: {other}")),
        }
    }
}

/// Issues generations shared by all keys of one cache.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    generation: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the new generation (first call returns 1).
    pub fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}
