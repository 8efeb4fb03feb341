//! Credit scores - monotone per-user reputation counters
//!
//! Scores start at 0, only ever increase, and are mutated solely by ledger
//! events (supply, full repayment). A future extension may let high scores
//! relax collateral terms; nothing reads them for that yet.

use dashmap::DashMap;
use tracing::debug;

/// Per-user credit score store
#[derive(Debug, Default)]
pub struct CreditScoreTracker {
    scores: DashMap<String, u64>,
}

impl CreditScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to a user's score, returning the new value.
    ///
    /// Saturates rather than wraps; a score ceiling is not a failure.
    pub fn bump(&self, user: &str, delta: u64) -> u64 {
        let mut entry = self.scores.entry(user.to_string()).or_insert(0);
        *entry = entry.saturating_add(delta);
        let score = *entry;
        drop(entry);

        debug!(user, delta, score, "credit score bumped");
        score
    }

    /// Current score; unknown users read as 0
    pub fn score_of(&self, user: &str) -> u64 {
        self.scores.get(user).map(|s| *s).unwrap_or(0)
    }
}
