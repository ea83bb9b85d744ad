use serde::{Deserialize, Serialize};

/// Tunables for relevance scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPolicy {
    /// Deadlines this many days out or closer earn the urgency bonus.
    pub urgency_window_days: i64,
    /// Specific dimensions that must pass for the strong-match base score.
    pub strong_match_threshold: usize,
}

impl Default for MatchingPolicy {
    fn default() -> Self {
        Self {
            urgency_window_days: 7,
            strong_match_threshold: 2,
        }
    }
}
