//! Per-tier retry counters.

use std::time::Duration;

/// Ceiling and pause of one retry tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub limit: u32,
    pub wait: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(limit: u32, wait: Duration) -> Self {
        Self { limit, wait }
    }

    /// Fresh counter for one entry into this tier.
    #[must_use]
    pub fn start(&self) -> RetryState {
        RetryState::new(self.limit)
    }
}

/// `{ attempt, limit }` for one tier. Ephemeral; never persisted.
///
/// A ceiling of `N` allows `N` retries past the first attempt, so at most
/// `N + 1` attempts in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    limit: u32,
}

impl RetryState {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self { attempt: 0, limit }
    }

    /// Count a new attempt and return its 1-based number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    /// Attempts started so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Whether another attempt may follow the current (failed) one.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.attempt <= self.limit
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.limit.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempts_until_exhausted(limit: u32) -> u32 {
        let mut state = RetryState::new(limit);
        loop {
            state.begin_attempt();
            if !state.can_retry() {
                return state.attempts();
            }
        }
    }

    #[test]
    fn ceiling_n_allows_n_plus_one_attempts() {
        assert_eq!(attempts_until_exhausted(0), 1);
        assert_eq!(attempts_until_exhausted(3), 4);
        assert_eq!(attempts_until_exhausted(10), 11);
        assert_eq!(RetryState::new(120).max_attempts(), 121);
    }

    #[test]
    fn policy_starts_fresh_counter() {
        let policy = RetryPolicy::new(2, Duration::from_secs(5));
        let mut state = policy.start();
        state.begin_attempt();
        assert_eq!(policy.start().attempts(), 0);
        assert_eq!(state.limit(), 2);
    }
}
