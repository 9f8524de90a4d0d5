//! Bounded exponential backoff for reconnect scheduling

use std::time::Duration;

/// Reconnect schedule: the n-th retry waits `min(2^n * base, cap)`
///
/// With the defaults this yields 2s, 4s, 8s, 16s, 30s and then gives up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retries allowed before the channel is declared dead
    pub max_attempts: u32,
    /// Delay unit for the exponential schedule
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// True once `attempts` has gone past the allowed maximum
    pub fn exhausted(&self, attempts: u32) -> bool {
        attempts > self.max_attempts
    }
}
