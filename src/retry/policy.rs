use std::time::Duration;

use crate::config::RetryConfig;

/// How transient failures are retried: a fixed delay between attempts and an
/// optional cap on the total number of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// Total attempts including the first; `None` keeps retrying until the
    /// call resolves or shutdown is signalled.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(15))
    }
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            delay: Duration::from_secs(config.delay_secs),
            max_attempts: config.max_attempts,
        }
    }

    /// Whether another attempt may follow attempt number `attempt` (1-based).
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt < max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_policy_always_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay, Duration::from_secs(15));
        assert!(policy.allows_retry_after(1));
        assert!(policy.allows_retry_after(u32::MAX - 1));
    }

    #[test]
    fn test_bounded_policy() {
        let policy = RetryPolicy::fixed(Duration::from_secs(1)).with_max_attempts(3);
        assert!(policy.allows_retry_after(1));
        assert!(policy.allows_retry_after(2));
        assert!(!policy.allows_retry_after(3));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let policy = RetryPolicy::fixed(Duration::from_secs(1)).with_max_attempts(0);
        assert_eq!(policy.max_attempts, Some(1));
        assert!(!policy.allows_retry_after(1));
    }

    #[test]
    fn test_from_config() {
        let config = RetryConfig {
            delay_secs: 4,
            max_attempts: Some(2),
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.delay, Duration::from_secs(4));
        assert_eq!(policy.max_attempts, Some(2));
    }
}
