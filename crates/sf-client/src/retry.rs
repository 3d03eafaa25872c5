//! Retry policy with exponential backoff and jitter.

use rand::Rng;
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any computed backoff delay.
    pub max_delay: Duration,
    /// Backoff strategy to use.
    pub backoff: BackoffStrategy,
    /// Whether to honor `Retry-After` on 429 responses.
    pub respect_retry_after: bool,
    /// Cap applied to `Retry-After`.
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff: BackoffStrategy::ExponentialWithJitter { factor: 2.0 },
            respect_retry_after: true,
            max_retry_after: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of retries.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// A config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }
}

/// Backoff strategy for determining retry delays.
#[derive(Debug, Clone, Copy)]
pub enum BackoffStrategy {
    /// Same delay every time.
    Constant,
    /// `initial * factor^attempt`.
    Exponential { factor: f64 },
    /// Exponential plus a random jitter of up to the base delay.
    ExponentialWithJitter { factor: f64 },
}

impl BackoffStrategy {
    /// Calculate the delay for a given attempt number (0-indexed).
    ///
    /// The result never exceeds `max_delay`, however large `attempt` gets.
    pub fn delay(&self, attempt: u32, initial_delay: Duration, max_delay: Duration) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let secs = match self {
            BackoffStrategy::Constant => return std::cmp::min(initial_delay, max_delay),
            BackoffStrategy::Exponential { factor } => {
                initial_delay.as_secs_f64() * factor.powi(exponent)
            }
            BackoffStrategy::ExponentialWithJitter { factor } => {
                let base = initial_delay.as_secs_f64() * factor.powi(exponent);
                base + rand::rng().random::<f64>() * base
            }
        };

        // Clamp before converting: `Duration` cannot hold the unclamped product.
        Duration::try_from_secs_f64(secs.min(max_delay.as_secs_f64())).unwrap_or(max_delay)
    }
}

/// Per-request retry state.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
}

impl RetryPolicy {
    /// Create a new retry policy from config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Number of retries consumed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns true if another retry is allowed.
    pub fn should_retry(&self) -> bool {
        self.attempt < self.config.max_attempts
    }

    /// Consume one retry and return how long to wait before it.
    /// Returns None once retries are exhausted.
    pub fn next_delay(&mut self, retry_after: Option<Duration>) -> Option<Duration> {
        if !self.should_retry() {
            return None;
        }

        let delay = match retry_after {
            Some(retry_after) if self.config.respect_retry_after => {
                std::cmp::min(retry_after, self.config.max_retry_after)
            }
            _ => self.config.backoff.delay(
                self.attempt,
                self.config.initial_delay,
                self.config.max_delay,
            ),
        };

        self.attempt += 1;
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_retry() {
        let policy = RetryPolicy::new(RetryConfig::no_retry());
        assert!(!policy.should_retry());
    }

    #[test]
    fn test_constant_backoff() {
        let initial = Duration::from_secs(1);
        let max = Duration::from_secs(60);
        assert_eq!(BackoffStrategy::Constant.delay(0, initial, max), initial);
        assert_eq!(BackoffStrategy::Constant.delay(5, initial, max), initial);
    }

    #[test]
    fn test_exponential_backoff_caps_at_max() {
        let strategy = BackoffStrategy::Exponential { factor: 2.0 };
        let initial = Duration::from_secs(1);
        let max = Duration::from_secs(60);

        assert_eq!(strategy.delay(0, initial, max), Duration::from_secs(1));
        assert_eq!(strategy.delay(2, initial, max), Duration::from_secs(4));
        assert_eq!(strategy.delay(10, initial, max), Duration::from_secs(60));
    }

    #[test]
    fn test_jitter_stays_within_double_base() {
        let strategy = BackoffStrategy::ExponentialWithJitter { factor: 2.0 };
        let delay = strategy.delay(1, Duration::from_secs(1), Duration::from_secs(60));
        assert!(delay >= Duration::from_secs(2));
        assert!(delay <= Duration::from_secs(4));
    }

    #[test]
    fn test_huge_attempt_is_capped_not_overflowed() {
        let initial = Duration::from_millis(500);
        let max = Duration::from_secs(30);

        for strategy in [
            BackoffStrategy::Exponential { factor: 2.0 },
            BackoffStrategy::ExponentialWithJitter { factor: 2.0 },
        ] {
            assert_eq!(strategy.delay(70, initial, max), max);
            assert_eq!(strategy.delay(u32::MAX, initial, max), max);
        }
    }

    #[test]
    fn test_long_policy_never_exceeds_max_delay() {
        let mut policy = RetryPolicy::new(
            RetryConfig::default()
                .with_max_attempts(100)
                .with_backoff(BackoffStrategy::Exponential { factor: 2.0 }),
        );

        let mut delays = Vec::new();
        while let Some(delay) = policy.next_delay(None) {
            delays.push(delay);
        }
        assert_eq!(delays.len(), 100);
        assert_eq!(delays[99], Duration::from_secs(30));
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(30)));
    }

    #[test]
    fn test_policy_exhausts() {
        let mut policy = RetryPolicy::new(RetryConfig::default().with_max_attempts(2));

        assert!(policy.next_delay(None).is_some());
        assert!(policy.next_delay(None).is_some());
        assert_eq!(policy.attempt(), 2);
        assert!(policy.next_delay(None).is_none());
    }

    #[test]
    fn test_retry_after_is_capped() {
        let mut policy = RetryPolicy::new(RetryConfig::default());

        let delay = policy.next_delay(Some(Duration::from_secs(30))).unwrap();
        assert_eq!(delay, Duration::from_secs(30));

        let delay = policy.next_delay(Some(Duration::from_secs(120))).unwrap();
        assert_eq!(delay, Duration::from_secs(60));
    }
}
