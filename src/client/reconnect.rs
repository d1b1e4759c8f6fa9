//! Reconnect timing for the push channel

use std::time::Duration;

/// Delay between reconnect attempts. Attempts never stop.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry
    pub delay: Duration,
    /// Growth factor applied after each failed attempt (1.0 = fixed delay)
    pub multiplier: f64,
    /// Upper bound on the delay once it grows
    pub max_delay: Option<Duration>,
}

impl ReconnectPolicy {
    /// Same delay before every attempt
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            multiplier: 1.0,
            max_delay: None,
        }
    }

    /// Grow the delay by `multiplier` per attempt, capped at `max_delay`
    pub fn with_backoff(mut self, multiplier: f64, max_delay: Duration) -> Self {
        self.multiplier = multiplier.max(1.0);
        self.max_delay = Some(max_delay);
        self
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.clone())
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(3))
    }
}

/// Retry state for one subscriber
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempts: u32,
    current: Duration,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        let current = policy.delay;
        Self {
            policy,
            attempts: 0,
            current,
        }
    }

    /// Delay to wait before the next attempt
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.attempts = self.attempts.saturating_add(1);

        let nanos = self.current.as_nanos() as f64 * self.policy.multiplier;
        let grown = if nanos >= u64::MAX as f64 {
            Duration::MAX
        } else {
            Duration::from_nanos(nanos.round() as u64)
        };
        self.current = match self.policy.max_delay {
            Some(max) => grown.min(max),
            None => grown,
        };
        delay
    }

    /// Back to the initial delay after a successful connection
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current = self.policy.delay;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed_three_seconds() {
        let mut backoff = ReconnectPolicy::default().backoff();
        for _ in 0..10 {
            assert_eq!(backoff.next_delay(), Duration::from_secs(3));
        }
        assert_eq!(backoff.attempts(), 10);
    }

    #[test]
    fn test_backoff_grows_to_cap() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(100))
            .with_backoff(2.0, Duration::from_millis(500));
        let mut backoff = policy.backoff();

        let delays: Vec<_> = (0..5).map(|_| backoff.next_delay()).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(500),
                Duration::from_millis(500),
            ]
        );
    }

    #[test]
    fn test_reset() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(10))
            .with_backoff(3.0, Duration::from_secs(1));
        let mut backoff = policy.backoff();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(10));
    }

    #[test]
    fn test_multiplier_below_one_clamped() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(50))
            .with_backoff(0.5, Duration::from_secs(1));
        let mut backoff = policy.backoff();
        backoff.next_delay();
        assert_eq!(backoff.next_delay(), Duration::from_millis(50));
    }
}
