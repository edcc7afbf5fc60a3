use std::time::Duration;

/// Trait for defining reconnection strategies
///
/// Implement this trait to control how long the session waits before
/// each reconnection attempt, and when it gives up.
pub trait ReconnectionStrategy: Send + Sync {
    /// Get the delay before the given reconnection attempt
    ///
    /// # Arguments
    /// * `attempt` - The reconnection attempt number (1-indexed, reset to 0
    ///   after every successful connection)
    ///
    /// # Returns
    /// * `Some(duration)` - Wait this long before reconnecting
    /// * `None` - Stop reconnecting, the retry budget is exhausted
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    /// Check if the given attempt is still within budget
    fn should_reconnect(&self, attempt: usize) -> bool;
}

impl<S> ReconnectionStrategy for Box<S>
where
    S: ReconnectionStrategy + ?Sized,
{
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        (**self).next_delay(attempt)
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        (**self).should_reconnect(attempt)
    }
}

/// Exponential backoff reconnection strategy
///
/// Attempt `n` waits `initial_delay * 2^(n-1)`, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff strategy
    ///
    /// # Arguments
    /// * `initial_delay` - The delay before the first reconnect
    /// * `max_delay` - The maximum delay between reconnects
    /// * `max_attempts` - Maximum number of attempts (None = unlimited)
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> Option<usize> {
        self.max_attempts
    }
}

impl ReconnectionStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if attempt == 0 || !self.should_reconnect(attempt) {
            return None;
        }

        let exponent = u32::try_from(attempt - 1).unwrap_or(u32::MAX);
        let factor = 2u64.checked_pow(exponent).unwrap_or(u64::MAX);
        let base_ms = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);
        let cap_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);

        Some(Duration::from_millis(base_ms.saturating_mul(factor).min(cap_ms)))
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }
}

/// Never reconnect strategy
///
/// The first lost connection ends the session.
#[derive(Debug, Clone)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }

    fn should_reconnect(&self, _attempt: usize) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_zero_has_no_delay() {
        let strategy = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(60), None);
        assert_eq!(strategy.next_delay(0), None);
    }

    #[test]
    fn test_unlimited_attempts() {
        let strategy = ExponentialBackoff::new(Duration::from_millis(10), Duration::from_secs(1), None);
        assert!(strategy.should_reconnect(10_000));
        assert_eq!(strategy.next_delay(10_000), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_boxed_strategy_delegates() {
        let strategy: Box<dyn ReconnectionStrategy> = Box::new(ExponentialBackoff::new(
            Duration::from_millis(100),
            Duration::from_secs(1),
            Some(2),
        ));
        assert_eq!(strategy.next_delay(2), Some(Duration::from_millis(200)));
        assert_eq!(strategy.next_delay(3), None);
    }
}
