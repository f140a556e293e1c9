use std::{ops::RangeInclusive, time::Duration};

/// Bounded retry with a linearly growing delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry. Retry `n` waits `n * base_delay`.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn attempts(&self) -> RangeInclusive<u32> {
        0..=self.max_retries
    }

    /// The delay before the given attempt, zero for the first one.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    pub fn is_final_attempt(&self, attempt: u32) -> bool {
        attempt >= self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_delays() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        };

        let delays = policy
            .attempts()
            .map(|attempt| policy.delay(attempt).as_millis())
            .collect::<Vec<_>>();

        assert_eq!(delays, [0, 1000, 2000, 3000]);
    }

    #[test]
    fn final_attempt() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
        };

        assert!(!policy.is_final_attempt(0));
        assert!(!policy.is_final_attempt(1));
        assert!(policy.is_final_attempt(2));
    }

    #[test]
    fn no_retries() {
        let policy = RetryPolicy {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
        };

        assert_eq!(policy.attempts().count(), 1);
        assert!(policy.is_final_attempt(0));
    }
}
