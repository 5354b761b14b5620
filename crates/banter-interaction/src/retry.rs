//! Rate-limit retry policy.
//!
//! The policy is a plain value that yields its attempt schedule as an
//! iterator, so the budget and the backoff can be checked without doing any
//! network I/O.

use banter_core::config::RetrySettings;
use std::time::Duration;

/// Fixed-backoff retry budget for rate-limited requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A budget of zero is raised to one so a send always
    /// makes at least one request.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// A policy that makes exactly one request.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(settings.max_attempts, settings.backoff())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// The attempts this policy allows, in order.
    pub fn schedule(&self) -> AttemptSchedule {
        AttemptSchedule {
            policy: *self,
            next: 1,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

/// One planned request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    /// 1-based attempt number.
    pub number: u32,
    /// How long to wait before making this attempt. `None` for the first one.
    pub delay: Option<Duration>,
}

/// Iterator over the attempts of a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct AttemptSchedule {
    policy: RetryPolicy,
    next: u32,
}

impl Iterator for AttemptSchedule {
    type Item = Attempt;

    fn next(&mut self) -> Option<Attempt> {
        if self.next > self.policy.max_attempts {
            return None;
        }
        let number = self.next;
        self.next += 1;
        Some(Attempt {
            number,
            delay: (number > 1).then_some(self.policy.backoff),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.policy.max_attempts + 1).saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AttemptSchedule {}
