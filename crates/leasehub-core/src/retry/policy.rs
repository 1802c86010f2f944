use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// High-level classification of a failure.
///
/// Closed set: every failure maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response: connection refused, DNS, reset.
    Network,
    /// 401 or 403.
    Auth,
    /// 400 or 422.
    Validation,
    /// 5xx.
    Server,
    /// No response because the request timed out or was aborted.
    Timeout,
    /// 404.
    NotFound,
    /// Everything else (typically not retried).
    Unknown,
}

impl ErrorKind {
    /// Kinds retried under the default policy.
    pub const DEFAULT_RETRYABLE: [ErrorKind; 3] =
        [ErrorKind::Network, ErrorKind::Timeout, ErrorKind::Server];

    pub fn is_retryable_by_default(self) -> bool {
        Self::DEFAULT_RETRYABLE.contains(&self)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The failure kind is not in `retryable_kinds`.
    NoRetry,
    /// The failure was retryable but this was the last permitted attempt.
    Exhausted,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Retry parameters for a single [`retry`](super::retry) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOptions {
    /// Total number of invocations allowed (including the first). Zero is treated as one.
    pub max_retries: u32,
    /// Base delay between attempts.
    pub delay: Duration,
    /// Double the delay after every failed attempt.
    pub backoff: bool,
    /// Optional ceiling on a single delay.
    pub max_delay: Option<Duration>,
    pub retryable_kinds: HashSet<ErrorKind>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1000),
            backoff: true,
            max_delay: None,
            retryable_kinds: ErrorKind::DEFAULT_RETRYABLE.into_iter().collect(),
        }
    }
}

impl RetryOptions {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_backoff(mut self, backoff: bool) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub fn with_retryable_kinds(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retryable_kinds = kinds.into_iter().collect();
        self
    }

    fn attempts_allowed(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay to wait after the failed attempt with 0-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let raw = if self.backoff {
            let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
            self.delay.saturating_mul(factor)
        } else {
            self.delay
        };
        match self.max_delay {
            Some(cap) => raw.min(cap),
            None => raw,
        }
    }

    /// Decide what to do after attempt `attempt` (0-based) failed with `kind`.
    ///
    /// Non-retryable kinds short-circuit before the attempt budget is checked.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if !self.retryable_kinds.contains(&kind) {
            return RetryDecision::NoRetry;
        }
        if attempt.saturating_add(1) >= self.attempts_allowed() {
            return RetryDecision::Exhausted;
        }
        RetryDecision::RetryAfter(self.delay_for(attempt))
    }
}

/// Per-call retry state: the attempt counter plus the options it is judged against.
#[derive(Debug)]
pub struct RetryState<'a> {
    options: &'a RetryOptions,
    attempt: u32,
}

impl<'a> RetryState<'a> {
    pub fn new(options: &'a RetryOptions) -> Self {
        Self { options, attempt: 0 }
    }

    /// 0-based index of the attempt currently in flight.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record a failure of the current attempt. Advances the counter when a retry follows.
    pub fn on_failure(&mut self, kind: ErrorKind) -> RetryDecision {
        let decision = self.options.decide(self.attempt, kind);
        if let RetryDecision::RetryAfter(_) = decision {
            self.attempt += 1;
        }
        decision
    }
}
