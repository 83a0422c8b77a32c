//! Retry policy for HTTP requests.

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::Method;

/// Upper bound for a single backoff sleep.
const BACKOFF_MAX: Duration = Duration::from_secs(120);

/// Why an attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// No response was received.
    Connection,
    /// A response with this status was received.
    Status(u16),
}

/// When and how often failed requests are repeated.
///
/// A request is retried only if its method is in `allowed_methods` and the
/// failure is either a connection fault or a status in `status_forcelist`.
/// POST and PATCH are not in the default method set.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub retries: u32,
    /// Base delay in seconds; attempt `n >= 2` waits `factor * 2^(n-2)`.
    pub backoff_factor: f64,
    /// Statuses that trigger a retry.
    pub status_forcelist: BTreeSet<u16>,
    /// Methods eligible for retry, upper-case.
    pub allowed_methods: BTreeSet<String>,
    /// Timeout applied to each individual attempt.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            backoff_factor: 0.0,
            status_forcelist: [429, 500, 502, 503, 504].into_iter().collect(),
            allowed_methods: ["HEAD", "GET", "PUT", "DELETE", "OPTIONS", "TRACE"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy with the given retry count and default everything else.
    #[must_use]
    pub fn with_retries(retries: u32) -> Self {
        Self {
            retries,
            ..Self::default()
        }
    }

    /// Total number of attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Whether `method` may be sent more than once.
    pub fn allows_method(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method.as_str())
    }

    /// Whether attempt number `attempt` (1-based) that failed with `failure`
    /// should be followed by another one.
    pub fn should_retry(&self, method: &Method, failure: Failure, attempt: u32) -> bool {
        if attempt >= self.max_attempts() || !self.allows_method(method) {
            return false;
        }
        match failure {
            Failure::Connection => true,
            Failure::Status(status) => self.status_forcelist.contains(&status),
        }
    }

    /// Sleep before attempt number `attempt` (1-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt < 2 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 2).unwrap_or(i32::MAX);
        let secs = self.backoff_factor * 2f64.powi(exponent);
        if !secs.is_finite() || secs >= BACKOFF_MAX.as_secs_f64() {
            return BACKOFF_MAX;
        }
        Duration::from_secs_f64(secs)
    }
}
