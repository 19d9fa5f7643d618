//! Bounded exponential backoff around an [`IsochroneProvider`].

use std::time::Duration;

use innsight_core::config::deserialize_secs_f64;
use innsight_core::{FetchError, IsochroneProvider, IsochroneRequest, IsochroneSet};
use serde::Deserialize;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_BACKOFF: f64 = 2.0;

/// How often and how patiently to retry a failing fetch.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use innsight_data::routing::RetryPolicy;
///
/// let policy = RetryPolicy::default().with_delay(Duration::from_millis(100));
/// let delays: Vec<_> = policy.delays().collect();
/// assert_eq!(delays, vec![Duration::from_millis(100), Duration::from_millis(200)]);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total calls allowed, including the first. Values below one act as one.
    pub max_attempts: u32,
    /// Pause before the second attempt.
    #[serde(rename = "delay_secs", deserialize_with = "deserialize_secs_f64")]
    pub delay: Duration,
    /// Factor applied to the pause after each failed attempt. Fractional
    /// factors such as `1.5` are allowed; negative or non-finite factors act
    /// as `1.0`.
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Set the attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the initial pause.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the backoff factor.
    #[must_use]
    pub fn with_backoff(mut self, backoff: f64) -> Self {
        self.backoff = backoff;
        self
    }

    /// Attempt budget, never less than one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Pauses taken between consecutive attempts.
    ///
    /// A pause too long for [`Duration`] saturates at [`Duration::MAX`].
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        let factor = self.factor();
        std::iter::successors(Some(self.delay), move |delay| Some(scale(*delay, factor)))
            .take(usize::try_from(self.attempts() - 1).unwrap_or(usize::MAX))
    }

    const fn factor(&self) -> f64 {
        if self.backoff.is_finite() && self.backoff >= 0.0 {
            self.backoff
        } else {
            1.0
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "backoff factors may be fractional"
)]
fn scale(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

/// Something that can wait between attempts.
pub trait Pause: Send + Sync {
    /// Wait for `duration`.
    fn pause(&self, duration: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Provider that retries transient failures with exponential backoff.
///
/// Timeouts, connection failures, HTTP 429 and 5xx, and unparseable bodies
/// are retried; anything else is returned at once. When the budget runs out
/// HTTP failures are reported as
/// [`FetchError::UpstreamTemporaryFailure`] and parse failures as
/// [`FetchError::InvalidResponseFormat`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use geo::{Coord, polygon};
/// use innsight_core::test_support::ScriptedIsochroneProvider;
/// use innsight_core::{FetchError, IsochroneProvider, IsochroneRequest, IsochroneSet};
/// use innsight_data::routing::{RetryPolicy, RetryingIsochroneProvider};
///
/// let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
/// let flaky = ScriptedIsochroneProvider::failing_then(
///     2,
///     &FetchError::Http { url: "u".into(), status: 503, message: "busy".into() },
///     IsochroneSet::new(vec![square]),
/// );
/// let policy = RetryPolicy::default().with_delay(Duration::ZERO);
/// let provider = RetryingIsochroneProvider::new(flaky, policy);
///
/// let request = IsochroneRequest::from_minutes("driving-car", Coord { x: 0.0, y: 0.0 }, &[15]);
/// assert!(provider.fetch_isochrones(&request).is_ok());
/// assert_eq!(provider.inner().calls(), 3);
/// ```
#[derive(Debug)]
pub struct RetryingIsochroneProvider<P, W = ThreadPause> {
    inner: P,
    policy: RetryPolicy,
    pause: W,
}

impl<P: IsochroneProvider> RetryingIsochroneProvider<P, ThreadPause> {
    /// Wrap `inner`, sleeping the calling thread between attempts.
    #[must_use]
    pub const fn new(inner: P, policy: RetryPolicy) -> Self {
        Self::with_pause(inner, policy, ThreadPause)
    }
}

impl<P: IsochroneProvider, W: Pause> RetryingIsochroneProvider<P, W> {
    /// Wrap `inner`, waiting between attempts with `pause`.
    #[must_use]
    pub const fn with_pause(inner: P, policy: RetryPolicy, pause: W) -> Self {
        Self {
            inner,
            policy,
            pause,
        }
    }

    /// Borrow the wrapped provider.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// Retry policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<P: IsochroneProvider, W: Pause> IsochroneProvider for RetryingIsochroneProvider<P, W> {
    fn fetch_isochrones(&self, request: &IsochroneRequest) -> Result<IsochroneSet, FetchError> {
        let max_attempts = self.policy.attempts();
        let mut delays = self.policy.delays();
        let mut attempt = 1;
        loop {
            let err = match self.inner.fetch_isochrones(request) {
                Ok(set) => return Ok(set),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => err,
            };
            let Some(delay) = delays.next() else {
                log::error!("Isochrone fetch failed after {max_attempts} attempts: {err}");
                return Err(err.into_exhausted());
            };
            log::warn!(
                "Isochrone fetch attempt {attempt}/{max_attempts} failed: {err}; retrying in {delay:?}"
            );
            self.pause.pause(delay);
            attempt += 1;
        }
    }
}
