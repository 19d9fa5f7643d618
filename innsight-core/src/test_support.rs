//! Deterministic test doubles for the collaborator traits and the clock.
//!
//! Everything here keeps its state behind a mutex so doubles can be shared
//! through `Arc` and still satisfy the `Send + Sync` bounds of the traits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use geo::Coord;

use crate::{
    Accommodation, AccommodationSource, Clock, FetchError, GeocodeError, Geocoder,
    IsochroneError, IsochroneProvider, IsochroneRequest, IsochroneSet, IsochroneSource,
    SearchError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock that only moves when told to.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use innsight_core::Clock;
/// use innsight_core::test_support::ManualClock;
///
/// let clock = ManualClock::default();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.now(), Duration::from_secs(5));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    /// Start the clock at `start`.
    #[must_use]
    pub const fn starting_at(start: Duration) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = lock(&self.now);
        *now = now.saturating_add(step);
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: Duration) {
        *lock(&self.now) = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *lock(&self.now)
    }
}

/// `IsochroneProvider` replaying a scripted sequence of outcomes.
///
/// Once the script runs out the final outcome repeats.
#[derive(Debug)]
pub struct ScriptedIsochroneProvider {
    script: Mutex<VecDeque<Result<IsochroneSet, FetchError>>>,
    last: Mutex<Option<Result<IsochroneSet, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedIsochroneProvider {
    /// Replay `outcomes` in order.
    #[must_use]
    pub fn new(outcomes: Vec<Result<IsochroneSet, FetchError>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always succeed with `set`.
    #[must_use]
    pub fn always(set: IsochroneSet) -> Self {
        Self::new(vec![Ok(set)])
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn failing(error: FetchError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Fail `failures` times with `error`, then succeed with `set`.
    #[must_use]
    pub fn failing_then(failures: usize, error: &FetchError, set: IsochroneSet) -> Self {
        let mut outcomes: Vec<_> = (0..failures).map(|_| Err(error.clone())).collect();
        outcomes.push(Ok(set));
        Self::new(outcomes)
    }

    /// Number of fetches made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IsochroneProvider for ScriptedIsochroneProvider {
    fn fetch_isochrones(&self, _request: &IsochroneRequest) -> Result<IsochroneSet, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut last = lock(&self.last);
        if let Some(next) = lock(&self.script).pop_front() {
            *last = Some(next);
        }
        last.clone().unwrap_or_else(|| {
            Err(FetchError::Network {
                url: "scripted://empty".to_owned(),
                message: "no scripted outcome".to_owned(),
            })
        })
    }
}

/// `IsochroneSource` returning one fixed outcome and recording requests.
#[derive(Debug)]
pub struct StubIsochroneSource {
    outcome: Result<IsochroneSet, IsochroneError>,
    requests: Mutex<Vec<IsochroneRequest>>,
}

impl StubIsochroneSource {
    /// Always return `set`.
    #[must_use]
    pub const fn with_set(set: IsochroneSet) -> Self {
        Self {
            outcome: Ok(set),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub const fn with_error(error: IsochroneError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<IsochroneRequest> {
        lock(&self.requests).clone()
    }
}

impl IsochroneSource for StubIsochroneSource {
    fn isochrones(&self, request: &IsochroneRequest) -> Result<IsochroneSet, IsochroneError> {
        lock(&self.requests).push(request.clone());
        self.outcome.clone()
    }
}

/// `Geocoder` returning one fixed outcome and recording queries.
#[derive(Debug)]
pub struct StubGeocoder {
    outcome: Result<Coord<f64>, GeocodeError>,
    queries: Mutex<Vec<String>>,
}

impl StubGeocoder {
    /// Resolve every query to `location`.
    #[must_use]
    pub const fn with_location(location: Coord<f64>) -> Self {
        Self {
            outcome: Ok(location),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Fail every query with `error`.
    #[must_use]
    pub const fn with_error(error: GeocodeError) -> Self {
        Self {
            outcome: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

impl Geocoder for StubGeocoder {
    fn geocode(&self, query: &str) -> Result<Coord<f64>, GeocodeError> {
        lock(&self.queries).push(query.to_owned());
        self.outcome.clone()
    }
}

/// `AccommodationSource` returning fixed rows.
#[derive(Debug)]
pub struct StubAccommodationSource {
    outcome: Result<Vec<Accommodation>, SearchError>,
    calls: AtomicUsize,
}

impl StubAccommodationSource {
    /// Return `rows` for every search.
    #[must_use]
    pub const fn with_rows(rows: Vec<Accommodation>) -> Self {
        Self {
            outcome: Ok(rows),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every search with `error`.
    #[must_use]
    pub const fn with_error(error: SearchError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of searches made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AccommodationSource for StubAccommodationSource {
    fn search(&self, _centre: Coord<f64>) -> Result<Vec<Accommodation>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
