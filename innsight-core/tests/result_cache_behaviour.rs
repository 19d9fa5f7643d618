//! Behavioural tests for [`ResultCache`] and [`build_key`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use innsight_core::test_support::ManualClock;
use innsight_core::{CacheKey, RankedPayload, ResultCache, ResultCacheConfig, build_key};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Debug, Clone, PartialEq)]
struct Ranked(Vec<&'static str>);

impl RankedPayload for Ranked {
    fn truncate_ranked(&mut self, top_n: usize) {
        self.0.truncate(top_n);
    }
}

/// Cache under test together with the clock driving it.
struct CacheWorld {
    clock: Arc<ManualClock>,
    cache: ResultCache<Ranked, Arc<ManualClock>>,
}

type WorldCell = RefCell<Option<CacheWorld>>;

const TTL: Duration = Duration::from_secs(1800);

fn query_key() -> CacheKey {
    build_key("Naha Airport", None, &[], None, "driving-car")
}

#[fixture]
fn world() -> WorldCell {
    RefCell::new(None)
}

#[fixture]
fn keys() -> RefCell<Vec<CacheKey>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn fetched() -> RefCell<Option<Ranked>> {
    RefCell::new(None)
}

fn with_world<R>(world: &WorldCell, f: impl FnOnce(&mut CacheWorld) -> R) -> R {
    let mut borrowed = world.borrow_mut();
    f(borrowed.as_mut().expect("cache must be initialised"))
}

// --- Given steps ---

#[given("a cache key for X with filters b and a")]
fn key_b_a(#[from(keys)] keys: &RefCell<Vec<CacheKey>>) {
    let filters = vec!["b".to_owned(), "a".to_owned()];
    keys.borrow_mut()
        .push(build_key("X", None, &filters, None, "driving-car"));
}

#[given("a cache key for X with filters a and b")]
fn key_a_b(#[from(keys)] keys: &RefCell<Vec<CacheKey>>) {
    let filters = vec!["a".to_owned(), "b".to_owned()];
    let weights: BTreeMap<String, f64> = BTreeMap::new();
    keys.borrow_mut()
        .push(build_key("X", Some(""), &filters, Some(&weights), "driving-car"));
}

#[given("an empty result cache")]
fn empty_cache(#[from(world)] world: &WorldCell) {
    let clock = Arc::new(ManualClock::default());
    let config = ResultCacheConfig::default().with_ttl(TTL);
    let cache = ResultCache::with_clock(config, Arc::clone(&clock));
    *world.borrow_mut() = Some(CacheWorld { clock, cache });
}

#[given("a recommendation with five ranked items is cached")]
fn cache_five(#[from(world)] world: &WorldCell) {
    with_world(world, |w| {
        w.cache
            .put(query_key(), &Ranked(vec!["a", "b", "c", "d", "e"]));
    });
}

// --- When steps ---

#[when("the time to live elapses")]
fn ttl_elapses(#[from(world)] world: &WorldCell) {
    with_world(world, |w| w.clock.advance(TTL + Duration::from_secs(1)));
}

#[when("the recommendation is requested with a limit of two")]
fn request_two(#[from(world)] world: &WorldCell, #[from(fetched)] fetched: &RefCell<Option<Ranked>>) {
    *fetched.borrow_mut() = with_world(world, |w| w.cache.get(&query_key(), Some(2)));
}

// --- Then steps ---

#[then("both cache keys are equal")]
fn keys_equal(#[from(keys)] keys: &RefCell<Vec<CacheKey>>) {
    let keys = keys.borrow();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys.first(), keys.get(1));
}

#[then("the hit rate is zero")]
fn hit_rate_zero(#[from(world)] world: &WorldCell) {
    let stats = with_world(world, |w| w.cache.stats());
    assert_eq!(stats.hit_rate, 0.0);
    assert_eq!(stats.total_requests, 0);
}

#[then("two ranked items are returned")]
fn two_returned(#[from(fetched)] fetched: &RefCell<Option<Ranked>>) {
    assert_eq!(*fetched.borrow(), Some(Ranked(vec!["a", "b"])));
}

#[then("nothing is returned")]
fn nothing_returned(#[from(fetched)] fetched: &RefCell<Option<Ranked>>) {
    assert!(fetched.borrow().is_none());
}

#[then("the cache records one hit")]
fn one_hit(#[from(world)] world: &WorldCell) {
    let stats = with_world(world, |w| w.cache.stats());
    assert_eq!((stats.hits, stats.misses), (1, 0));
}

#[then("the cache records one miss")]
fn one_miss(#[from(world)] world: &WorldCell) {
    let stats = with_world(world, |w| w.cache.stats());
    assert_eq!((stats.hits, stats.misses), (0, 1));
}

#[then("the cache is empty")]
fn cache_empty(#[from(world)] world: &WorldCell) {
    assert!(with_world(world, |w| w.cache.is_empty()));
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/result_cache.feature", name = $title)]
        fn $fn_name(world: WorldCell, keys: RefCell<Vec<CacheKey>>, fetched: RefCell<Option<Ranked>>) {
            let _ = (world, keys, fetched);
        }
    };
}

register_scenario!(filter_order_is_ignored, "filter order does not change the cache key");
register_scenario!(fresh_cache_hit_rate, "a fresh cache reports a zero hit rate");
register_scenario!(cached_recommendation_truncated, "a cached recommendation is served truncated");
register_scenario!(expired_recommendation_missed, "an expired recommendation is a miss");
