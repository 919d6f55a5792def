//! Tag-invalidated query cache.
//!
//! Entries are keyed by endpoint name plus canonical request arguments and
//! remember which [`Tag`]s they provide. A mutation invalidates tags; every
//! entry carrying one of them turns stale and the next query refetches.
//! There is no TTL and no eviction.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::error::ApiError;
use crate::request::ApiRequest;

/// Coarse label relating cached queries to the mutations that affect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Auth,
    Users,
    PendingUsers,
    Leaves,
    LeaveBalance,
    LeaveStatistics,
    Salaries,
    SalaryStatistics,
}

impl Tag {
    pub const ALL: [Tag; 8] = [
        Tag::Auth,
        Tag::Users,
        Tag::PendingUsers,
        Tag::Leaves,
        Tag::LeaveBalance,
        Tag::LeaveStatistics,
        Tag::Salaries,
        Tag::SalaryStatistics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Auth => "Auth",
            Tag::Users => "Users",
            Tag::PendingUsers => "PendingUsers",
            Tag::Leaves => "Leaves",
            Tag::LeaveBalance => "LeaveBalance",
            Tag::LeaveStatistics => "LeaveStatistics",
            Tag::Salaries => "Salaries",
            Tag::SalaryStatistics => "SalaryStatistics",
        }
    }
}

impl core::fmt::Display for Tag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a cached query. Arguments are kept as structured pairs, so
/// values containing `&` or `=` never alias another request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: &'static str,
    path: String,
    query: Vec<(String, String)>,
    body: Option<String>,
}

impl CacheKey {
    /// Key for `request` issued by the query named `endpoint`.
    ///
    /// Query pairs are order-insensitive; the path carries any path parameters.
    pub fn new(endpoint: &'static str, request: &ApiRequest) -> Self {
        Self {
            endpoint,
            path: request.path.clone(),
            query: request.canonical_query(),
            body: request.body.as_ref().map(Value::to_string),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }
}

/// A cached value and whether it may be served without refetching.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached {
    pub value: Value,
    pub fresh: bool,
}

#[derive(Debug)]
struct Entry {
    value: Value,
    tags: Vec<Tag>,
    fresh: bool,
}

/// Tag generations observed when a fetch started.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Generations(Vec<(Tag, u64)>);

/// Per-key fetch lock shared by concurrent callers of the same query.
#[derive(Debug, Default)]
struct Flight {
    lock: Arc<tokio::sync::Mutex<()>>,
    holders: usize,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, Entry>,
    generations: HashMap<Tag, u64>,
    in_flight: HashMap<CacheKey, Flight>,
}

impl CacheState {
    fn snapshot(&self, tags: &[Tag]) -> Generations {
        Generations(
            tags.iter()
                .map(|t| (*t, self.generations.get(t).copied().unwrap_or(0)))
                .collect(),
        )
    }
}

/// A caller's membership in a [`Flight`]; the last one out removes it.
struct FlightTicket<'a> {
    cache: &'a QueryCache,
    key: CacheKey,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for FlightTicket<'_> {
    fn drop(&mut self) {
        let mut state = self.cache.state();
        let last = match state.in_flight.get_mut(&self.key) {
            Some(flight) => {
                flight.holders = flight.holders.saturating_sub(1);
                flight.holders == 0
            }
            None => false,
        };
        if last {
            state.in_flight.remove(&self.key);
        }
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    state: Mutex<CacheState>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fresh value for `key`, if any.
    pub fn lookup(&self, key: &CacheKey) -> Option<Value> {
        let state = self.state();
        state
            .entries
            .get(key)
            .filter(|e| e.fresh)
            .map(|e| e.value.clone())
    }

    /// Value for `key` regardless of freshness.
    pub fn peek(&self, key: &CacheKey) -> Option<Cached> {
        self.state().entries.get(key).map(|e| Cached {
            value: e.value.clone(),
            fresh: e.fresh,
        })
    }

    /// Serve `key` from cache, or run `fetch` and remember its result.
    ///
    /// Concurrent callers with the same key share one fetch. Errors are
    /// returned to every caller that ran the fetch and never stored. A result
    /// whose tags were invalidated while it was in flight is stored stale.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, tags: &[Tag], fetch: F) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>>,
    {
        if let Some(value) = self.lookup(&key) {
            tracing::debug!(endpoint = key.endpoint, "cache hit");
            return Ok(value);
        }

        let ticket = self.join_flight(&key);
        let _permit = ticket.lock.lock().await;

        if let Some(value) = self.lookup(&key) {
            tracing::debug!(endpoint = key.endpoint, "served by concurrent fetch");
            return Ok(value);
        }

        let started = self.state().snapshot(tags);
        let result = fetch().await;

        let value = result?;
        let mut state = self.state();
        let fresh = state.snapshot(tags) == started;
        if !fresh {
            tracing::debug!(endpoint = key.endpoint, "tags invalidated during fetch; storing stale");
        }
        state.entries.insert(
            key,
            Entry {
                value: value.clone(),
                tags: tags.to_vec(),
                fresh,
            },
        );
        // Released before the ticket, whose drop takes the same lock.
        drop(state);
        Ok(value)
    }

    fn join_flight(&self, key: &CacheKey) -> FlightTicket<'_> {
        let mut state = self.state();
        let flight = state.in_flight.entry(key.clone()).or_default();
        flight.holders += 1;
        FlightTicket {
            cache: self,
            key: key.clone(),
            lock: flight.lock.clone(),
        }
    }

    /// Mark every entry providing any of `tags` stale.
    pub fn invalidate(&self, tags: &[Tag]) {
        if tags.is_empty() {
            return;
        }
        let mut state = self.state();
        for tag in tags {
            *state.generations.entry(*tag).or_insert(0) += 1;
        }
        let mut marked = 0usize;
        for entry in state.entries.values_mut() {
            if entry.fresh && entry.tags.iter().any(|t| tags.contains(t)) {
                entry.fresh = false;
                marked += 1;
            }
        }
        tracing::debug!(tags = ?tags, marked, "invalidated cache tags");
    }

    /// Drop every entry, e.g. on logout.
    pub fn clear(&self) {
        let mut state = self.state();
        state.entries.clear();
        // Bump all generations so fetches started before the clear land stale.
        for tag in Tag::ALL {
            *state.generations.entry(tag).or_insert(0) += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use proptest::prelude::*;
    use serde_json::json;

    fn key(path: &str) -> CacheKey {
        CacheKey::new("test", &ApiRequest::get(path))
    }

    #[tokio::test]
    async fn second_query_is_served_from_cache() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!([1, 2]))
        };

        cache.get_or_fetch(key("/leaves"), &[Tag::Leaves], fetch).await.unwrap();
        let again = cache.get_or_fetch(key("/leaves"), &[Tag::Leaves], fetch).await.unwrap();

        assert_eq!(again, json!([1, 2]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_only_affects_matching_tags() {
        let cache = QueryCache::new();
        cache
            .get_or_fetch(key("/leaves"), &[Tag::Leaves], || async { Ok(json!("leaves")) })
            .await
            .unwrap();
        cache
            .get_or_fetch(key("/salaries"), &[Tag::Salaries], || async { Ok(json!("salaries")) })
            .await
            .unwrap();

        cache.invalidate(&[Tag::Leaves, Tag::LeaveBalance]);

        assert_eq!(cache.lookup(&key("/leaves")), None);
        assert_eq!(
            cache.peek(&key("/leaves")),
            Some(Cached {
                value: json!("leaves"),
                fresh: false
            })
        );
        assert_eq!(cache.lookup(&key("/salaries")), Some(json!("salaries")));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = QueryCache::new();
        let err = cache
            .get_or_fetch(key("/users"), &[Tag::Users], || async { Err(ApiError::api(500, None)) })
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn concurrent_queries_share_one_fetch() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(key("/users/pending"), &[Tag::PendingUsers], move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(json!("pending"))
                    })
                    .await
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), json!("pending"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.state().in_flight.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_releases_its_flight() {
        let cache = QueryCache::new();
        let _ = cache
            .get_or_fetch(key("/users"), &[Tag::Users], || async { Err(ApiError::api(500, None)) })
            .await;
        assert!(cache.state().in_flight.is_empty());

        let value = cache
            .get_or_fetch(key("/users"), &[Tag::Users], || async { Ok(json!("users")) })
            .await
            .unwrap();
        assert_eq!(value, json!("users"));
        assert!(cache.state().in_flight.is_empty());
    }

    #[tokio::test]
    async fn invalidation_during_fetch_stores_stale() {
        let cache = QueryCache::new();
        let shared = &cache;
        let value = cache
            .get_or_fetch(key("/leaves"), &[Tag::Leaves], move || async move {
                shared.invalidate(&[Tag::Leaves]);
                Ok(json!("old"))
            })
            .await
            .unwrap();

        assert_eq!(value, json!("old"));
        assert_eq!(cache.lookup(&key("/leaves")), None);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = QueryCache::new();
        cache
            .get_or_fetch(key("/auth/me"), &[Tag::Auth], || async { Ok(json!("me")) })
            .await
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn query_values_with_separators_do_not_alias() {
        let packed = ApiRequest::get("/users").query("department", "Eng&search=bob");
        let split = ApiRequest::get("/users")
            .query("department", "Eng")
            .query("search", "bob");
        assert_ne!(CacheKey::new("all_users", &packed), CacheKey::new("all_users", &split));

        let eq_in_value = ApiRequest::get("/users").query("search", "a=b");
        let eq_in_key = ApiRequest::get("/users").query("search=a", "b");
        assert_ne!(CacheKey::new("all_users", &eq_in_value), CacheKey::new("all_users", &eq_in_key));
    }

    proptest! {
        #[test]
        fn key_ignores_query_order(pairs in proptest::collection::vec(("[a-z]{1,6}", "[a-z0-9]{0,6}"), 0..6)) {
            let forward = pairs
                .iter()
                .fold(ApiRequest::get("/leaves"), |r, (k, v)| r.query(k.as_str(), v));
            let backward = pairs
                .iter()
                .rev()
                .fold(ApiRequest::get("/leaves"), |r, (k, v)| r.query(k.as_str(), v));
            prop_assert_eq!(CacheKey::new("all_leaves", &forward), CacheKey::new("all_leaves", &backward));
        }
    }
}
