//! Rendered page cache.
//!
//! # Responsibilities
//! - Memoize full page HTML per (locale, bot flag, view, params)
//! - Render each key at most once, even under concurrent first requests
//!
//! # Design Decisions
//! - Entries live for the process lifetime; there is no invalidation
//! - `max_entries` bounds the entry count; past it the least recently used
//!   entry is evicted (approximate under concurrent access)
//! - The query string is not part of the key

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::http::RequestContext;
use crate::observability::metrics;
use crate::routing::{Params, RenderProps};

/// Cache key for a rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

#[derive(Serialize)]
struct KeyParts<'a> {
    locale: &'a str,
    is_bot: bool,
    view: &'a str,
    params: &'a Params,
}

impl CacheKey {
    /// Derive the key from everything that affects the rendered output.
    pub fn derive(ctx: &RequestContext, props: &RenderProps) -> Self {
        let parts = KeyParts {
            locale: &ctx.locale,
            is_bot: ctx.is_bot,
            view: &props.view,
            params: &props.params,
        };
        // Params is a BTreeMap, so the encoding is canonical.
        let encoded = serde_json::to_string(&parts)
            .unwrap_or_else(|_| format!("{}|{}|{}", ctx.locale, ctx.is_bot, props.view));
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
struct Cached {
    page: Arc<str>,
    last_used: AtomicU64,
}

/// Concurrent page cache shared by all request handlers.
#[derive(Debug)]
pub struct RenderCache {
    inner: DashMap<CacheKey, Cached>,
    clock: AtomicU64,
    max_entries: usize,
}

impl RenderCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: DashMap::new(),
            clock: AtomicU64::new(0),
            max_entries,
        }
    }

    /// Return the cached page for `key`, computing and storing it on first use.
    ///
    /// A failed computation is not stored; the next request retries it.
    pub fn get_or_compute<F, E>(&self, key: CacheKey, compute: F) -> Result<Arc<str>, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        if let Some(hit) = self.inner.get(&key) {
            metrics::record_cache(true);
            hit.last_used.store(self.tick(), Ordering::Relaxed);
            return Ok(Arc::clone(&hit.page));
        }
        metrics::record_cache(false);

        // The shard lock is held while computing, so concurrent misses on the
        // same key wait for the first render instead of repeating it.
        let (page, inserted) = match self.inner.entry(key.clone()) {
            Entry::Occupied(entry) => (Arc::clone(&entry.get().page), false),
            Entry::Vacant(entry) => {
                let page: Arc<str> = Arc::from(compute()?);
                entry.insert(Cached {
                    page: Arc::clone(&page),
                    last_used: AtomicU64::new(self.tick()),
                });
                (page, true)
            }
        };
        if inserted {
            self.evict_over_bound(&key);
            metrics::record_cache_size(self.inner.len());
        }
        Ok(page)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Drop least recently used entries until the bound holds. `keep` is the
    /// key just inserted and is never chosen.
    ///
    /// Must not be called while holding a map reference.
    fn evict_over_bound(&self, keep: &CacheKey) {
        while self.inner.len() > self.max_entries {
            let victim = self
                .inner
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().last_used.load(Ordering::Relaxed))
                .map(|entry| entry.key().clone());
            let Some(victim) = victim else { break };
            if self.inner.remove(&victim).is_some() {
                tracing::debug!(key = victim.as_str(), "Evicted render cache entry");
            }
        }
    }
}
