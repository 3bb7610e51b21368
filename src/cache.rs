//! Report cache with single-flight computation per key.
//!
//! Every key owns an async mutex. A caller holds it while it reads the entry and, on a miss,
//! while it computes; concurrent callers for the same key queue behind it and find the fresh
//! entry once it is released. The guard is dropped on success, error or cancellation alike,
//! so an abandoned request never blocks the key. A key is only removed from the map once its
//! slot is empty and no caller holds it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::core::FsError;
use crate::core::models::{Provider, Query, Report};

/// Defines the behavior of the report cache for one call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Return a non-expired entry if present; otherwise compute and store. (Default)
    #[default]
    Use,
    /// Always compute, then store the new report.
    Refresh,
    /// Always compute and neither read nor write the cache.
    Bypass,
}

/// Identifies a cached report.
///
/// The caller's preference is not part of the key: an `Auto` query and an explicit one that
/// select the same provider share an entry, and the report carries the query that filled it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Lower-cased, whitespace-collapsed company text.
    pub company: String,
    /// The provider selected for the query.
    pub provider: Provider,
    pub window_days: u32,
}

impl CacheKey {
    #[must_use]
    pub fn new(query: &Query, provider: Provider) -> Self {
        Self {
            company: query.normalized_text(),
            provider,
            window_days: query.window_days(),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    report: Report,
    stored_at: Instant,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

#[derive(Debug)]
pub struct ResultCache {
    slots: RwLock<HashMap<CacheKey, Slot>>,
    ttl: Duration,
}

impl ResultCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }

    async fn slot(&self, key: &CacheKey) -> Slot {
        if let Some(slot) = self.slots.read().await.get(key) {
            return slot.clone();
        }
        self.slots
            .write()
            .await
            .entry(key.clone())
            .or_default()
            .clone()
    }

    /// Drops `slot` from the map if it is still the one stored for `key`, holds no report and
    /// nobody else references it.
    async fn release(&self, key: &CacheKey, slot: Slot) {
        let mut slots = self.slots.write().await;
        let idle = slots.get(key).is_some_and(|current| {
            Arc::ptr_eq(current, &slot)
                && Arc::strong_count(&slot) == 2
                && slot.try_lock().is_ok_and(|entry| entry.is_none())
        });
        if idle {
            slots.remove(key);
        }
    }

    /// Returns the cached report for `key`, or runs `compute` and caches its success.
    ///
    /// At most one `compute` runs per key at a time. Errors are returned but never stored.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `compute`.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &CacheKey,
        mode: CacheMode,
        compute: F,
    ) -> Result<Report, FsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Report, FsError>>,
    {
        if mode == CacheMode::Bypass {
            return compute().await;
        }

        let slot = self.slot(key).await;
        let mut entry = slot.lock().await;

        if mode == CacheMode::Use
            && let Some(cached) = entry.as_ref()
            && self.is_fresh(cached)
        {
            return Ok(cached.report.clone());
        }

        let outcome = compute().await;
        if let Ok(report) = &outcome {
            *entry = Some(CacheEntry {
                report: report.clone(),
                stored_at: Instant::now(),
            });
        }
        let empty = entry.is_none();
        drop(entry);
        if empty {
            self.release(key, slot).await;
        }
        outcome
    }

    /// The cached report for `key`, if present and not expired.
    pub async fn get(&self, key: &CacheKey) -> Option<Report> {
        let slot = self.slots.read().await.get(key)?.clone();
        let entry = slot.lock().await;
        entry
            .as_ref()
            .filter(|e| self.is_fresh(e))
            .map(|e| e.report.clone())
    }

    /// Number of keys holding a report, expired or not, plus keys with a computation in
    /// flight. Never waits for a computation.
    pub async fn len(&self) -> usize {
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| match slot.try_lock() {
                Ok(entry) => entry.is_some(),
                Err(_) => true,
            })
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops the report for `key`. Waits for a computation in flight for it and discards its
    /// result too; the next caller computes afresh.
    pub async fn invalidate(&self, key: &CacheKey) {
        let Some(slot) = self.slots.read().await.get(key).cloned() else {
            return;
        };
        *slot.lock().await = None;
        self.release(key, slot).await;
    }

    /// Drops every report, waiting for computations in flight as [`ResultCache::invalidate`]
    /// does.
    pub async fn clear(&self) {
        let slots: Vec<(CacheKey, Slot)> = self
            .slots
            .read()
            .await
            .iter()
            .map(|(k, s)| (k.clone(), s.clone()))
            .collect();
        for (key, slot) in slots {
            *slot.lock().await = None;
            self.release(&key, slot).await;
        }
    }
}
