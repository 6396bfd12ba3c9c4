//! Memoized results keyed by (requested name, clamped days).
//!
//! Entries are never refreshed from upstream: a hit returns whatever was
//! stored, however old, unless a TTL is configured. Size is bounded by
//! `max_entries` with least-recently-used eviction.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use shared::models::StockResult;
use tokio::sync::RwLock;

use crate::config::CacheSettings;

pub type CacheKey = (String, usize);

struct CacheEntry {
    result: Arc<StockResult>,
    inserted_at: Instant,
    // tick of the last hit, lets lookups stay under the read lock
    last_used: AtomicU64,
}

pub struct ResultCache {
    settings: CacheSettings,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    clock: AtomicU64,
}

impl ResultCache {
    pub fn new(settings: CacheSettings) -> Self {
        ResultCache {
            settings,
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.settings
            .ttl()
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }

    pub async fn get(&self, name: &str, days: usize) -> Option<Arc<StockResult>> {
        let entries = self.entries.read().await;
        let entry = entries.get(&(name.to_string(), days))?;
        if self.is_expired(entry) {
            return None;
        }
        entry.last_used.store(self.tick(), Ordering::Relaxed);
        Some(Arc::clone(&entry.result))
    }

    pub async fn insert(&self, name: &str, days: usize, result: Arc<StockResult>) {
        let mut entries = self.entries.write().await;
        if self.settings.ttl().is_some() {
            entries.retain(|_, entry| !self.is_expired(entry));
        }

        entries.insert(
            (name.to_string(), days),
            CacheEntry {
                result,
                inserted_at: Instant::now(),
                last_used: AtomicU64::new(self.tick()),
            },
        );

        if let Some(max) = self.settings.max_entries {
            while entries.len() > max {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                    .map(|(key, _)| key.clone());
                match oldest {
                    Some(key) => {
                        tracing::debug!(stock_name = %key.0, days = key.1, "Evicting cached result");
                        entries.remove(&key);
                    }
                    None => break,
                }
            }
        }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
