use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::Mutex;

use crate::domain::{SearchMode, SupplierRecord};

/// Bounded discovery-result cache: LRU over capacity, entries expire after
/// the TTL. Injected into the pipeline so tests control its lifecycle.
pub struct DiscoveryCache {
    entries: Mutex<LruCache<String, CachedEntry>>,
    ttl: Duration,
}

struct CachedEntry {
    stored_at: Instant,
    records: Vec<SupplierRecord>,
}

impl DiscoveryCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        DiscoveryCache {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn key(product_name: &str, region: &str, mode: SearchMode) -> String {
        format!(
            "{}|{}|{:?}",
            product_name.trim().to_lowercase(),
            region.trim().to_lowercase(),
            mode
        )
    }

    pub async fn get(&self, key: &str) -> Option<Vec<SupplierRecord>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                log::info!("Discovery cache hit for {}", key);
                Some(entry.records.clone())
            }
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub async fn put(&self, key: String, records: Vec<SupplierRecord>) {
        let mut entries = self.entries.lock().await;
        entries.put(
            key,
            CachedEntry {
                stored_at: Instant::now(),
                records,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> SupplierRecord {
        SupplierRecord {
            name: name.to_string(),
            url: format!("https://{}.example.com", name),
            email: None,
            phone: None,
            summary: None,
        }
    }

    #[tokio::test]
    async fn caches_and_returns_records() {
        let cache = DiscoveryCache::new(8, Duration::from_secs(60));
        let key = DiscoveryCache::key("Green Tea", "Vietnam", SearchMode::Quick);

        assert!(cache.get(&key).await.is_none());
        cache.put(key.clone(), vec![record("a")]).await;

        let hit = cache.get(&key).await.unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].name, "a");
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = DiscoveryCache::new(8, Duration::ZERO);
        let key = DiscoveryCache::key("tea", "vietnam", SearchMode::Basic);

        cache.put(key.clone(), vec![record("a")]).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let cache = DiscoveryCache::new(2, Duration::from_secs(60));
        cache.put("k1".to_string(), vec![record("a")]).await;
        cache.put("k2".to_string(), vec![record("b")]).await;
        cache.put("k3".to_string(), vec![record("c")]).await;

        assert!(cache.get("k1").await.is_none());
        assert!(cache.get("k3").await.is_some());
    }

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(
            DiscoveryCache::key(" Green Tea ", "VIETNAM", SearchMode::Quick),
            DiscoveryCache::key("green tea", "vietnam", SearchMode::Quick),
        );
    }
}
