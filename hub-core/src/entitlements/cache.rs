//! Short-lived entitlement cache
//!
//! Entries expire at `resolved_at + ttl`. Expired entries are dropped lazily
//! on read; [`PermissionCache::purge_expired`] sweeps on demand. When the
//! cache is full, the entry closest to expiry is evicted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::UserEntitlements;
use crate::clock::{Clock, SystemClock};
use crate::config::{CacheConfig, MAX_TTL_SECONDS};

struct CacheEntry {
    entitlements: Arc<UserEntitlements>,
    expires_at: DateTime<Utc>,
}

/// Concurrent user id → entitlements cache
///
/// Concurrent writes for the same user are last-write-wins; entries are
/// derived from the same inputs, so either value is correct.
pub struct PermissionCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl PermissionCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(config.ttl_seconds.min(MAX_TTL_SECONDS) as i64),
            max_entries: config.max_entries.max(1),
            clock,
        }
    }

    /// Cached entitlements, or `None` if absent or expired
    pub async fn get(&self, user_id: &str) -> Option<Arc<UserEntitlements>> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(user_id) {
                None => return None,
                Some(entry) if entry.expires_at > now => {
                    trace!(user_id, "Entitlement cache hit");
                    return Some(Arc::clone(&entry.entitlements));
                }
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock, a fresh put may have landed
        let mut entries = self.entries.write().await;
        if entries
            .get(user_id)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            entries.remove(user_id);
            debug!(user_id, "Evicted expired entitlements");
        }
        entries
            .get(user_id)
            .map(|entry| Arc::clone(&entry.entitlements))
    }

    pub async fn put(&self, user_id: &str, entitlements: UserEntitlements) -> Arc<UserEntitlements> {
        let entitlements = Arc::new(entitlements);
        let expires_at = entitlements
            .resolved_at
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.write().await;
        if !entries.contains_key(user_id) && entries.len() >= self.max_entries {
            let now = self.clock.now();
            entries.retain(|_, entry| entry.expires_at > now);

            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(key, _)| key.clone());
                if let Some(key) = oldest {
                    entries.remove(&key);
                    debug!(user_id = %key, "Evicted entitlements to make room");
                }
            }
        }

        entries.insert(
            user_id.to_string(),
            CacheEntry {
                entitlements: Arc::clone(&entitlements),
                expires_at,
            },
        );
        entitlements
    }

    /// Drop a user's cached entitlements; returns whether anything was removed
    pub async fn invalidate(&self, user_id: &str) -> bool {
        let removed = self.entries.write().await.remove(user_id).is_some();
        if removed {
            debug!(user_id, "Invalidated cached entitlements");
        }
        removed
    }

    /// Remove every expired entry; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn config(ttl_seconds: u64, max_entries: usize) -> CacheConfig {
        CacheConfig {
            ttl_seconds,
            max_entries,
        }
    }

    fn entitlements_at(user_id: &str, clock: &ManualClock) -> UserEntitlements {
        let mut e = UserEntitlements::empty(user_id, format!("{}@example.gov", user_id));
        e.resolved_at = clock.now();
        e
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = PermissionCache::new(&CacheConfig::default());
        assert!(cache.get("nobody").await.is_none());
    }

    #[tokio::test]
    async fn test_put_then_get_within_ttl() {
        let clock = Arc::new(ManualClock::default());
        let cache = PermissionCache::with_clock(&config(60, 10), clock.clone());

        cache.put("alice", entitlements_at("alice", &clock)).await;
        clock.advance(Duration::seconds(59));

        let cached = cache.get("alice").await.unwrap();
        assert_eq!(cached.user_id, "alice");
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent_and_removed() {
        let clock = Arc::new(ManualClock::default());
        let cache = PermissionCache::with_clock(&config(60, 10), clock.clone());

        cache.put("alice", entitlements_at("alice", &clock)).await;
        clock.advance(Duration::seconds(60));

        assert!(cache.get("alice").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let clock = Arc::new(ManualClock::default());
        let cache = PermissionCache::with_clock(&config(60, 10), clock.clone());

        cache.put("alice", entitlements_at("alice", &clock)).await;
        assert!(cache.invalidate("alice").await);
        assert!(!cache.invalidate("alice").await);
        assert!(cache.get("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let clock = Arc::new(ManualClock::default());
        let cache = PermissionCache::with_clock(&config(60, 10), clock.clone());

        let first = entitlements_at("alice", &clock);
        let mut second = entitlements_at("alice", &clock);
        second.is_reviewer = true;

        cache.put("alice", first).await;
        cache.put("alice", second).await;

        assert!(cache.get("alice").await.unwrap().is_reviewer);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_bounded_evicts_closest_to_expiry() {
        let clock = Arc::new(ManualClock::default());
        let cache = PermissionCache::with_clock(&config(60, 2), clock.clone());

        cache.put("a", entitlements_at("a", &clock)).await;
        clock.advance(Duration::seconds(1));
        cache.put("b", entitlements_at("b", &clock)).await;
        clock.advance(Duration::seconds(1));
        cache.put("c", entitlements_at("c", &clock)).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_some());
        assert!(cache.get("c").await.is_some());
    }

    #[tokio::test]
    async fn test_full_cache_drops_expired_first() {
        let clock = Arc::new(ManualClock::default());
        let cache = PermissionCache::with_clock(&config(10, 2), clock.clone());

        cache.put("a", entitlements_at("a", &clock)).await;
        clock.advance(Duration::seconds(5));
        cache.put("b", entitlements_at("b", &clock)).await;
        clock.advance(Duration::seconds(6));
        // "a" has expired, "b" has not
        cache.put("c", entitlements_at("c", &clock)).await;

        assert!(cache.get("b").await.is_some());
        assert!(cache.get("c").await.is_some());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let clock = Arc::new(ManualClock::default());
        let cache = PermissionCache::with_clock(&config(10, 10), clock.clone());

        cache.put("a", entitlements_at("a", &clock)).await;
        cache.put("b", entitlements_at("b", &clock)).await;
        clock.advance(Duration::seconds(10));
        cache.put("c", entitlements_at("c", &clock)).await;

        assert_eq!(cache.purge_expired().await, 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_clamped() {
        let clock = Arc::new(ManualClock::default());
        let cache = PermissionCache::with_clock(&config(u64::MAX, 10), clock.clone());

        cache.put("alice", entitlements_at("alice", &clock)).await;
        clock.advance(Duration::seconds(MAX_TTL_SECONDS as i64 - 1));
        assert!(cache.get("alice").await.is_some());

        clock.advance(Duration::seconds(1));
        assert!(cache.get("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_expiry_saturates_near_max_timestamp() {
        let clock = Arc::new(ManualClock::default());
        let cache = PermissionCache::with_clock(&config(60, 10), clock.clone());

        let mut entitlements = entitlements_at("alice", &clock);
        entitlements.resolved_at = DateTime::<Utc>::MAX_UTC - Duration::seconds(1);
        cache.put("alice", entitlements).await;

        assert!(cache.get("alice").await.is_some());
    }
}
