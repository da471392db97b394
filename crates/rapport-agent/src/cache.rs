// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fingerprinted response cache in front of the completion service.
//!
//! Entries live for a fixed TTL, checked on read. After each insert the
//! globally oldest entries are evicted until the cache is back within
//! capacity. The lock is never held across the compute future, so one
//! slow completion does not block lookups for other users.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use rapport_config::model::CacheConfig;
use rapport_core::{RapportError, StyleTag, UserId};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Cache key derived from the user, the normalized message prefix, and the style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// SHA-256 over `user_id|prefix|style`, where `prefix` is the first
    /// `prefix_chars` characters of the already-normalized message.
    pub fn new(user_id: UserId, normalized: &str, prefix_chars: usize, style: StyleTag) -> Self {
        let prefix: String = normalized.chars().take(prefix_chars).collect();
        let mut hasher = Sha256::new();
        hasher.update(user_id.0.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(prefix.as_bytes());
        hasher.update(b"|");
        hasher.update(style.to_string().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: String,
    created_at: Instant,
}

/// A cached or freshly computed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub text: String,
    pub hit: bool,
}

pub struct ResponseCache {
    entries: Mutex<HashMap<Fingerprint, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_limits(Duration::from_secs(config.ttl_secs), config.capacity)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Returns the cached text if it is younger than the TTL.
    ///
    /// Expired entries are removed on the way out.
    pub async fn get(&self, key: &Fingerprint) -> Option<String> {
        let mut entries = self.entries.lock().await;
        let fresh = entries
            .get(key)
            .map(|entry| entry.created_at.elapsed() < self.ttl)?;
        if fresh {
            entries.get(key).map(|entry| entry.response.clone())
        } else {
            entries.remove(key);
            trace!(fingerprint = key.as_str(), "cache entry expired");
            None
        }
    }

    /// Stores `response`, then evicts the oldest entries beyond capacity.
    pub async fn insert(&self, key: Fingerprint, response: String) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            CacheEntry {
                response,
                created_at: Instant::now(),
            },
        );
        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                    debug!(fingerprint = key.as_str(), "evicted oldest cache entry");
                }
                None => break,
            }
        }
    }

    /// Returns the cached text, or runs `compute` and caches its result.
    ///
    /// Errors from `compute` are returned as-is and never cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: Fingerprint,
        compute: F,
    ) -> Result<Lookup, RapportError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, RapportError>>,
    {
        if let Some(text) = self.get(&key).await {
            return Ok(Lookup { text, hit: true });
        }
        let text = compute().await?;
        self.insert(key, text.clone()).await;
        Ok(Lookup { text, hit: false })
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn key(n: i64) -> Fingerprint {
        Fingerprint::new(UserId(n), "привет", 50, StyleTag::Friendly)
    }

    async fn counted(
        cache: &ResponseCache,
        key: Fingerprint,
        calls: &Arc<AtomicUsize>,
    ) -> Lookup {
        let calls = calls.clone();
        cache
            .get_or_compute(key, || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Ok(format!("answer {n}"))
            })
            .await
            .unwrap()
    }

    #[test]
    fn fingerprint_depends_on_all_parts() {
        let base = Fingerprint::new(UserId(1), "привет", 50, StyleTag::Friendly);
        assert_eq!(base, Fingerprint::new(UserId(1), "привет", 50, StyleTag::Friendly));
        assert_ne!(base, Fingerprint::new(UserId(2), "привет", 50, StyleTag::Friendly));
        assert_ne!(base, Fingerprint::new(UserId(1), "пока", 50, StyleTag::Friendly));
        assert_ne!(base, Fingerprint::new(UserId(1), "привет", 50, StyleTag::Neutral));
        assert_eq!(base.as_str().len(), 64);
    }

    #[test]
    fn fingerprint_only_sees_the_prefix() {
        let a = Fingerprint::new(UserId(1), "одинаковое начало, разный хвост A", 18, StyleTag::Neutral);
        let b = Fingerprint::new(UserId(1), "одинаковое начало, разный хвост B", 18, StyleTag::Neutral);
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn computes_once_within_ttl() {
        let cache = ResponseCache::with_limits(Duration::from_secs(300), 10);
        let calls = Arc::new(AtomicUsize::new(0));

        let first = counted(&cache, key(1), &calls).await;
        let second = counted(&cache, key(1), &calls).await;
        assert!(!first.hit);
        assert!(second.hit);
        assert_eq!(first.text, second.text);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recomputes_after_ttl() {
        let cache = ResponseCache::with_limits(Duration::from_secs(300), 10);
        let calls = Arc::new(AtomicUsize::new(0));

        counted(&cache, key(1), &calls).await;
        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(counted(&cache, key(1), &calls).await.hit);

        tokio::time::advance(Duration::from_secs(2)).await;
        let refreshed = counted(&cache, key(1), &calls).await;
        assert!(!refreshed.hit);
        assert_eq!(refreshed.text, "answer 1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_capacity_and_evicts_oldest() {
        let cache = ResponseCache::with_limits(Duration::from_secs(300), 3);
        let calls = Arc::new(AtomicUsize::new(0));
        for n in 0..10 {
            counted(&cache, key(n), &calls).await;
            tokio::time::advance(Duration::from_millis(10)).await;
            assert!(cache.len().await <= 3);
        }
        assert!(cache.get(&key(0)).await.is_none());
        assert!(cache.get(&key(9)).await.is_some());
        assert!(cache.get(&key(7)).await.is_some());
    }

    #[tokio::test]
    async fn hit_never_invokes_the_compute_closure() {
        let cache = ResponseCache::with_limits(Duration::from_secs(300), 10);
        cache.insert(key(1), "cached".into()).await;

        let invoked = AtomicUsize::new(0);
        let lookup = cache
            .get_or_compute(key(1), || {
                invoked.fetch_add(1, Ordering::SeqCst);
                async { Ok("fresh".to_string()) }
            })
            .await
            .unwrap();
        assert!(lookup.hit);
        assert_eq!(lookup.text, "cached");
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = ResponseCache::with_limits(Duration::from_secs(300), 10);
        let result = cache
            .get_or_compute(key(1), || async {
                Err(RapportError::CompletionMalformedResponse {
                    message: "empty".into(),
                })
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }
}
