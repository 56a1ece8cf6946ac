// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL-based cache of species regulation profiles, keyed by species and prefecture

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::fish::FishData;

/// TTL-based cache for regulation profiles
pub struct RegulationCache {
    cache: RwLock<HashMap<String, CachedEntry>>,
    ttl: Duration,
    max_entries: usize,
}

struct CachedEntry {
    profile: FishData,
    inserted_at: Instant,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total entries in cache
    pub total: usize,
    /// Expired entries (not yet evicted)
    pub expired: usize,
    /// Maximum cache capacity
    pub max: usize,
}

impl RegulationCache {
    /// Create a new regulation cache
    ///
    /// # Arguments
    /// * `ttl_secs` - Time-to-live for cache entries in seconds
    /// * `max_entries` - Maximum number of entries to store
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        }
    }

    /// Get the cached profile for a species in a prefecture
    ///
    /// Returns None if not found or expired
    pub fn get(&self, species: &str, prefecture: &str) -> Option<FishData> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(&Self::cache_key(species, prefecture))?;

        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }

        Some(entry.profile.clone())
    }

    pub fn insert(&self, species: &str, prefecture: &str, profile: &FishData) {
        if self.max_entries == 0 {
            return;
        }

        let mut cache = match self.cache.write() {
            Ok(c) => c,
            Err(_) => return,
        };

        let key = Self::cache_key(species, prefecture);
        if !cache.contains_key(&key) && cache.len() >= self.max_entries {
            self.purge_expired(&mut cache);
            if cache.len() >= self.max_entries {
                Self::evict_oldest(&mut cache);
            }
        }

        cache.insert(
            key,
            CachedEntry {
                profile: profile.clone(),
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let cache = match self.cache.read() {
            Ok(c) => c,
            Err(_) => {
                return CacheStats {
                    total: 0,
                    expired: 0,
                    max: self.max_entries,
                }
            }
        };

        CacheStats {
            total: cache.len(),
            expired: cache
                .values()
                .filter(|e| e.inserted_at.elapsed() > self.ttl)
                .count(),
            max: self.max_entries,
        }
    }

    /// Remove expired entries from cache
    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.cache.write() {
            self.purge_expired(&mut cache);
        }
    }

    fn purge_expired(&self, cache: &mut HashMap<String, CachedEntry>) {
        cache.retain(|_, entry| entry.inserted_at.elapsed() <= self.ttl);
    }

    fn cache_key(species: &str, prefecture: &str) -> String {
        format!(
            "{}|{}",
            species.trim().to_lowercase(),
            prefecture.trim().to_lowercase()
        )
    }

    fn evict_oldest(cache: &mut HashMap<String, CachedEntry>) {
        if let Some(oldest_key) = cache
            .iter()
            .min_by_key(|(_, v)| v.inserted_at)
            .map(|(k, _)| k.clone())
        {
            cache.remove(&oldest_key);
        }
    }
}
