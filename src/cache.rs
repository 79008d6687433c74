//! General-purpose metadata cache shared by the providers.

use std::hash::Hash;

use dashmap::DashMap;

use crate::metrics;

/// Process-lifetime key/value cache with atomic get-or-set semantics.
///
/// Backed by `DashMap` for lock-free concurrent access; writes are
/// idempotent so racing requests re-writing the same key is safe. There is
/// no TTL — invalidation is the embedding application's call. Instances are
/// constructed explicitly and injected, never global.
#[derive(Debug)]
pub struct MetadataCache<K: Eq + Hash, V> {
    name: &'static str,
    inner: DashMap<K, V>,
}

impl<K, V> MetadataCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: DashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        match self.inner.get(key) {
            Some(entry) => {
                metrics::increment_cache_hit(self.name);
                Some(entry.value().clone())
            }
            None => {
                metrics::increment_cache_miss(self.name);
                None
            }
        }
    }

    pub fn set(&self, key: K, value: V) {
        self.inner.insert(key, value);
        metrics::set_cache_size(self.name, self.inner.len() as f64);
    }

    pub fn has(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_has() {
        let cache: MetadataCache<u64, String> = MetadataCache::new("test");
        assert!(cache.get(&1).is_none());
        assert!(!cache.has(&1));

        cache.set(1, "one".to_string());
        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert!(cache.has(&1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let cache: MetadataCache<u64, String> = MetadataCache::new("test");
        cache.set(1, "one".to_string());
        cache.set(1, "one".to_string());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&1), Some("one".to_string()));
    }
}
