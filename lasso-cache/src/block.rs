use std::fmt::{Debug, Display};
use std::hash::Hash;

use lasso_error::{LassoExpect, LassoResult};
use lasso_metrics::{CacheMetrics, LassoMetrics};

use crate::{Arena, Handle, LruCache};

/// An owning, bounded, least-recently-used cache of materialized blocks.
///
/// The [`LruCache`] only indexes [`Handle`]s. The values themselves live in an [`Arena`] owned
/// by this cache, and an evicted value is dropped from the arena as soon as its mapping is.
pub struct BlockCache<K, T> {
    index: LruCache<K, Handle>,
    arena: Arena<T>,
    metrics: CacheMetrics,
}

impl<K, T> BlockCache<K, T>
where
    K: Clone + Hash + Eq + Display,
{
    /// Create a cache holding at most `capacity` blocks, reporting to `metrics` as `name`.
    pub fn try_new(capacity: usize, metrics: &LassoMetrics, name: &str) -> LassoResult<Self> {
        Ok(Self {
            index: LruCache::try_new(capacity)?,
            arena: Arena::with_capacity(capacity),
            metrics: CacheMetrics::new(metrics, name),
        })
    }

    /// Return the block at `key`, materializing it with `f` if it is not cached.
    ///
    /// A hit promotes the block to most recently used and never calls `f`. If `f` fails
    /// nothing is cached and the error is returned.
    pub fn get_or_try_insert_with<F>(&mut self, key: K, f: F) -> LassoResult<&T>
    where
        F: FnOnce() -> LassoResult<T>,
    {
        let handle = match self.index.lookup(&key) {
            Some(handle) => {
                log::debug!("Resolved block {key} from cache");
                self.metrics.hits.inc();
                self.index.insert(key, handle)
            }
            None => {
                self.metrics.misses.inc();
                let value = f()?;
                let handle = self.arena.insert(value);
                let inserted = self.index.insert_entry(key, handle);
                if let Some((evicted, stale)) = inserted.evicted {
                    log::trace!("Evicting block {evicted}");
                    self.arena.remove(stale);
                    self.metrics.evictions.inc();
                }
                inserted.value
            }
        };

        Ok(self
            .arena
            .get(handle)
            .lasso_expect("cached handle must refer to a live block"))
    }

    /// The block at `key`, if cached. Does not touch the recency order.
    pub fn get(&self, key: &K) -> Option<&T> {
        self.index
            .lookup(key)
            .and_then(|handle| self.arena.get(handle))
    }

    /// Remove the block at `key`, handing ownership back to the caller.
    pub fn remove(&mut self, key: &K) -> Option<T> {
        let handle = self.index.remove(key)?;
        self.arena.remove(handle)
    }

    /// The cached keys, most recently used first.
    pub fn keys(&self) -> Vec<K> {
        self.index.keys()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

impl<K: Debug + Hash + Eq, T> Debug for BlockCache<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockCache")
            .field("index", &self.index)
            .field("live", &self.arena.len())
            .finish()
    }
}
