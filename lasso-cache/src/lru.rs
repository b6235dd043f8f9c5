use std::fmt::Debug;
use std::hash::Hash;

use lasso_error::{LassoResult, lasso_bail};
use linked_hash_set::LinkedHashSet;
use rustc_hash::{FxBuildHasher, FxHashMap};

/// The outcome of [`LruCache::insert_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inserted<K, V> {
    /// The value now associated with the key.
    pub value: V,
    /// Whether the candidate value was stored, i.e. the key was absent.
    pub stored: bool,
    /// The least-recently-used entry dropped to make room, if any.
    pub evicted: Option<(K, V)>,
}

/// A fixed-capacity, get-or-insert, least-recently-used cache.
///
/// Inserting a key that is already present keeps the stored value and discards the
/// candidate, so callers can rely on the identity of a value for as long as it stays cached.
/// [`LruCache::lookup`] never changes the recency order.
///
/// The cache does not own the lifetime of what its values refer to: values are meant to be
/// cheap handles, and evicting an entry only removes the mapping.
pub struct LruCache<K, V> {
    capacity: usize,
    /// Front is least recently used, back is most recently used.
    recency: LinkedHashSet<K, FxBuildHasher>,
    entries: FxHashMap<K, V>,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Hash + Eq,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries.
    pub fn try_new(capacity: usize) -> LassoResult<Self> {
        if capacity == 0 {
            lasso_bail!("LruCache capacity must be positive, got {}", capacity);
        }
        Ok(Self {
            capacity,
            recency: LinkedHashSet::with_hasher(FxBuildHasher),
            entries: FxHashMap::with_capacity_and_hasher(capacity + 1, FxBuildHasher),
        })
    }

    /// Get-or-insert `candidate` at `key`, returning the value now associated with `key`.
    pub fn insert(&mut self, key: K, candidate: V) -> V {
        self.insert_entry(key, candidate).value
    }

    /// Like [`LruCache::insert`], but also reports whether the candidate was stored and
    /// which entry, if any, was evicted, so the owner of the values can dispose of it.
    pub fn insert_entry(&mut self, key: K, candidate: V) -> Inserted<K, V> {
        if let Some(existing) = self.entries.get(&key) {
            let value = existing.clone();
            // move to the back
            self.recency.remove(&key);
            self.recency.insert(key);
            return Inserted {
                value,
                stored: false,
                evicted: None,
            };
        }

        self.entries.insert(key.clone(), candidate.clone());
        self.recency.insert(key);

        let evicted = if self.entries.len() > self.capacity {
            self.recency
                .pop_front()
                .and_then(|lru| self.entries.remove(&lru).map(|value| (lru, value)))
        } else {
            None
        };

        Inserted {
            value: candidate,
            stored: true,
            evicted,
        }
    }

    /// Returns the value stored at `key`, without touching the recency order.
    pub fn lookup(&self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    /// Returns a reference to the value stored at `key`, without touching the recency order.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove the entry at `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.recency.remove(key);
        Some(value)
    }

    /// All live keys, most recently used first.
    pub fn keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.recency.iter().cloned().collect();
        keys.reverse();
        keys
    }

    /// The number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K: Debug + Hash + Eq, V> Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("recency", &self.recency)
            .finish()
    }
}
