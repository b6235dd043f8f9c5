#![deny(missing_docs)]
//! Lasso metrics

use std::sync::Arc;

use witchcraft_metrics::{MetricRegistry, Metrics};

// re-export exposed metric types
pub use witchcraft_metrics::{Counter, Metric, MetricId};

/// A cheaply cloneable registry of performance metrics.
///
/// Clones share the same underlying registry, so a stage can hand its registry to the caches
/// it creates and a caller can read everything back from one place.
#[derive(Clone, Default)]
pub struct LassoMetrics {
    registry: Arc<MetricRegistry>,
}

impl LassoMetrics {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the counter with the specified ID, creating a default instance if absent.
    ///
    /// # Panics
    ///
    /// Panics if a metric is registered with the ID that is not a counter.
    pub fn counter<T>(&self, id: T) -> Arc<Counter>
    where
        T: Into<MetricId>,
    {
        self.registry.counter(id)
    }

    /// Returns a snapshot of the metrics in the registry.
    pub fn snapshot(&self) -> Metrics {
        self.registry.metrics()
    }

    /// Returns the current value of the named counter, or zero if it has not been registered.
    pub fn counter_value(&self, name: &str) -> i64 {
        self.snapshot()
            .iter()
            .find_map(|(id, metric)| match metric {
                Metric::Counter(counter) if id.name() == name => Some(counter.count()),
                _ => None,
            })
            .unwrap_or(0)
    }
}

/// The counters maintained by a bounded cache.
#[derive(Clone)]
pub struct CacheMetrics {
    /// Lookups answered from the cache.
    pub hits: Arc<Counter>,
    /// Lookups that had to materialize a fresh value.
    pub misses: Arc<Counter>,
    /// Entries dropped to respect the cache capacity.
    pub evictions: Arc<Counter>,
}

impl CacheMetrics {
    /// Register the counters for the cache called `name`, as `lasso.cache.<name>.*`.
    pub fn new(metrics: &LassoMetrics, name: &str) -> Self {
        Self {
            hits: metrics.counter(format!("lasso.cache.{name}.hits")),
            misses: metrics.counter(format!("lasso.cache.{name}.misses")),
            evictions: metrics.counter(format!("lasso.cache.{name}.evictions")),
        }
    }
}
