use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{downcast_arc, kind_name, Metric};
use crate::error::{MetricsError, Result};

/// Mutex-protected name → metric map shared by [`Registry`](crate::Registry)
/// and [`MultiMetric`](super::MultiMetric).
///
/// Every get-or-insert runs lookup, optional construction and insert in one
/// critical section, so racing first callers all observe the same instance.
/// The lock is never held while calling user code other than the factory.
#[derive(Default)]
pub(crate) struct MetricSet {
    metrics: Mutex<HashMap<String, Arc<dyn Metric>>>,
}

impl MetricSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(metrics: HashMap<String, Arc<dyn Metric>>) -> Self {
        Self {
            metrics: Mutex::new(metrics),
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<dyn Metric>> {
        self.metrics.lock().get(name).cloned()
    }

    /// Insert `metric` unless `name` is taken.
    pub(crate) fn insert(&self, name: &str, metric: Arc<dyn Metric>) -> Result<()> {
        let mut metrics = self.metrics.lock();
        if metrics.contains_key(name) {
            return Err(MetricsError::DuplicateMetric(name.to_string()));
        }
        metrics.insert(name.to_string(), metric);
        Ok(())
    }

    /// Existing entry, or the one produced by `factory`. The factory runs at
    /// most once and only when `name` is absent; it must not re-enter this set.
    /// Logging happens after the lock is released.
    pub(crate) fn get_or_insert_with<F>(&self, name: &str, factory: F) -> Arc<dyn Metric>
    where
        F: FnOnce() -> Arc<dyn Metric>,
    {
        let mut metrics = self.metrics.lock();
        if let Some(existing) = metrics.get(name) {
            return existing.clone();
        }
        let metric = factory();
        metrics.insert(name.to_string(), metric.clone());
        drop(metrics);

        tracing::trace!(metric = name, "constructed metric");
        metric
    }

    /// Typed get-or-insert. Fails with `KindMismatch` when the existing entry
    /// is not a `T`; nothing is constructed in that case.
    pub(crate) fn get_or_insert_typed<T, F>(&self, name: &str, factory: F) -> Result<Arc<T>>
    where
        T: Metric,
        F: FnOnce() -> T,
    {
        let mut metrics = self.metrics.lock();
        if let Some(existing) = metrics.get(name) {
            return downcast_arc::<T>(existing.clone()).ok_or_else(|| {
                MetricsError::KindMismatch {
                    name: name.to_string(),
                    expected: kind_name::<T>(),
                }
            });
        }
        let metric = Arc::new(factory());
        metrics.insert(name.to_string(), metric.clone());
        drop(metrics);

        tracing::trace!(metric = name, kind = kind_name::<T>(), "constructed metric");
        Ok(metric)
    }

    pub(crate) fn remove(&self, name: &str) -> Option<Arc<dyn Metric>> {
        self.metrics.lock().remove(name)
    }

    /// Removes everything, returning how many entries were dropped.
    pub(crate) fn clear(&self) -> usize {
        let mut metrics = self.metrics.lock();
        let removed = metrics.len();
        metrics.clear();
        removed
    }

    /// Point-in-time copy of the map. Iterate this, not the live map, so
    /// callbacks can re-enter the owner without deadlocking.
    pub(crate) fn copy(&self) -> HashMap<String, Arc<dyn Metric>> {
        self.metrics.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.metrics.lock().len()
    }
}
