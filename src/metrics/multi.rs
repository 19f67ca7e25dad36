use std::collections::HashMap;
use std::sync::Arc;

use super::set::MetricSet;
use super::Metric;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Live,
    Snapshot,
    Nil,
}

/// A tagged group of named sub-metrics registered as one entry, e.g. a
/// latency histogram and an error counter for a single endpoint.
///
/// Tags are fixed at construction. Sub-metrics are added on demand through
/// `get_or_add*`, which carry the same atomicity guarantee as
/// [`Registry::get_or_register`](crate::Registry::get_or_register).
pub struct MultiMetric {
    metrics: MetricSet,
    tags: HashMap<String, String>,
    mode: Mode,
}

impl MultiMetric {
    pub fn new(tags: HashMap<String, String>) -> Self {
        Self {
            metrics: MetricSet::new(),
            tags,
            mode: Mode::Live,
        }
    }

    /// Composite that keeps nothing: `get_or_add*` hand back the supplied
    /// metric without retaining it.
    pub fn nil() -> Self {
        Self {
            metrics: MetricSet::new(),
            tags: HashMap::new(),
            mode: Mode::Nil,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.mode == Mode::Snapshot
    }

    pub fn get_or_add(&self, name: &str, metric: Arc<dyn Metric>) -> Arc<dyn Metric> {
        self.get_or_add_with(name, move || metric)
    }

    /// Lazy variant: `factory` runs only if `name` is not yet present.
    pub fn get_or_add_with<F>(&self, name: &str, factory: F) -> Arc<dyn Metric>
    where
        F: FnOnce() -> Arc<dyn Metric>,
    {
        match self.mode {
            Mode::Live => self.metrics.get_or_insert_with(name, factory),
            Mode::Snapshot => panic!("get_or_add called on a MultiMetric snapshot"),
            Mode::Nil => factory(),
        }
    }

    /// Typed lazy variant; see [`Registry::get_or_register_typed`](crate::Registry::get_or_register_typed).
    pub fn get_or_add_typed<T, F>(&self, name: &str, factory: F) -> Result<Arc<T>>
    where
        T: Metric,
        F: FnOnce() -> T,
    {
        match self.mode {
            Mode::Live => self.metrics.get_or_insert_typed(name, factory),
            Mode::Snapshot => panic!("get_or_add called on a MultiMetric snapshot"),
            Mode::Nil => Ok(Arc::new(factory())),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Metric>> {
        self.metrics.get(name)
    }

    /// Current sub-metrics by name. The map is a copy; the metrics are the
    /// live instances.
    pub fn metrics(&self) -> HashMap<String, Arc<dyn Metric>> {
        self.metrics.copy()
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only copy whose sub-metrics are each sub-metric's own snapshot.
    pub fn snapshot(&self) -> MultiMetric {
        if self.mode == Mode::Nil {
            return MultiMetric::nil();
        }

        // Snapshot children outside our lock.
        let frozen: HashMap<String, Arc<dyn Metric>> = self
            .metrics
            .copy()
            .into_iter()
            .map(|(name, metric)| (name, metric.snapshot()))
            .collect();

        MultiMetric {
            metrics: MetricSet::from_map(frozen),
            tags: self.tags.clone(),
            mode: Mode::Snapshot,
        }
    }
}

impl Metric for MultiMetric {
    fn snapshot(&self) -> Arc<dyn Metric> {
        Arc::new(MultiMetric::snapshot(self))
    }
}

impl std::fmt::Debug for MultiMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiMetric")
            .field("tags", &self.tags)
            .field("metrics", &self.len())
            .field("mode", &self.mode)
            .finish()
    }
}
