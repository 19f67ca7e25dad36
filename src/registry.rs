use std::collections::HashMap;
use std::sync::Arc;

use crate::config::MetricsConfig;
use crate::error::Result;
use crate::metrics::set::MetricSet;
use crate::metrics::{Counter, Gauge, GaugeFloat64, Histogram, Metric, MultiMetric};

// ─── Registry ────────────────────────────────────────────────────

/// Concurrent name → metric store.
///
/// Names are unique: [`register`](Self::register) refuses a taken name, and
/// the `get_or_register*` family returns the existing entry instead. All
/// operations take one short-lived lock; enumeration works on a copy so the
/// callback may re-enter the registry.
#[derive(Default)]
pub struct Registry {
    metrics: MetricSet,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `f` once for every registered metric, in no particular order.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &Arc<dyn Metric>),
    {
        for (name, metric) in self.metrics.copy() {
            f(&name, &metric);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Metric>> {
        self.metrics.get(name)
    }

    /// Existing metric under `name`, or `metric` after registering it.
    pub fn get_or_register(&self, name: &str, metric: Arc<dyn Metric>) -> Arc<dyn Metric> {
        self.metrics.get_or_insert_with(name, move || metric)
    }

    /// Lazy variant of [`get_or_register`](Self::get_or_register): `factory`
    /// is only invoked when `name` is absent, and exactly once per winning
    /// race. It must not register into this same registry.
    pub fn get_or_register_with<F>(&self, name: &str, factory: F) -> Arc<dyn Metric>
    where
        F: FnOnce() -> Arc<dyn Metric>,
    {
        self.metrics.get_or_insert_with(name, factory)
    }

    /// Typed lazy get-or-register. Returns
    /// [`KindMismatch`](crate::MetricsError::KindMismatch) if `name` is held
    /// by a different kind of metric.
    pub fn get_or_register_typed<T, F>(&self, name: &str, factory: F) -> Result<Arc<T>>
    where
        T: Metric,
        F: FnOnce() -> T,
    {
        self.metrics.get_or_insert_typed(name, factory)
    }

    /// Register `metric` under `name`, failing with
    /// [`DuplicateMetric`](crate::MetricsError::DuplicateMetric) if the name is
    /// taken. The existing entry is left untouched.
    pub fn register(&self, name: &str, metric: Arc<dyn Metric>) -> Result<()> {
        self.metrics.insert(name, metric)?;
        tracing::debug!(metric = name, "registered metric");
        Ok(())
    }

    /// Like [`register`](Self::register) but treats a duplicate as a bug.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered.
    pub fn must_register(&self, name: &str, metric: Arc<dyn Metric>) {
        if let Err(e) = self.register(name, metric) {
            panic!("{e}");
        }
    }

    /// Remove `name`. Removing an absent name is a no-op.
    pub fn unregister(&self, name: &str) {
        if self.metrics.remove(name).is_some() {
            tracing::debug!(metric = name, "unregistered metric");
        }
    }

    pub fn unregister_all(&self) {
        let removed = self.metrics.clear();
        tracing::debug!(removed, "unregistered all metrics");
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.metrics.copy().into_keys().collect();
        names.sort();
        names
    }

    // ── Kind-specific helpers ───────────────────────────────────

    pub fn get_or_register_counter(&self, name: &str) -> Result<Arc<Counter>> {
        self.get_or_register_typed(name, Counter::new)
    }

    pub fn get_or_register_gauge(&self, name: &str) -> Result<Arc<Gauge>> {
        self.get_or_register_typed(name, Gauge::new)
    }

    pub fn get_or_register_gauge_f64(&self, name: &str) -> Result<Arc<GaugeFloat64>> {
        self.get_or_register_typed(name, GaugeFloat64::new)
    }

    /// Histogram over a reservoir sized by `config`, or a no-op histogram when
    /// metrics are disabled.
    pub fn get_or_register_histogram(
        &self,
        name: &str,
        config: &MetricsConfig,
    ) -> Result<Arc<Histogram>> {
        self.get_or_register_typed(name, || config.new_histogram())
    }

    pub fn get_or_register_multi_metric(
        &self,
        name: &str,
        tags: HashMap<String, String>,
        config: &MetricsConfig,
    ) -> Result<Arc<MultiMetric>> {
        self.get_or_register_typed(name, || config.new_multi_metric(tags))
    }

    /// Build a composite and register it, failing if `name` is taken.
    pub fn new_registered_multi_metric(
        &self,
        name: &str,
        tags: HashMap<String, String>,
        config: &MetricsConfig,
    ) -> Result<Arc<MultiMetric>> {
        let multi = Arc::new(config.new_multi_metric(tags));
        self.register(name, multi.clone())?;
        Ok(multi)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}
