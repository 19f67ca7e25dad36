pub mod histogram;
pub mod multi;
pub mod percentiles;
pub mod sample;
pub mod scalar;
pub(crate) mod set;
pub mod stats;

use std::any::Any;
use std::sync::Arc;

pub use histogram::Histogram;
pub use multi::MultiMetric;
pub use percentiles::PercentileSet;
pub use sample::{NilSample, Sample, SampleSnapshot, UniformSample};
pub use scalar::{
    Counter, CounterSnapshot, Gauge, GaugeFloat64, GaugeFloat64Snapshot, GaugeSnapshot,
};

// ─── Metric capability ───────────────────────────────────────────

/// Anything that can live in a [`Registry`](crate::Registry) or a
/// [`MultiMetric`].
///
/// The single required operation is `snapshot`: a read-only, point-in-time
/// copy that stays unchanged while the live metric keeps being updated.
pub trait Metric: AsAny + Send + Sync {
    fn snapshot(&self) -> Arc<dyn Metric>;
}

/// Type-erasure helpers so an `Arc<dyn Metric>` can be turned back into its
/// concrete kind. Implemented for every sized `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl dyn Metric {
    pub fn is<T: Metric>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Metric>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Recover the concrete metric behind a shared handle.
pub fn downcast_arc<T: Metric>(metric: Arc<dyn Metric>) -> Option<Arc<T>> {
    metric.into_any_arc().downcast::<T>().ok()
}

impl std::fmt::Debug for dyn Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Metric")
    }
}

/// Short kind name used in [`KindMismatch`](crate::MetricsError::KindMismatch).
pub(crate) fn kind_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
