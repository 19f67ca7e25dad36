//! In-process metrics: reservoir-sampled histograms, scalar counters and
//! gauges, tagged composites, and a concurrent registry to hold them.
//!
//! ```
//! use std::sync::Arc;
//! use reservoir_metrics::{MetricsConfig, Registry};
//!
//! let registry = Registry::new();
//! let config = MetricsConfig::default();
//!
//! let latency = registry.get_or_register_histogram("latency_us", &config).unwrap();
//! for v in [120, 80, 310] {
//!     latency.update(v);
//! }
//!
//! let snapshot = latency.snapshot();
//! latency.update(10_000);
//! assert_eq!(snapshot.count(), 3);
//! assert_eq!(snapshot.max(), 310);
//! ```

pub mod config;
pub mod error;
pub mod global;
pub mod metrics;
pub mod registry;

pub use config::MetricsConfig;
pub use error::{MetricsError, Result};
pub use metrics::{
    downcast_arc, Counter, CounterSnapshot, Gauge, GaugeFloat64, GaugeFloat64Snapshot,
    GaugeSnapshot, Histogram, Metric, MultiMetric, NilSample, PercentileSet, Sample,
    SampleSnapshot, UniformSample,
};
pub use registry::Registry;
