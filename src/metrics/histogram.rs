use std::sync::Arc;

use super::percentiles::PercentileSet;
use super::sample::{NilSample, Sample, UniformSample};
use super::Metric;

/// Distribution of `i64` observations backed by a [`Sample`].
///
/// A histogram is a thin pass-through: `update` feeds the sample and every
/// statistic is read from it. Its snapshot is another `Histogram` backed by
/// the sample's frozen copy, so `update` on a snapshot panics.
#[derive(Clone)]
pub struct Histogram {
    sample: Arc<dyn Sample>,
}

impl Histogram {
    pub fn new(sample: Arc<dyn Sample>) -> Self {
        Self { sample }
    }

    /// Histogram over a uniform reservoir of `reservoir_size` slots.
    pub fn uniform(reservoir_size: usize) -> Self {
        Self::new(Arc::new(UniformSample::new(reservoir_size)))
    }

    /// Histogram that discards every observation.
    pub fn nil() -> Self {
        Self::new(Arc::new(NilSample))
    }

    pub fn update(&self, v: i64) {
        self.sample.update(v);
    }

    pub fn clear(&self) {
        self.sample.clear();
    }

    pub fn count(&self) -> i64 {
        self.sample.count()
    }

    pub fn max(&self) -> i64 {
        self.sample.max()
    }

    pub fn mean(&self) -> f64 {
        self.sample.mean()
    }

    pub fn min(&self) -> i64 {
        self.sample.min()
    }

    pub fn percentile(&self, p: f64) -> f64 {
        self.sample.percentile(p)
    }

    pub fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        self.sample.percentiles(ps)
    }

    pub fn size(&self) -> usize {
        self.sample.size()
    }

    pub fn std_dev(&self) -> f64 {
        self.sample.std_dev()
    }

    pub fn sum(&self) -> i64 {
        self.sample.sum()
    }

    pub fn values(&self) -> Vec<i64> {
        self.sample.values()
    }

    pub fn variance(&self) -> f64 {
        self.sample.variance()
    }

    pub fn snapshot(&self) -> Histogram {
        Histogram {
            sample: self.sample.snapshot(),
        }
    }

    pub fn summary(&self) -> PercentileSet {
        PercentileSet::from_sample(self.sample.as_ref())
    }
}

impl Metric for Histogram {
    fn snapshot(&self) -> Arc<dyn Metric> {
        Arc::new(Histogram::snapshot(self))
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("count", &self.count())
            .field("size", &self.size())
            .finish()
    }
}
