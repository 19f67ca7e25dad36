use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::stats;

// ─── Public types ────────────────────────────────────────────────

/// A bounded, statistically representative selection of values from an
/// unbounded stream of observations.
///
/// `count()` is the number of observations ever seen; `size()` is how many of
/// them are currently retained and never exceeds the reservoir capacity.
pub trait Sample: Send + Sync {
    fn clear(&self);
    fn count(&self) -> i64;
    fn max(&self) -> i64;
    fn mean(&self) -> f64;
    fn min(&self) -> i64;
    fn percentile(&self, p: f64) -> f64;
    fn percentiles(&self, ps: &[f64]) -> Vec<f64>;
    fn size(&self) -> usize;
    /// Read-only copy taken under one critical section.
    fn snapshot(&self) -> Arc<dyn Sample>;
    fn std_dev(&self) -> f64;
    fn sum(&self) -> i64;
    fn update(&self, v: i64);
    /// Copy of the retained values; mutating it does not affect the sample.
    fn values(&self) -> Vec<i64>;
    fn variance(&self) -> f64;
}

// ─── NilSample ───────────────────────────────────────────────────

/// No-op sample used when metrics are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NilSample;

impl Sample for NilSample {
    fn clear(&self) {}

    fn count(&self) -> i64 {
        0
    }

    fn max(&self) -> i64 {
        0
    }

    fn mean(&self) -> f64 {
        0.0
    }

    fn min(&self) -> i64 {
        0
    }

    fn percentile(&self, _p: f64) -> f64 {
        0.0
    }

    fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        vec![0.0; ps.len()]
    }

    fn size(&self) -> usize {
        0
    }

    fn snapshot(&self) -> Arc<dyn Sample> {
        Arc::new(NilSample)
    }

    fn std_dev(&self) -> f64 {
        0.0
    }

    fn sum(&self) -> i64 {
        0
    }

    fn update(&self, _v: i64) {}

    fn values(&self) -> Vec<i64> {
        Vec::new()
    }

    fn variance(&self) -> f64 {
        0.0
    }
}

// ─── SampleSnapshot ──────────────────────────────────────────────

/// Frozen copy of another sample. Statistics are recomputed from the frozen
/// values on every call; `update` and `clear` panic.
#[derive(Debug, Clone)]
pub struct SampleSnapshot {
    count: i64,
    values: Vec<i64>,
}

impl SampleSnapshot {
    pub fn new(count: i64, values: Vec<i64>) -> Self {
        Self { count, values }
    }
}

impl Sample for SampleSnapshot {
    fn clear(&self) {
        panic!("clear called on a SampleSnapshot");
    }

    fn count(&self) -> i64 {
        self.count
    }

    fn max(&self) -> i64 {
        stats::max(&self.values)
    }

    fn mean(&self) -> f64 {
        stats::mean(&self.values)
    }

    fn min(&self) -> i64 {
        stats::min(&self.values)
    }

    fn percentile(&self, p: f64) -> f64 {
        stats::percentile(&self.values, p)
    }

    fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        stats::percentiles(&self.values, ps)
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn snapshot(&self) -> Arc<dyn Sample> {
        Arc::new(self.clone())
    }

    fn std_dev(&self) -> f64 {
        stats::std_dev(&self.values)
    }

    fn sum(&self) -> i64 {
        stats::sum(&self.values)
    }

    fn update(&self, _v: i64) {
        panic!("update called on a SampleSnapshot");
    }

    fn values(&self) -> Vec<i64> {
        self.values.clone()
    }

    fn variance(&self) -> f64 {
        stats::variance(&self.values)
    }
}

// ─── UniformSample ───────────────────────────────────────────────

/// Uniform reservoir sample using Vitter's Algorithm R.
///
/// Once `n >= capacity` observations have been seen, each of them is present
/// in the reservoir with probability `capacity / n`.
pub struct UniformSample {
    reservoir_size: usize,
    inner: Mutex<Inner>,
}

/// Everything guarded by the sample's lock. The RNG lives here too because
/// the replacement draw depends on `count` and must happen in the same
/// critical section as the increment.
struct Inner {
    count: i64,
    values: Vec<i64>,
    rng: StdRng,
}

impl UniformSample {
    pub fn new(reservoir_size: usize) -> Self {
        Self::with_rng(reservoir_size, StdRng::from_entropy())
    }

    /// Deterministic variant: the same seed and stream always yield the same
    /// reservoir.
    pub fn with_seed(reservoir_size: usize, seed: u64) -> Self {
        Self::with_rng(reservoir_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(reservoir_size: usize, rng: StdRng) -> Self {
        Self {
            reservoir_size,
            inner: Mutex::new(Inner {
                count: 0,
                values: Vec::with_capacity(reservoir_size),
                rng,
            }),
        }
    }

    pub fn reservoir_size(&self) -> usize {
        self.reservoir_size
    }

    /// Count and values copied in one critical section.
    pub fn freeze(&self) -> SampleSnapshot {
        let inner = self.inner.lock();
        SampleSnapshot::new(inner.count, inner.values.clone())
    }
}

impl std::fmt::Debug for UniformSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("UniformSample")
            .field("reservoir_size", &self.reservoir_size)
            .field("count", &inner.count)
            .field("size", &inner.values.len())
            .finish()
    }
}

impl Sample for UniformSample {
    fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.count = 0;
        inner.values = Vec::with_capacity(self.reservoir_size);
    }

    fn count(&self) -> i64 {
        self.inner.lock().count
    }

    fn max(&self) -> i64 {
        stats::max(&self.inner.lock().values)
    }

    fn mean(&self) -> f64 {
        stats::mean(&self.inner.lock().values)
    }

    fn min(&self) -> i64 {
        stats::min(&self.inner.lock().values)
    }

    fn percentile(&self, p: f64) -> f64 {
        stats::percentile(&self.inner.lock().values, p)
    }

    fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        stats::percentiles(&self.inner.lock().values, ps)
    }

    fn size(&self) -> usize {
        self.inner.lock().values.len()
    }

    fn snapshot(&self) -> Arc<dyn Sample> {
        Arc::new(self.freeze())
    }

    fn std_dev(&self) -> f64 {
        stats::std_dev(&self.inner.lock().values)
    }

    fn sum(&self) -> i64 {
        stats::sum(&self.inner.lock().values)
    }

    fn update(&self, v: i64) {
        let mut inner = self.inner.lock();
        inner.count += 1;
        if inner.values.len() < self.reservoir_size {
            inner.values.push(v);
        } else {
            // Draw over everything seen so far, not over the capacity.
            let count = inner.count;
            let r = inner.rng.gen_range(0..count) as usize;
            if r < inner.values.len() {
                inner.values[r] = v;
            }
        }
    }

    fn values(&self) -> Vec<i64> {
        self.inner.lock().values.clone()
    }

    fn variance(&self) -> f64 {
        stats::variance(&self.inner.lock().values)
    }
}

// ─── Registration ────────────────────────────────────────────────

// Samples can be registered directly; their registry snapshot is the frozen
// sample itself.

impl super::Metric for NilSample {
    fn snapshot(&self) -> Arc<dyn super::Metric> {
        Arc::new(NilSample)
    }
}

impl super::Metric for SampleSnapshot {
    fn snapshot(&self) -> Arc<dyn super::Metric> {
        Arc::new(self.clone())
    }
}

impl super::Metric for UniformSample {
    fn snapshot(&self) -> Arc<dyn super::Metric> {
        Arc::new(self.freeze())
    }
}
