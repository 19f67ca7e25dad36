use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use super::Metric;

// ─── Counter ─────────────────────────────────────────────────────

/// Monotonic-by-convention `i64` counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, n: i64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn dec(&self, n: i64) {
        self.value.fetch_sub(n, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.value.store(0, Ordering::Relaxed);
    }

    pub fn count(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot(self.count())
    }
}

/// Frozen counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot(i64);

impl CounterSnapshot {
    pub fn count(&self) -> i64 {
        self.0
    }
}

// ─── Gauge ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> GaugeSnapshot {
        GaugeSnapshot(self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeSnapshot(i64);

impl GaugeSnapshot {
    pub fn value(&self) -> i64 {
        self.0
    }
}

// ─── GaugeFloat64 ────────────────────────────────────────────────

/// `f64` gauge, stored as raw bits so it stays lock-free.
#[derive(Debug, Default)]
pub struct GaugeFloat64 {
    bits: AtomicU64,
}

impl GaugeFloat64 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, v: f64) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> GaugeFloat64Snapshot {
        GaugeFloat64Snapshot(self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeFloat64Snapshot(f64);

impl GaugeFloat64Snapshot {
    pub fn value(&self) -> f64 {
        self.0
    }
}

// ─── Metric impls ────────────────────────────────────────────────

macro_rules! live_metric {
    ($($live:ty),*) => {
        $(impl Metric for $live {
            fn snapshot(&self) -> Arc<dyn Metric> {
                Arc::new(<$live>::snapshot(self))
            }
        })*
    };
}

macro_rules! frozen_metric {
    ($($frozen:ty),*) => {
        $(impl Metric for $frozen {
            fn snapshot(&self) -> Arc<dyn Metric> {
                Arc::new(*self)
            }
        })*
    };
}

live_metric!(Counter, Gauge, GaugeFloat64);
frozen_metric!(CounterSnapshot, GaugeSnapshot, GaugeFloat64Snapshot);
