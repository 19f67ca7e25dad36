use serde::Serialize;

use super::sample::Sample;

/// Percentiles reported for every summary, as fractions in `[0, 1]`.
const QUANTILES: [f64; 5] = [0.5, 0.75, 0.95, 0.99, 0.999];

/// A complete percentile breakdown for one sample.
/// Serializable so a reporting layer can ship it as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileSet {
    pub count: i64,
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub std_dev: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
}

impl PercentileSet {
    /// Extract a full percentile set from a sample.
    /// Takes one snapshot first so every field describes the same instant.
    pub fn from_sample(sample: &dyn Sample) -> Self {
        let snap = sample.snapshot();
        if snap.size() == 0 {
            return Self {
                count: snap.count(),
                ..Self::empty()
            };
        }

        let ps = snap.percentiles(&QUANTILES);
        Self {
            count: snap.count(),
            min: snap.min(),
            max: snap.max(),
            mean: snap.mean(),
            std_dev: snap.std_dev(),
            p50: ps[0],
            p75: ps[1],
            p95: ps[2],
            p99: ps[3],
            p999: ps[4],
        }
    }

    /// All-zero placeholder used before any samples are recorded.
    pub fn empty() -> Self {
        Self {
            count: 0,
            min: 0,
            max: 0,
            mean: 0.0,
            std_dev: 0.0,
            p50: 0.0,
            p75: 0.0,
            p95: 0.0,
            p99: 0.0,
            p999: 0.0,
        }
    }

    /// Convenience: is this set backed by at least one observation?
    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}
