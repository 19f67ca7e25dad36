use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{MetricsError, Result};
use crate::metrics::{Histogram, MultiMetric, NilSample, Sample, UniformSample};

/// Upper bound on reservoir capacity; each slot is one `i64`.
const MAX_RESERVOIR_SIZE: usize = 1 << 20;

// ─── MetricsConfig ───────────────────────────────────────────────

/// Switches and sizes used when constructing sampled metrics.
///
/// With `enabled = false` every constructor hands back a no-op variant, so
/// instrumented call sites never need to check whether metrics are on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Capacity of each uniform reservoir
    #[serde(default = "default_reservoir_size")]
    pub reservoir_size: usize,
}

fn default_enabled() -> bool {
    true
}
fn default_reservoir_size() -> usize {
    1028
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            reservoir_size: default_reservoir_size(),
        }
    }
}

impl MetricsConfig {
    /// Config with every constructor returning no-op metrics.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `METRICS_ENABLED` and `METRICS_RESERVOIR_SIZE`, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("METRICS_ENABLED") {
            config.enabled = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(MetricsError::InvalidConfig(format!(
                        "METRICS_ENABLED must be a boolean, got {other:?}"
                    )))
                }
            };
        }

        if let Some(raw) = lookup("METRICS_RESERVOIR_SIZE") {
            config.reservoir_size = raw.trim().parse().map_err(|_| {
                MetricsError::InvalidConfig(format!(
                    "METRICS_RESERVOIR_SIZE must be an integer, got {raw:?}"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reservoir_size == 0 || self.reservoir_size > MAX_RESERVOIR_SIZE {
            return Err(MetricsError::InvalidConfig(format!(
                "reservoir_size must be between 1 and {MAX_RESERVOIR_SIZE}"
            )));
        }
        Ok(())
    }

    // ── Constructors ────────────────────────────────────────────

    pub fn new_sample(&self) -> Arc<dyn Sample> {
        if self.enabled {
            Arc::new(UniformSample::new(self.reservoir_size))
        } else {
            Arc::new(NilSample)
        }
    }

    pub fn new_histogram(&self) -> Histogram {
        Histogram::new(self.new_sample())
    }

    pub fn new_multi_metric(&self, tags: HashMap<String, String>) -> MultiMetric {
        if self.enabled {
            MultiMetric::new(tags)
        } else {
            MultiMetric::nil()
        }
    }
}
