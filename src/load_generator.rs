use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reservoir_metrics::{Counter, Histogram, MetricsConfig, MetricsError, MultiMetric, Registry};

/// Registry-wide request counter shared by every worker.
pub const TOTAL_REQUESTS: &str = "requests.total";

// ─── Configuration ───────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct BenchConfig {
    /// Number of concurrent Tokio tasks generating load
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// How long the run lasts (milliseconds)
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    /// Synthetic endpoints, each recorded into its own tagged composite
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
}

fn default_concurrency() -> u32 {
    8
}
fn default_duration_ms() -> u64 {
    2_000
}
fn default_endpoints() -> Vec<String> {
    vec![
        "GET /api/users/:id".into(),
        "GET /api/products/:id".into(),
        "POST /api/sessions".into(),
    ]
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            duration_ms: default_duration_ms(),
            endpoints: default_endpoints(),
        }
    }
}

impl BenchConfig {
    pub fn from_json(json: &str) -> Result<Self, MetricsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MetricsError> {
        if self.concurrency == 0 || self.concurrency > 500 {
            return Err(MetricsError::InvalidConfig(
                "concurrency must be between 1 and 500".into(),
            ));
        }
        if self.duration_ms == 0 || self.duration_ms > 300_000 {
            return Err(MetricsError::InvalidConfig(
                "duration_ms must be between 1 and 300000".into(),
            ));
        }
        if self.endpoints.is_empty() {
            return Err(MetricsError::InvalidConfig(
                "at least one endpoint is required".into(),
            ));
        }
        Ok(())
    }
}

/// Registry name of the composite for `endpoint`.
pub fn endpoint_metric_name(endpoint: &str) -> String {
    format!("endpoint.{endpoint}")
}

// ─── Public entry point ──────────────────────────────────────────

/// Spawns `concurrency` Tokio tasks that record synthetic traffic into
/// `registry` until the deadline.
pub async fn run(
    registry: &Registry,
    metrics: &MetricsConfig,
    bench: &BenchConfig,
) -> Result<(), MetricsError> {
    bench.validate()?;

    let deadline = Instant::now() + Duration::from_millis(bench.duration_ms);
    let total = registry.get_or_register_counter(TOTAL_REQUESTS)?;

    // Resolve every endpoint up front so workers only touch live handles.
    let mut targets = Vec::with_capacity(bench.endpoints.len());
    for endpoint in &bench.endpoints {
        let tags = HashMap::from([("endpoint".to_string(), endpoint.clone())]);
        let multi =
            registry.get_or_register_multi_metric(&endpoint_metric_name(endpoint), tags, metrics)?;
        targets.push(Target::resolve(&multi, metrics)?);
    }
    let targets = Arc::new(targets);

    let mut handles = Vec::with_capacity(bench.concurrency as usize);
    for worker_id in 0..bench.concurrency {
        let targets = targets.clone();
        let total = total.clone();

        handles.push(tokio::spawn(async move {
            worker(worker_id, targets, total, deadline).await;
        }));
    }

    // Wait for all workers to finish
    for h in handles {
        if let Err(e) = h.await {
            tracing::warn!(error = %e, "load worker exited abnormally");
        }
    }

    Ok(())
}

// ─── Per-endpoint handles ────────────────────────────────────────

struct Target {
    latency: Arc<Histogram>,
    requests: Arc<Counter>,
    errors: Arc<Counter>,
}

impl Target {
    fn resolve(multi: &MultiMetric, metrics: &MetricsConfig) -> Result<Self, MetricsError> {
        Ok(Self {
            latency: multi.get_or_add_typed("latency_us", || metrics.new_histogram())?,
            requests: multi.get_or_add_typed("requests", Counter::new)?,
            errors: multi.get_or_add_typed("errors", Counter::new)?,
        })
    }
}

// ─── Worker loop ─────────────────────────────────────────────────

async fn worker(id: u32, targets: Arc<Vec<Target>>, total: Arc<Counter>, deadline: Instant) {
    // Each worker gets its own deterministic RNG seeded uniquely.
    let mut rng = StdRng::seed_from_u64(1000 + id as u64);

    while Instant::now() < deadline {
        let idx = rng.gen_range(0..targets.len());
        let target = &targets[idx];

        // Mostly fast requests with an occasional slow tail
        let base = 50 + 40 * idx as i64;
        let latency_us = if rng.gen_bool(0.02) {
            base * 20 + rng.gen_range(0..5_000)
        } else {
            base + rng.gen_range(0..200)
        };

        target.latency.update(latency_us);
        target.requests.inc(1);
        if rng.gen_bool(0.01) {
            target.errors.inc(1);
        }
        total.inc(1);

        tokio::task::yield_now().await;
    }

    tracing::debug!(worker = id, "load worker finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bench_config_defaults() {
        let config = BenchConfig::from_json("{}").unwrap();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.endpoints.len(), 3);
    }

    #[test]
    fn bench_config_rejects_zero_workers() {
        assert!(BenchConfig::from_json(r#"{"concurrency": 0}"#).is_err());
        assert!(BenchConfig::from_json(r#"{"endpoints": []}"#).is_err());
    }

    #[tokio::test]
    async fn run_records_into_registry() {
        let registry = Registry::new();
        let bench = BenchConfig {
            concurrency: 4,
            duration_ms: 50,
            endpoints: vec!["a".into(), "b".into()],
        };
        run(&registry, &MetricsConfig::default(), &bench).await.unwrap();

        let total = registry.get_or_register_counter(TOTAL_REQUESTS).unwrap();
        assert!(total.count() > 0);

        let mut per_endpoint = 0;
        for name in ["a", "b"] {
            let multi = registry
                .get(&endpoint_metric_name(name))
                .and_then(reservoir_metrics::downcast_arc::<MultiMetric>)
                .unwrap();
            assert_eq!(multi.tags()["endpoint"], name);
            let requests = multi.get_or_add_typed("requests", Counter::new).unwrap();
            let latency = multi
                .get_or_add_typed("latency_us", Histogram::nil)
                .unwrap();
            assert_eq!(latency.count(), requests.count());
            per_endpoint += requests.count();
        }
        assert_eq!(per_endpoint, total.count());
    }

    #[tokio::test]
    async fn run_rejects_invalid_config() {
        let registry = Registry::new();
        let bench = BenchConfig {
            endpoints: vec![],
            ..BenchConfig::default()
        };
        let err = run(&registry, &MetricsConfig::default(), &bench)
            .await
            .unwrap_err();
        assert!(matches!(err, MetricsError::InvalidConfig(_)));
        assert!(registry.is_empty());
    }
}
