use std::sync::Arc;

use reservoir_metrics::{
    global, CounterSnapshot, Histogram, Metric, MetricsConfig, MultiMetric, Registry,
};
use tracing_subscriber::EnvFilter;

mod load_generator;

use load_generator::BenchConfig;

/// Synthetic load against the default registry, then a percentile report.
///
/// Usage: `reservoir-bench ['{"concurrency": 16, "duration_ms": 5000}']`
/// Reservoir sizing comes from `METRICS_ENABLED` / `METRICS_RESERVOIR_SIZE`.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── 1. Configuration ────────────────────────────────────────
    let metrics_config = MetricsConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "invalid metrics configuration");
        std::process::exit(1);
    });

    let bench = match std::env::args().nth(1) {
        Some(json) => BenchConfig::from_json(&json),
        None => Ok(BenchConfig::default()),
    }
    .unwrap_or_else(|e| {
        tracing::error!(error = %e, "invalid benchmark configuration");
        std::process::exit(1);
    });

    // ── 2. Default registry (single initialisation point) ──────
    let registry = global::init();

    tracing::info!(
        concurrency = bench.concurrency,
        duration_ms = bench.duration_ms,
        reservoir_size = metrics_config.reservoir_size,
        enabled = metrics_config.enabled,
        "starting load"
    );

    // ── 3. Generate load ────────────────────────────────────────
    if let Err(e) = load_generator::run(registry, &metrics_config, &bench).await {
        tracing::error!(error = %e, "load generation failed");
        std::process::exit(1);
    }

    // ── 4. Report ───────────────────────────────────────────────
    report(registry);
}

/// Logs every registered metric from a snapshot, in name order.
fn report(registry: &Registry) {
    let mut entries: Vec<(String, Arc<dyn Metric>)> = Vec::new();
    registry.each(|name, metric| entries.push((name.to_string(), metric.snapshot())));
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, snapshot) in entries {
        if let Some(counter) = snapshot.downcast_ref::<CounterSnapshot>() {
            tracing::info!(metric = %name, count = counter.count(), "counter");
        } else if let Some(multi) = snapshot.downcast_ref::<MultiMetric>() {
            report_composite(&name, multi);
        }
    }
}

fn report_composite(name: &str, multi: &MultiMetric) {
    let endpoint = multi.tags().get("endpoint").cloned().unwrap_or_default();
    let metrics = multi.metrics();

    let count_of = |key: &str| {
        metrics
            .get(key)
            .and_then(|m| m.downcast_ref::<CounterSnapshot>().map(|c| c.count()))
            .unwrap_or(0)
    };

    if let Some(latency) = metrics
        .get("latency_us")
        .and_then(|m| m.downcast_ref::<Histogram>())
    {
        let set = latency.summary();
        tracing::info!(
            metric = name,
            endpoint = %endpoint,
            requests = count_of("requests"),
            errors = count_of("errors"),
            samples = latency.size(),
            min = set.min,
            mean = set.mean,
            p50 = set.p50,
            p95 = set.p95,
            p99 = set.p99,
            max = set.max,
            "latency (μs)"
        );
    }
}
