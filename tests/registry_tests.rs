use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use reservoir_metrics::{
    downcast_arc, Counter, CounterSnapshot, Gauge, GaugeFloat64, GaugeFloat64Snapshot,
    GaugeSnapshot, Histogram, Metric, MetricsConfig, MetricsError, MultiMetric, Registry, Sample,
    SampleSnapshot, UniformSample,
};

#[test]
fn test_registry_uniqueness() {
    let r = Registry::new();
    let a: Arc<dyn Metric> = Arc::new(Counter::new());
    let b: Arc<dyn Metric> = Arc::new(Counter::new());

    r.register("x", a.clone()).unwrap();
    match r.register("x", b) {
        Err(MetricsError::DuplicateMetric(name)) => assert_eq!(name, "x"),
        other => panic!("expected duplicate error, got {other:?}"),
    }
    assert!(Arc::ptr_eq(&r.get("x").unwrap(), &a));
}

#[test]
fn test_get_or_register_race() {
    const THREADS: usize = 16;

    let r = Arc::new(Registry::new());
    let constructed = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let r = Arc::clone(&r);
            let constructed = Arc::clone(&constructed);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                r.get_or_register_with("x", || {
                    constructed.fetch_add(1, Ordering::SeqCst);
                    Arc::new(Histogram::uniform(16))
                })
            })
        })
        .collect();

    let results: Vec<Arc<dyn Metric>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert_eq!(r.len(), 1);
    let stored = r.get("x").unwrap();
    for m in &results {
        assert!(Arc::ptr_eq(m, &stored));
    }
}

#[test]
fn test_typed_get_or_register_race() {
    const THREADS: usize = 16;

    let r = Arc::new(Registry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let r = Arc::clone(&r);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let c = r.get_or_register_counter("hits").unwrap();
                c.inc(1);
                c
            })
        })
        .collect();

    let counters: Vec<Arc<Counter>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for c in &counters {
        assert!(Arc::ptr_eq(c, &counters[0]));
    }
    assert_eq!(counters[0].count(), THREADS as i64);
}

#[test]
fn test_unregister_idempotence() {
    let r = Registry::new();
    r.unregister("missing");
    r.register("a", Arc::new(Counter::new())).unwrap();
    r.register("b", Arc::new(Gauge::new())).unwrap();
    r.unregister_all();

    let mut calls = 0;
    r.each(|_, _| calls += 1);
    assert_eq!(calls, 0);

    // Names are free again
    r.register("a", Arc::new(Gauge::new())).unwrap();
    assert!(r.get("a").unwrap().is::<Gauge>());
}

#[test]
fn test_each_sees_point_in_time_copy() {
    let r = Registry::new();
    for name in ["a", "b", "c"] {
        r.register(name, Arc::new(Counter::new())).unwrap();
    }
    let mut seen = Vec::new();
    r.each(|name, _| {
        seen.push(name.to_string());
        r.unregister_all();
    });
    // The copy was taken before the first callback ran.
    seen.sort();
    assert_eq!(seen, vec!["a", "b", "c"]);
    assert!(r.is_empty());
}

#[test]
fn test_composite_snapshot_dispatch() {
    let r = Registry::new();
    let config = MetricsConfig::default();
    let tags = HashMap::from([("endpoint".to_string(), "/users".to_string())]);
    let mm = r.get_or_register_multi_metric("users", tags, &config).unwrap();

    let c = mm.get_or_add_typed("counter", Counter::new).unwrap();
    let g = mm.get_or_add_typed("gauge", Gauge::new).unwrap();
    let gf = mm.get_or_add_typed("gauge_f64", GaugeFloat64::new).unwrap();
    let h = mm
        .get_or_add_typed("latency", || config.new_histogram())
        .unwrap();
    c.inc(1);
    g.update(47);
    gf.update(47.0);
    h.update(250);

    // Snapshot through the registry's generic capability
    let snapshot = r.get("users").unwrap().snapshot();
    let snapshot = downcast_arc::<MultiMetric>(snapshot).unwrap();

    c.inc(1);
    g.update(74);
    gf.update(74.0);
    h.update(999);

    let metrics = snapshot.metrics();
    assert_eq!(metrics.len(), 4);
    assert_eq!(
        metrics["counter"].downcast_ref::<CounterSnapshot>().unwrap().count(),
        1
    );
    assert_eq!(
        metrics["gauge"].downcast_ref::<GaugeSnapshot>().unwrap().value(),
        47
    );
    assert_eq!(
        metrics["gauge_f64"]
            .downcast_ref::<GaugeFloat64Snapshot>()
            .unwrap()
            .value(),
        47.0
    );
    let latency = metrics["latency"].downcast_ref::<Histogram>().unwrap();
    assert_eq!(latency.count(), 1);
    assert_eq!(latency.max(), 250);
    assert_eq!(snapshot.tags()["endpoint"], "/users");

    // Live container moved on
    assert_eq!(c.count(), 2);
    assert_eq!(h.count(), 2);
}

#[test]
fn test_composite_get_or_add_race() {
    const THREADS: usize = 12;

    let mm = Arc::new(MultiMetric::new(HashMap::new()));
    let constructed = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let mm = Arc::clone(&mm);
            let constructed = Arc::clone(&constructed);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                mm.get_or_add_with("errors", || {
                    constructed.fetch_add(1, Ordering::SeqCst);
                    Arc::new(Counter::new())
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    for m in &results {
        assert!(Arc::ptr_eq(m, &results[0]));
    }
}

#[test]
fn test_disabled_config_registers_no_op_metrics() {
    let r = Registry::new();
    let config = MetricsConfig::disabled();
    let h = r.get_or_register_histogram("latency", &config).unwrap();
    h.update(10);
    assert_eq!(h.count(), 0);
    assert_eq!(h.percentiles(&[0.5, 0.99]), vec![0.0, 0.0]);

    let mm = r
        .get_or_register_multi_metric("composite", HashMap::new(), &config)
        .unwrap();
    let c = mm.get_or_add_typed("c", Counter::new).unwrap();
    c.inc(1);
    assert!(mm.snapshot().metrics().is_empty());
}

#[test]
fn test_sample_registers_and_snapshots() {
    let r = Registry::new();
    let sample = Arc::new(UniformSample::new(10));
    r.register("s", sample.clone()).unwrap();
    for v in 1..=5 {
        sample.update(v);
    }

    let snapshot = r.get("s").unwrap().snapshot();
    let frozen = downcast_arc::<SampleSnapshot>(snapshot).unwrap();
    sample.update(6);
    sample.clear();

    assert_eq!(frozen.count(), 5);
    assert_eq!(frozen.values(), vec![1, 2, 3, 4, 5]);

    // Typed lookups hand back the same live sample.
    let again = r
        .get_or_register_typed("s", || UniformSample::new(10))
        .unwrap();
    assert!(Arc::ptr_eq(&again, &sample));

    let mm = MultiMetric::new(HashMap::new());
    let child = mm
        .get_or_add_typed("reservoir", || UniformSample::new(4))
        .unwrap();
    child.update(42);
    let mm_snapshot = mm.snapshot();
    let frozen_child = mm_snapshot.metrics()["reservoir"].clone();
    assert_eq!(
        frozen_child.downcast_ref::<SampleSnapshot>().unwrap().values(),
        vec![42]
    );
}
