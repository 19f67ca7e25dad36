//! Process-wide default registry.
//!
//! Library code should take a `&Registry` explicitly. This module exists for
//! the outermost application layer: [`init`] is the single initialisation
//! point, and the free functions below are thin wrappers over the registry it
//! installs.

use std::sync::{Arc, OnceLock};

use crate::error::Result;
use crate::metrics::Metric;
use crate::registry::Registry;

static DEFAULT_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Install the default registry. Later calls return the same instance.
pub fn init() -> &'static Registry {
    DEFAULT_REGISTRY.get_or_init(|| {
        tracing::debug!("default registry initialised");
        Registry::new()
    })
}

/// The default registry, initialising it on first use.
pub fn default_registry() -> &'static Registry {
    init()
}

pub fn each<F>(f: F)
where
    F: FnMut(&str, &Arc<dyn Metric>),
{
    default_registry().each(f)
}

pub fn get(name: &str) -> Option<Arc<dyn Metric>> {
    default_registry().get(name)
}

pub fn get_or_register(name: &str, metric: Arc<dyn Metric>) -> Arc<dyn Metric> {
    default_registry().get_or_register(name, metric)
}

pub fn get_or_register_with<F>(name: &str, factory: F) -> Arc<dyn Metric>
where
    F: FnOnce() -> Arc<dyn Metric>,
{
    default_registry().get_or_register_with(name, factory)
}

pub fn register(name: &str, metric: Arc<dyn Metric>) -> Result<()> {
    default_registry().register(name, metric)
}

/// # Panics
///
/// Panics if `name` is already registered.
pub fn must_register(name: &str, metric: Arc<dyn Metric>) {
    default_registry().must_register(name, metric)
}

pub fn unregister(name: &str) {
    default_registry().unregister(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Counter;

    #[test]
    fn init_returns_single_instance() {
        assert!(std::ptr::eq(init(), default_registry()));
    }

    #[test]
    fn wrappers_reach_default_registry() {
        // Unique names: other tests share this registry.
        register("global.wrappers.a", Arc::new(Counter::new())).unwrap();
        assert!(get("global.wrappers.a").is_some());
        assert!(register("global.wrappers.a", Arc::new(Counter::new())).is_err());

        let lazy = get_or_register_with("global.wrappers.b", || Arc::new(Counter::new()));
        let eager = get_or_register("global.wrappers.b", Arc::new(Counter::new()));
        assert!(Arc::ptr_eq(&lazy, &eager));

        let mut found = 0;
        each(|name, _| {
            if name.starts_with("global.wrappers.") {
                found += 1;
            }
        });
        assert_eq!(found, 2);

        unregister("global.wrappers.a");
        unregister("global.wrappers.b");
        assert!(get("global.wrappers.a").is_none());
    }
}
