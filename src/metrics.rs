//! Runtime metrics: cache hit/miss, transform, and error counters exposed
//! as a JSON summary at `/status` and in Prometheus text format at
//! `/metrics`.
//!
//! Backed by the `prometheus` crate's `IntCounter`/`Registry`, which
//! already carries correct `HELP`/`TYPE` lines and a text encoder rather
//! than hand-rolling the exposition format.

use prometheus::{IntCounter, Registry};

pub struct Metrics {
    pub cache_hits: IntCounter,
    pub cache_misses: IntCounter,
    pub transforms: IntCounter,
    pub errors: IntCounter,
    registry: Registry,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let cache_hits =
            IntCounter::new("iiif_cache_hits_total", "Total number of cache hits").unwrap();
        let cache_misses =
            IntCounter::new("iiif_cache_misses_total", "Total number of cache misses").unwrap();
        let transforms = IntCounter::new(
            "iiif_transforms_total",
            "Total number of image transformations",
        )
        .unwrap();
        let errors = IntCounter::new("iiif_errors_total", "Total number of request errors").unwrap();

        registry.register(Box::new(cache_hits.clone())).unwrap();
        registry.register(Box::new(cache_misses.clone())).unwrap();
        registry.register(Box::new(transforms.clone())).unwrap();
        registry.register(Box::new(errors.clone())).unwrap();

        Self { cache_hits, cache_misses, transforms, errors, registry }
    }

    /// Renders all registered counters in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf).expect("prometheus encoding is infallible for counters");
        String::from_utf8(buf).expect("prometheus text encoder emits valid utf-8")
    }

    pub fn hit_rate_percent(&self) -> f64 {
        let hits = self.cache_hits.get();
        let misses = self.cache_misses.get();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
