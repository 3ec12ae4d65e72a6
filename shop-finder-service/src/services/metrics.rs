//! Prometheus metrics for shop-finder-service.
//!
//! Recording helpers are no-ops until [`init_metrics`] has run, which keeps
//! handlers usable in tests without a registry.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Lookup outcomes
pub static SHOP_LOOKUPS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Provider metrics
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static GENAI_PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Extraction metrics
pub static JSON_EXTRACTION_FAILURES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup; later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let lookups = IntCounterVec::new(
        Opts::new("shop_lookups_total", "Total shop lookup requests by outcome"),
        &["outcome"],
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "Generative API latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider", "model"],
    )?;

    let provider_errors = IntCounterVec::new(
        Opts::new("genai_provider_errors_total", "Total generative API errors"),
        &["provider", "error_type"],
    )?;

    let extraction_failures = IntCounterVec::new(
        Opts::new(
            "json_extraction_failures_total",
            "Model replies from which no JSON could be extracted",
        ),
        &["kind"],
    )?;

    registry.register(Box::new(lookups.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(provider_errors.clone()))?;
    registry.register(Box::new(extraction_failures.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = SHOP_LOOKUPS_TOTAL.set(lookups);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = GENAI_PROVIDER_ERRORS_TOTAL.set(provider_errors);
    let _ = JSON_EXTRACTION_FAILURES_TOTAL.set(extraction_failures);

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Record the outcome of one `/find_ee_shops` request.
pub fn record_lookup(outcome: &str) {
    if let Some(counter) = SHOP_LOOKUPS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(counter) = GENAI_PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}

/// Record a failed extraction.
pub fn record_extraction_failure(kind: &str) {
    if let Some(counter) = JSON_EXTRACTION_FAILURES_TOTAL.get() {
        counter.with_label_values(&[kind]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_exposed_after_init() {
        init_metrics().unwrap();
        init_metrics().unwrap();

        record_lookup("ok");
        record_provider_error("gemini", "timeout");
        record_extraction_failure("not_found");

        let output = get_metrics();
        assert!(output.contains("shop_lookups_total"));
        assert!(output.contains("genai_provider_errors_total"));
        assert!(output.contains("json_extraction_failures_total"));
    }
}
