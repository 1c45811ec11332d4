//! Prometheus metrics definitions for the predictor service
//!
//! All metrics use the `nexthour_` prefix.

use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the inference service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Successful predictions by confidence tier
    pub predictions_total: CounterVec,
    /// Failed predictions by failure kind
    pub prediction_failures_total: CounterVec,
    /// Time spent in the core pipeline per observation
    pub inference_latency_seconds: Histogram,
    /// 1 when a fitted pair is installed, 0 otherwise
    pub model_loaded: GenericGauge<AtomicF64>,
    /// Installed models by source
    pub model_installs_total: CounterVec,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new(
                "nexthour_predictions_total",
                "Total predictions by confidence tier",
            ),
            &["confidence"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_failures_total = CounterVec::new(
            Opts::new(
                "nexthour_prediction_failures_total",
                "Total failed predictions by kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(prediction_failures_total.clone()))?;

        let inference_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "nexthour_inference_latency_seconds",
                "Core pipeline latency per observation in seconds",
            )
            .buckets(vec![
                0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05,
            ]),
        )?;
        registry.register(Box::new(inference_latency_seconds.clone()))?;

        let model_loaded = Gauge::with_opts(Opts::new(
            "nexthour_model_loaded",
            "Model status (0=unavailable, 1=loaded)",
        ))?;
        registry.register(Box::new(model_loaded.clone()))?;

        let model_installs_total = CounterVec::new(
            Opts::new("nexthour_model_installs_total", "Installed models by source"),
            &["source"],
        )?;
        registry.register(Box::new(model_installs_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            prediction_failures_total,
            inference_latency_seconds,
            model_loaded,
            model_installs_total,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_predictions(&self, confidence: &str) {
        self.predictions_total
            .with_label_values(&[confidence])
            .inc();
    }

    pub fn inc_failures(&self, kind: &str) {
        self.prediction_failures_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn observe_latency(&self, seconds: f64) {
        self.inference_latency_seconds.observe(seconds);
    }

    pub fn set_model_loaded(&self, loaded: bool) {
        self.model_loaded.set(if loaded { 1.0 } else { 0.0 });
    }

    pub fn inc_installs(&self, source: &str) {
        self.model_installs_total.with_label_values(&[source]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.set_model_loaded(false);
        assert!(metrics.render().contains("nexthour_"));
    }

    #[test]
    fn test_model_loaded_gauge() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.set_model_loaded(true);
        let output = metrics.render();
        assert!(output.contains("nexthour_model_loaded 1"));
    }

    #[test]
    fn test_prediction_counters() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_predictions("High");
        metrics.inc_failures("rejected");
        let output = metrics.render();
        assert!(output.contains("nexthour_predictions_total"));
        assert!(output.contains("High"));
        assert!(output.contains("nexthour_prediction_failures_total"));
    }
}
