//! Observability for the predictor service
//!
//! Prometheus metrics rendered in text format on `GET /metrics`.

pub mod metrics;

pub use metrics::Metrics;
