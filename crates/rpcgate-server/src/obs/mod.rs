//! Lightweight in-process metrics.
//!
//! Counters, gauges and histograms are stored as atomics behind `DashMap`
//! label maps and rendered in Prometheus text format by the `/metrics` route.

pub mod metrics;

pub use metrics::ServerMetrics;
