//! Performance monitoring
//!
//! Latency and throughput tracking for the inference service.

mod metrics;

pub use metrics::PerformanceMetrics;
