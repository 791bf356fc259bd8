//! Performance metrics
//!
//! Latency and throughput tracking. All mutable collections live under a
//! single `RwLock` to avoid acquiring multiple locks per observation;
//! lock-free atomics cover the plain counters.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Instant;

struct MetricsInner {
    /// Rolling latency window in milliseconds
    latencies: VecDeque<f64>,
}

/// Performance metrics collector
pub struct PerformanceMetrics {
    window_size: usize,
    inner: RwLock<MetricsInner>,
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    start_time: Instant,
}

impl PerformanceMetrics {
    /// Create a new metrics collector with the given rolling window size
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            inner: RwLock::new(MetricsInner {
                latencies: VecDeque::with_capacity(window_size),
            }),
            total_requests: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a latency observation
    pub fn record_latency(&self, latency_ms: f64) {
        if let Ok(mut inner) = self.inner.write() {
            inner.latencies.push_back(latency_ms);
            if inner.latencies.len() > self.window_size {
                inner.latencies.pop_front();
            }
        }
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an error
    pub fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Total requests observed
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Total errors observed
    pub fn total_errors(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }

    /// Mean latency over the rolling window, in milliseconds
    pub fn avg_latency(&self) -> f64 {
        match self.inner.read() {
            Ok(inner) if !inner.latencies.is_empty() => {
                inner.latencies.iter().sum::<f64>() / inner.latencies.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Latency percentile over the rolling window, in milliseconds
    pub fn latency_percentile(&self, pct: f64) -> f64 {
        match self.inner.read() {
            Ok(inner) if !inner.latencies.is_empty() => {
                let mut sorted: Vec<f64> = inner.latencies.iter().copied().collect();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let idx = ((pct / 100.0) * (sorted.len() - 1) as f64).round() as usize;
                sorted[idx.min(sorted.len() - 1)]
            }
            _ => 0.0,
        }
    }

    /// Requests per second since collector creation
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_requests() as f64 / elapsed
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_average() {
        let metrics = PerformanceMetrics::new(10);
        metrics.record_latency(10.0);
        metrics.record_latency(20.0);
        assert_eq!(metrics.total_requests(), 2);
        assert!((metrics.avg_latency() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_eviction() {
        let metrics = PerformanceMetrics::new(2);
        metrics.record_latency(100.0);
        metrics.record_latency(10.0);
        metrics.record_latency(20.0);
        // The 100.0 observation fell out of the window
        assert!((metrics.avg_latency() - 15.0).abs() < 1e-9);
        assert_eq!(metrics.total_requests(), 3);
    }

    #[test]
    fn test_percentile() {
        let metrics = PerformanceMetrics::new(100);
        for i in 1..=100 {
            metrics.record_latency(i as f64);
        }
        assert!(metrics.latency_percentile(50.0) >= 49.0);
        assert!(metrics.latency_percentile(99.0) >= 98.0);
    }

    #[test]
    fn test_errors() {
        let metrics = PerformanceMetrics::new(10);
        metrics.record_error();
        assert_eq!(metrics.total_errors(), 1);
    }
}
