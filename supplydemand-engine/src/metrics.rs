//! Demand metrics
//!
//! Per-capability counters for how often a capability was demanded, how
//! those demands ended, and how long its supplier took. Recording is a side
//! channel and never changes what a demand returns.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counters for a single capability
#[derive(Debug)]
pub struct CapabilityMetrics {
    /// Name of the capability
    pub capability: String,

    /// Number of demands that found a supplier
    pub demand_count: AtomicU64,

    /// Number of demands whose supplier returned a value
    pub success_count: AtomicU64,

    /// Number of demands whose supplier returned an error
    pub failure_count: AtomicU64,

    /// Number of demands that found no supplier
    pub not_found_count: AtomicU64,

    /// Total time spent inside the supplier (nanoseconds)
    pub total_time_ns: AtomicU64,
}

impl CapabilityMetrics {
    pub fn new(capability: impl Into<String>) -> Self {
        CapabilityMetrics {
            capability: capability.into(),
            demand_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            not_found_count: AtomicU64::new(0),
            total_time_ns: AtomicU64::new(0),
        }
    }

    /// Record a finished supplier invocation
    pub fn record_completion(&self, duration: Duration, succeeded: bool) {
        self.demand_count.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.success_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
        self.total_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            capability: self.capability.clone(),
            demands: self.demand_count.load(Ordering::Relaxed),
            successes: self.success_count.load(Ordering::Relaxed),
            failures: self.failure_count.load(Ordering::Relaxed),
            not_found: self.not_found_count.load(Ordering::Relaxed),
            total_time_ns: self.total_time_ns.load(Ordering::Relaxed),
        }
    }
}

/// Metrics for every capability an engine has seen
#[derive(Debug, Default)]
pub struct DemandMetrics {
    capabilities: DashMap<String, Arc<CapabilityMetrics>>,
}

impl DemandMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the counters for a capability
    pub fn capability(&self, name: &str) -> Arc<CapabilityMetrics> {
        if let Some(existing) = self.capabilities.get(name) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .capabilities
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CapabilityMetrics::new(name)));
        Arc::clone(entry.value())
    }

    pub fn record_not_found(&self, name: &str) {
        self.capability(name).record_not_found();
    }

    /// Snapshots of all capabilities, sorted by name
    pub fn snapshot(&self) -> Vec<MetricsSnapshot> {
        let mut snapshots: Vec<MetricsSnapshot> = self
            .capabilities
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.capability.cmp(&b.capability));
        snapshots
    }

    pub fn reset(&self) {
        self.capabilities.clear();
    }
}

/// A point-in-time copy of one capability's counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub capability: String,
    pub demands: u64,
    pub successes: u64,
    pub failures: u64,
    pub not_found: u64,
    pub total_time_ns: u64,
}

impl MetricsSnapshot {
    /// Average time spent in the supplier
    pub fn avg_time(&self) -> Duration {
        if self.demands == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_time_ns / self.demands)
        }
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Capability: {}", self.capability)?;
        writeln!(
            f,
            "  Demands: {} | Ok: {} | Failed: {} | Not found: {}",
            self.demands, self.successes, self.failures, self.not_found
        )?;
        writeln!(
            f,
            "  Avg Time: {:.2}ms | Total Time: {:.2}ms",
            self.avg_time().as_secs_f64() * 1000.0,
            Duration::from_nanos(self.total_time_ns).as_secs_f64() * 1000.0
        )?;
        Ok(())
    }
}
