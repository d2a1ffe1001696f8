//! 遥测模块：请求计数与时延的可插拔接收端。
//!
//! # Telemetry Module
//!
//! Fire-and-forget metrics emission. The router records counters and
//! durations through a [`MetricsSink`]; sink failures must never fail a
//! request, so the trait is infallible by contract.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`MetricsSink`] | Trait for metrics destinations |
//! | [`NoopMetricsSink`] | Default no-op sink (no collection) |
//! | [`InMemoryMetricsSink`] | Atomic counters, for tests and snapshots |
//! | [`TracingMetricsSink`] | Structured-log sink via `tracing` |

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Terminal status of one routed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Success,
    Error,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Success => "success",
            RequestStatus::Error => "error",
        }
    }
}

/// Metrics destination consumed, not owned, by the router.
pub trait MetricsSink: Send + Sync {
    /// Record one provider call attempt that reached the upstream.
    fn record_request(
        &self,
        provider: &str,
        model: &str,
        duration: Duration,
        tokens: u32,
        status: RequestStatus,
    );

    /// Record a response served from the cache.
    fn record_cache_hit(&self, provider: &str);

    /// Record an admission denial.
    fn record_rate_limited(&self, provider: &str);
}

/// No-op sink; the default when no collection is configured.
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record_request(&self, _: &str, _: &str, _: Duration, _: u32, _: RequestStatus) {}
    fn record_cache_hit(&self, _: &str) {}
    fn record_rate_limited(&self, _: &str) {}
}

/// Aggregated counters from an [`InMemoryMetricsSink`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsCounters {
    pub total_requests: u64,
    pub errors: u64,
    pub cached_responses: u64,
    pub rate_limited: u64,
    pub total_tokens: u64,
}

struct AtomicCounters {
    total_requests: AtomicU64,
    errors: AtomicU64,
    cached_responses: AtomicU64,
    rate_limited: AtomicU64,
    total_tokens: AtomicU64,
}

impl AtomicCounters {
    fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            cached_responses: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            total_tokens: AtomicU64::new(0),
        }
    }

    fn to_counters(&self) -> MetricsCounters {
        MetricsCounters {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            cached_responses: self.cached_responses.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            total_tokens: self.total_tokens.load(Ordering::Relaxed),
        }
    }
}

/// In-memory sink backed by atomic counters.
pub struct InMemoryMetricsSink {
    counters: Arc<AtomicCounters>,
}

impl InMemoryMetricsSink {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(AtomicCounters::new()),
        }
    }

    pub fn counters(&self) -> MetricsCounters {
        self.counters.to_counters()
    }
}

impl Default for InMemoryMetricsSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSink for InMemoryMetricsSink {
    fn record_request(
        &self,
        _provider: &str,
        _model: &str,
        _duration: Duration,
        tokens: u32,
        status: RequestStatus,
    ) {
        self.counters.total_requests.fetch_add(1, Ordering::Relaxed);
        self.counters
            .total_tokens
            .fetch_add(tokens as u64, Ordering::Relaxed);
        if status == RequestStatus::Error {
            self.counters.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_cache_hit(&self, _provider: &str) {
        self.counters
            .cached_responses
            .fetch_add(1, Ordering::Relaxed);
    }

    fn record_rate_limited(&self, _provider: &str) {
        self.counters.rate_limited.fetch_add(1, Ordering::Relaxed);
    }
}

/// Structured-log sink for debugging and lightweight deployments.
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record_request(
        &self,
        provider: &str,
        model: &str,
        duration: Duration,
        tokens: u32,
        status: RequestStatus,
    ) {
        tracing::info!(
            provider,
            model,
            duration_ms = duration.as_millis() as u64,
            tokens,
            status = status.as_str(),
            "request completed"
        );
    }

    fn record_cache_hit(&self, provider: &str) {
        tracing::debug!(provider, "cache hit");
    }

    fn record_rate_limited(&self, provider: &str) {
        tracing::warn!(provider, "rate limited");
    }
}

static GLOBAL_SINK: once_cell::sync::Lazy<RwLock<Arc<dyn MetricsSink>>> =
    once_cell::sync::Lazy::new(|| RwLock::new(Arc::new(NoopMetricsSink)));

/// Returns the globally configured metrics sink.
pub fn get_metrics_sink() -> Arc<dyn MetricsSink> {
    GLOBAL_SINK.read().unwrap().clone()
}

/// Sets the global metrics sink.
pub fn set_metrics_sink(sink: Arc<dyn MetricsSink>) {
    *GLOBAL_SINK.write().unwrap() = sink;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_sink_counts() {
        let sink = InMemoryMetricsSink::new();
        sink.record_request(
            "anthropic",
            "claude-3-haiku",
            Duration::from_millis(80),
            12,
            RequestStatus::Success,
        );
        sink.record_request(
            "anthropic",
            "claude-3-haiku",
            Duration::from_millis(10),
            0,
            RequestStatus::Error,
        );
        sink.record_cache_hit("anthropic");
        sink.record_rate_limited("openai");

        let counters = sink.counters();
        assert_eq!(counters.total_requests, 2);
        assert_eq!(counters.errors, 1);
        assert_eq!(counters.cached_responses, 1);
        assert_eq!(counters.rate_limited, 1);
        assert_eq!(counters.total_tokens, 12);
    }

    #[test]
    fn test_global_sink_swap() {
        let sink = Arc::new(InMemoryMetricsSink::new());
        set_metrics_sink(sink.clone());
        get_metrics_sink().record_cache_hit("anthropic");
        assert_eq!(sink.counters().cached_responses, 1);
        set_metrics_sink(Arc::new(NoopMetricsSink));
    }
}
