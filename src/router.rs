//! 请求路由器：缓存、限流与上游调用的编排核心。
//!
//! # Request Router Module
//!
//! [`RequestRouter`] sequences one generation request through cache lookup,
//! provider selection, rate-limit admission, the upstream call, cache
//! population and metrics emission.
//!
//! Lifecycle of one request:
//!
//! ```text
//! Submitted -> CacheChecked -> (hit)  Done
//!                           -> (miss) RateChecked -> (denied)   Failed
//!                                                 -> (admitted) Calling -> (error)   Failed
//!                                                                       -> (success) Cached -> Done
//! ```
//!
//! Provider state lives in a map constructed once at build time; only the
//! values' internal limiter/cache state mutates afterwards, each behind its
//! own per-provider lock.

use crate::cache::{CacheKey, CacheSnapshot, ResponseCache};
use crate::config::ProviderConfig;
use crate::error::{Error, ErrorContext};
use crate::provider::ProviderClient;
use crate::resilience::{RateLimiter, RateLimiterConfig, RateLimiterSnapshot};
use crate::routing::ModelRoutingTable;
use crate::telemetry::{MetricsSink, RequestStatus};
use crate::types::{GenerationRequest, GenerationResponse};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

struct ProviderState {
    limiter: RateLimiter,
    cache: Option<ResponseCache>,
}

impl ProviderState {
    fn from_config(cfg: &ProviderConfig) -> Self {
        let limiter = RateLimiter::new(RateLimiterConfig::new(
            cfg.requests_per_minute,
            cfg.burst_capacity,
        ));
        let cache = if cfg.caching_enabled {
            Some(ResponseCache::with_mb_budget(cfg.max_size_mb, cfg.ttl_minutes))
        } else {
            None
        };
        Self { limiter, cache }
    }
}

/// Point-in-time state of one provider's limiter and cache.
#[derive(Debug, Clone)]
pub struct ProviderSnapshot {
    pub rate_limiter: RateLimiterSnapshot,
    pub cache: Option<CacheSnapshot>,
}

/// Point-in-time state of the whole router, keyed by provider name.
#[derive(Debug, Clone)]
pub struct RouterSnapshot {
    pub providers: HashMap<String, ProviderSnapshot>,
}

/// Builder for [`RequestRouter`].
///
/// Keep this surface area small and predictable (developer-friendly).
pub struct RequestRouterBuilder {
    providers: HashMap<String, ProviderConfig>,
    routes: ModelRoutingTable,
    client: Option<Arc<dyn ProviderClient>>,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl RequestRouterBuilder {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            routes: ModelRoutingTable::default(),
            client: None,
            metrics: None,
        }
    }

    /// Register a provider under `name` with explicit limits.
    pub fn with_provider(mut self, name: impl Into<String>, config: ProviderConfig) -> Self {
        self.providers.insert(name.into(), config);
        self
    }

    /// Register a provider with default limits and caching.
    pub fn with_default_provider(self, name: impl Into<String>) -> Self {
        self.with_provider(name, ProviderConfig::default())
    }

    /// Replace the default model-to-provider routing table.
    pub fn with_routes(mut self, routes: ModelRoutingTable) -> Self {
        self.routes = routes;
        self
    }

    /// Set the upstream transport capability. Required.
    pub fn with_client(mut self, client: Arc<dyn ProviderClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Inject a metrics sink. Defaults to the process-global sink.
    pub fn with_metrics(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    pub fn build(self) -> Result<RequestRouter> {
        let client = self.client.ok_or_else(|| {
            Error::configuration_with_context(
                "a ProviderClient is required",
                ErrorContext::new()
                    .with_field_path("client")
                    .with_source("router_builder"),
            )
        })?;
        if self.providers.is_empty() {
            return Err(Error::configuration_with_context(
                "at least one provider must be configured",
                ErrorContext::new()
                    .with_field_path("providers")
                    .with_source("router_builder"),
            ));
        }

        let providers = self
            .providers
            .iter()
            .map(|(name, cfg)| (name.clone(), ProviderState::from_config(cfg)))
            .collect();

        Ok(RequestRouter {
            providers,
            routes: self.routes,
            client,
            metrics: self
                .metrics
                .unwrap_or_else(crate::telemetry::get_metrics_sink),
        })
    }
}

impl Default for RequestRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Brokers generation requests across configured providers.
///
/// Holds one [`RateLimiter`] and optional [`ResponseCache`] per provider,
/// plus references to the external [`ProviderClient`] and [`MetricsSink`]
/// collaborators. Safe to share across tasks behind an `Arc`.
pub struct RequestRouter {
    providers: HashMap<String, ProviderState>,
    routes: ModelRoutingTable,
    client: Arc<dyn ProviderClient>,
    metrics: Arc<dyn MetricsSink>,
}

impl std::fmt::Debug for RequestRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRouter")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl RequestRouter {
    pub fn builder() -> RequestRouterBuilder {
        RequestRouterBuilder::new()
    }

    /// Generate a response for `request`, optionally pinned to a provider.
    ///
    /// With an explicit provider, the cache is consulted first and a hit
    /// returns immediately without consuming a rate-limit slot. Otherwise
    /// the routing table selects a provider from the model identifier.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        provider: Option<&str>,
    ) -> Result<GenerationResponse> {
        self.generate_with_deadline(request, provider, None).await
    }

    /// Like [`generate`](Self::generate), threading a caller deadline into
    /// the provider call. Limiter and cache mutation always run to
    /// completion; only the upstream call observes the deadline.
    pub async fn generate_with_deadline(
        &self,
        request: &GenerationRequest,
        provider: Option<&str>,
        deadline: Option<Instant>,
    ) -> Result<GenerationResponse> {
        let start = Instant::now();

        // Cache first: a hit bypasses rate limiting entirely.
        if let Some(name) = provider {
            let state = self.provider_state(name)?;
            if let Some(cache) = &state.cache {
                if let Some(hit) = cache.get(&CacheKey::derive(request)) {
                    self.metrics.record_cache_hit(name);
                    tracing::debug!(provider = name, model = %request.model, "cache hit");
                    return Ok(hit);
                }
            }
        }

        let provider = match provider {
            Some(name) => name,
            None => self.routes.select(&request.model),
        };
        let state = self.provider_state(provider)?;

        if !state.limiter.try_acquire().await {
            self.metrics.record_rate_limited(provider);
            tracing::warn!(provider, model = %request.model, "rate limited");
            return Err(Error::rate_limited(provider));
        }

        let output = match self.client.call(provider, request, deadline).await {
            Ok(output) => output,
            Err(cause) => {
                let elapsed = start.elapsed();
                self.metrics.record_request(
                    provider,
                    &request.model,
                    elapsed,
                    0,
                    RequestStatus::Error,
                );
                tracing::error!(provider, model = %request.model, error = %cause, "provider call failed");
                return Err(Error::provider(provider, cause));
            }
        };

        let elapsed = start.elapsed();
        let tokens_used = output
            .usage
            .map(|u| u.total_tokens)
            .unwrap_or_else(|| GenerationResponse::approximate_tokens(&output.content));
        let response = GenerationResponse::new(
            output.content,
            request.model.clone(),
            tokens_used,
            elapsed.as_secs_f64(),
        );

        if let Some(cache) = &state.cache {
            cache.put(CacheKey::derive(request), response.clone());
        }

        self.metrics.record_request(
            provider,
            &request.model,
            elapsed,
            tokens_used,
            RequestStatus::Success,
        );
        tracing::info!(
            provider,
            model = %request.model,
            duration_ms = elapsed.as_millis() as u64,
            tokens = tokens_used,
            "generated response"
        );

        Ok(response)
    }

    /// Restore one provider's burst allowance to full capacity.
    pub async fn reset_burst(&self, provider: &str) -> Result<()> {
        self.provider_state(provider)?.limiter.reset_burst().await;
        Ok(())
    }

    /// Restore every provider's burst allowance; typically driven by an
    /// external scheduler on a business-defined cadence.
    pub async fn reset_all_bursts(&self) {
        for state in self.providers.values() {
            state.limiter.reset_burst().await;
        }
    }

    /// Configured provider names, in no particular order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Current cache occupancy for one provider, in megabytes.
    pub fn cache_size_mb(&self, provider: &str) -> Result<Option<f64>> {
        let state = self.provider_state(provider)?;
        Ok(state.cache.as_ref().map(ResponseCache::current_size_mb))
    }

    /// Point-in-time limiter and cache state for every provider.
    pub async fn snapshot(&self) -> RouterSnapshot {
        let mut providers = HashMap::new();
        for (name, state) in &self.providers {
            providers.insert(
                name.clone(),
                ProviderSnapshot {
                    rate_limiter: state.limiter.snapshot().await,
                    cache: state.cache.as_ref().map(ResponseCache::snapshot),
                },
            );
        }
        RouterSnapshot { providers }
    }

    fn provider_state(&self, name: &str) -> Result<&ProviderState> {
        self.providers
            .get(name)
            .ok_or_else(|| Error::invalid_provider(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderOutput;
    use crate::telemetry::InMemoryMetricsSink;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EchoClient {
        calls: AtomicUsize,
    }

    impl EchoClient {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProviderClient for EchoClient {
        async fn call(
            &self,
            provider: &str,
            request: &GenerationRequest,
            _deadline: Option<Instant>,
        ) -> std::result::Result<ProviderOutput, crate::error::BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderOutput::new(
                format!("{} echoes: {}", provider, request.prompt),
                Duration::from_millis(1),
            ))
        }
    }

    fn router_with(client: Arc<dyn ProviderClient>) -> RequestRouter {
        RequestRouter::builder()
            .with_default_provider("anthropic")
            .with_default_provider("openai")
            .with_default_provider("huggingface")
            .with_client(client)
            .with_metrics(Arc::new(InMemoryMetricsSink::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_client() {
        let err = RequestRouter::builder()
            .with_default_provider("anthropic")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_build_requires_providers() {
        let err = RequestRouter::builder()
            .with_client(EchoClient::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let router = router_with(EchoClient::new());
        let request = GenerationRequest::new("gpt-4o", "hi");
        let err = router.generate(&request, Some("mystery")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidProvider { name } if name == "mystery"));
    }

    #[tokio::test]
    async fn test_routing_by_model_marker() {
        let client = EchoClient::new();
        let router = router_with(client);
        let request = GenerationRequest::new("claude-3-sonnet-20240229", "hi")
            .with_max_tokens(100);
        let response = router.generate(&request, None).await.unwrap();
        assert!(response.content.starts_with("anthropic echoes:"));
    }

    #[tokio::test]
    async fn test_miss_then_hit_with_identical_content() {
        let client = EchoClient::new();
        let router = router_with(client.clone());
        let request = GenerationRequest::new("claude-3-haiku", "tell me a joke");

        let first = router.generate(&request, Some("anthropic")).await.unwrap();
        assert!(!first.served_from_cache);
        let second = router.generate(&request, Some("anthropic")).await.unwrap();
        assert!(second.served_from_cache);
        assert_eq!(first.content, second.content);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_bypasses_rate_limiting() {
        let client = EchoClient::new();
        let router = RequestRouter::builder()
            .with_provider(
                "anthropic",
                ProviderConfig::default()
                    .with_requests_per_minute(1)
                    .with_burst_capacity(0),
            )
            .with_client(client)
            .with_metrics(Arc::new(InMemoryMetricsSink::new()))
            .build()
            .unwrap();
        let request = GenerationRequest::new("claude-3-haiku", "hi");

        // One admission fills the window; every later hit must come from
        // the cache without touching the limiter.
        router.generate(&request, Some("anthropic")).await.unwrap();
        for _ in 0..5 {
            let hit = router.generate(&request, Some("anthropic")).await.unwrap();
            assert!(hit.served_from_cache);
        }
        let snap = router.snapshot().await;
        let provider = &snap.providers["anthropic"];
        assert_eq!(provider.rate_limiter.requests_in_window, 1);
        assert_eq!(provider.rate_limiter.burst_tokens, 0);
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_and_reset() {
        let metrics = Arc::new(InMemoryMetricsSink::new());
        let router = RequestRouter::builder()
            .with_provider(
                "openai",
                ProviderConfig::default()
                    .with_requests_per_minute(2)
                    .with_burst_capacity(1)
                    .with_caching_enabled(false),
            )
            .with_client(EchoClient::new())
            .with_metrics(metrics.clone())
            .build()
            .unwrap();
        let request = GenerationRequest::new("gpt-4o", "hi");

        for _ in 0..3 {
            router.generate(&request, Some("openai")).await.unwrap();
        }
        let err = router.generate(&request, Some("openai")).await.unwrap_err();
        assert!(matches!(err, Error::RateLimitExceeded { provider } if provider == "openai"));
        assert_eq!(metrics.counters().rate_limited, 1);

        router.reset_burst("openai").await.unwrap();
        router.generate(&request, Some("openai")).await.unwrap();
    }

    #[tokio::test]
    async fn test_caching_disabled_calls_upstream_every_time() {
        let client = EchoClient::new();
        let router = RequestRouter::builder()
            .with_provider(
                "openai",
                ProviderConfig::default().with_caching_enabled(false),
            )
            .with_client(client.clone())
            .with_metrics(Arc::new(InMemoryMetricsSink::new()))
            .build()
            .unwrap();
        let request = GenerationRequest::new("gpt-4o", "hi");

        for _ in 0..3 {
            let response = router.generate(&request, Some("openai")).await.unwrap();
            assert!(!response.served_from_cache);
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
        assert!(router.cache_size_mb("openai").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tokens_approximated_from_word_count() {
        let router = router_with(EchoClient::new());
        let request = GenerationRequest::new("gpt-4o", "one two three");
        let response = router.generate(&request, Some("openai")).await.unwrap();
        // "openai echoes: one two three" -> 5 words.
        assert_eq!(response.tokens_used, 5);
    }
}
