//! # llm-broker
//!
//! 多提供商 LLM 请求代理：统一接口下的限流、响应缓存与路由。
//!
//! A multi-provider LLM request broker: one uniform interface over several
//! upstream providers, with per-provider throughput limits and a bounded,
//! expiring response cache to avoid redundant upstream calls.
//!
//! ## Core Philosophy
//!
//! - **Provider-Agnostic**: upstream transport is an opaque capability
//!   behind the [`ProviderClient`] trait; no wire formats live here
//! - **Bounded by Construction**: every cache carries a byte budget and a
//!   TTL, every provider a sliding-window admission limit
//! - **Per-Provider Isolation**: limiter and cache state are locked per
//!   provider, never globally
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_broker::{GenerationRequest, ProviderConfig, RequestRouter};
//! use std::sync::Arc;
//!
//! # fn provider_client() -> Arc<dyn llm_broker::ProviderClient> { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> llm_broker::Result<()> {
//!     let router = RequestRouter::builder()
//!         .with_provider("anthropic", ProviderConfig::default())
//!         .with_provider("openai", ProviderConfig::default().with_requests_per_minute(100))
//!         .with_client(provider_client())
//!         .build()?;
//!
//!     let request = GenerationRequest::new("claude-3-sonnet-20240229", "Hello!");
//!     let response = router.generate(&request, None).await?;
//!     println!("{} (cached: {})", response.content, response.served_from_cache);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Request/response value types |
//! | [`cache`] | Cache key derivation and the bounded TTL + LRU store |
//! | [`resilience`] | Sliding-window rate limiting with burst allowance |
//! | [`routing`] | Model-to-provider selection table |
//! | [`provider`] | Upstream transport trait seam |
//! | [`telemetry`] | Fire-and-forget metrics sinks |
//! | [`config`] | Per-provider configuration |
//! | [`router`] | Request orchestration |

pub mod cache;
pub mod config;
pub mod provider;
pub mod resilience;
pub mod router;
pub mod routing;
pub mod telemetry;
pub mod types;

// Re-export main types for convenience
pub use cache::{CacheKey, ResponseCache};
pub use config::ProviderConfig;
pub use provider::{ProviderClient, ProviderOutput};
pub use resilience::{RateLimiter, RateLimiterConfig};
pub use router::{RequestRouter, RequestRouterBuilder, RouterSnapshot};
pub use routing::ModelRoutingTable;
pub use telemetry::{MetricsSink, RequestStatus};
pub use types::{GenerationRequest, GenerationResponse, TokenUsage};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{BoxError, Error, ErrorContext};
