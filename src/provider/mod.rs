//! 提供商客户端抽象：路由器与上游传输层之间的接口缝。
//!
//! # Provider Client Module
//!
//! The router treats upstream transport as an opaque capability behind the
//! [`ProviderClient`] trait. Wire formats, authentication and retry policy
//! all live behind this seam; the router only sequences admission, caching
//! and metrics around it.

use crate::error::BoxError;
use crate::types::{GenerationRequest, TokenUsage};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Raw output of one upstream provider call.
#[derive(Debug, Clone)]
pub struct ProviderOutput {
    /// Generated text.
    pub content: String,
    /// Exact token accounting, when the upstream reports it.
    pub usage: Option<TokenUsage>,
    /// Transport-level latency as observed by the client.
    pub latency: Duration,
}

impl ProviderOutput {
    pub fn new(content: impl Into<String>, latency: Duration) -> Self {
        Self {
            content: content.into(),
            usage: None,
            latency,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Upstream transport capability, implemented outside this crate.
///
/// Any failure is surfaced opaquely; the router wraps it as
/// [`Error::Provider`](crate::Error::Provider) without retrying.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Produce content for `request` under the named provider.
    ///
    /// `deadline` is a caller-supplied budget the implementation should
    /// honor; it is the only cancellation point in a request's lifecycle.
    async fn call(
        &self,
        provider: &str,
        request: &GenerationRequest,
        deadline: Option<Instant>,
    ) -> Result<ProviderOutput, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_builder() {
        let out = ProviderOutput::new("hello", Duration::from_millis(120))
            .with_usage(TokenUsage::new(3, 1));
        assert_eq!(out.content, "hello");
        assert_eq!(out.usage.unwrap().total_tokens, 4);
    }
}
