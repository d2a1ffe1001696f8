//! Generation response value type.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Exact token accounting as reported by an upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A response produced for a single [`GenerationRequest`](super::GenerationRequest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text.
    pub content: String,
    /// Model that produced the content (echoes the request).
    pub model: String,
    /// Tokens consumed; a whitespace word-count approximation when the
    /// upstream does not report exact usage.
    pub tokens_used: u32,
    /// Wall-clock duration of the producing call, in seconds.
    pub response_time_seconds: f64,
    /// Production timestamp.
    pub produced_at: SystemTime,
    /// True only when this response was returned from the cache, never on
    /// first production.
    pub served_from_cache: bool,
}

impl GenerationResponse {
    pub fn new(
        content: impl Into<String>,
        model: impl Into<String>,
        tokens_used: u32,
        response_time_seconds: f64,
    ) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            tokens_used,
            response_time_seconds,
            produced_at: SystemTime::now(),
            served_from_cache: false,
        }
    }

    /// Approximate token usage for content without exact upstream accounting.
    pub fn approximate_tokens(content: &str) -> u32 {
        content.split_whitespace().count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response_is_not_cached() {
        let resp = GenerationResponse::new("hi there", "gpt-4o", 2, 0.5);
        assert!(!resp.served_from_cache);
        assert_eq!(resp.tokens_used, 2);
    }

    #[test]
    fn test_approximate_tokens_counts_words() {
        assert_eq!(GenerationResponse::approximate_tokens("one two  three"), 3);
        assert_eq!(GenerationResponse::approximate_tokens(""), 0);
    }

    #[test]
    fn test_token_usage_totals() {
        let usage = TokenUsage::new(10, 32);
        assert_eq!(usage.total_tokens, 42);
    }
}
