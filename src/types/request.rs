//! Generation request value type.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Default `max_tokens` when the caller does not specify one.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature when the caller does not specify one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// An immutable generation request.
///
/// Two requests are cache-equivalent iff `model`, `prompt`, `max_tokens`
/// and `temperature` are all equal; `created_at` never participates in
/// cache key derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier (e.g. "claude-3-sonnet-20240229", "gpt-4o").
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Construction timestamp.
    pub created_at: SystemTime,
}

impl GenerationRequest {
    /// Create a request with default sampling parameters.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            created_at: SystemTime::now(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Whether another request would hit the same cache entry.
    pub fn is_cache_equivalent(&self, other: &GenerationRequest) -> bool {
        self.model == other.model
            && self.prompt == other.prompt
            && self.max_tokens == other.max_tokens
            && self.temperature == other.temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req = GenerationRequest::new("gpt-4o", "hello");
        assert_eq!(req.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(req.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_cache_equivalence_ignores_timestamp() {
        let a = GenerationRequest::new("gpt-4o", "hello").with_max_tokens(100);
        let mut b = a.clone();
        b.created_at = SystemTime::UNIX_EPOCH;
        assert!(a.is_cache_equivalent(&b));
    }

    #[test]
    fn test_cache_equivalence_sensitive_to_parameters() {
        let a = GenerationRequest::new("gpt-4o", "hello");
        let b = a.clone().with_temperature(0.9);
        assert!(!a.is_cache_equivalent(&b));
    }
}
