//! 路由模块：基于模型名的提供商选择表。
//!
//! # Routing Module
//!
//! Pure selection logic mapping a model identifier to a provider name.
//! No network calls, no provider SDK dependency.
//!
//! Selection is a priority-ordered table of case-insensitive substring
//! rules with a fallback provider, so new providers are added by extending
//! the table rather than touching router logic:
//!
//! ```rust
//! use llm_broker::routing::ModelRoutingTable;
//!
//! let table = ModelRoutingTable::default();
//! assert_eq!(table.select("claude-3-sonnet-20240229"), "anthropic");
//! assert_eq!(table.select("gpt-4o"), "openai");
//! assert_eq!(table.select("mistral-7b"), "huggingface");
//! ```

use serde::{Deserialize, Serialize};

/// One routing rule: model identifiers containing `pattern`
/// (case-insensitively) route to `provider`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    pub pattern: String,
    pub provider: String,
}

impl RouteRule {
    pub fn new(pattern: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            provider: provider.into(),
        }
    }

    fn matches(&self, model: &str) -> bool {
        model.to_lowercase().contains(&self.pattern)
    }
}

/// Priority-ordered provider selection table.
///
/// The first matching rule wins; unmatched models route to the fallback
/// provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRoutingTable {
    rules: Vec<RouteRule>,
    fallback: String,
}

impl ModelRoutingTable {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            fallback: fallback.into(),
        }
    }

    pub fn with_rule(mut self, pattern: impl Into<String>, provider: impl Into<String>) -> Self {
        self.rules.push(RouteRule::new(pattern, provider));
        self
    }

    /// Select a provider for the given model identifier.
    pub fn select(&self, model: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(model))
            .map(|rule| rule.provider.as_str())
            .unwrap_or(&self.fallback)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for ModelRoutingTable {
    /// Claude-family models route to Anthropic, GPT-family to OpenAI,
    /// everything else to the generic HuggingFace endpoint.
    fn default() -> Self {
        Self::new("huggingface")
            .with_rule("claude", "anthropic")
            .with_rule("gpt", "openai")
    }
}
