use thiserror::Error;

/// Boxed error type used to carry opaque provider transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "provider.requests_per_minute")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "router_builder", "routing_table")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for the broker.
///
/// Callers receive a structured error distinguishing rate limiting (retry
/// later or switch providers), upstream failure (surfaced verbatim, not
/// retried here), and misconfiguration (abort).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Rate limit exceeded for provider '{provider}'")]
    RateLimitExceeded { provider: String },

    #[error("Provider '{provider}' call failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: BoxError,
    },

    #[error("No provider configured under name '{name}'")]
    InvalidProvider { name: String },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a rate-limit error for the given provider.
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Error::RateLimitExceeded {
            provider: provider.into(),
        }
    }

    /// Wrap an opaque upstream failure for the given provider.
    pub fn provider(provider: impl Into<String>, source: BoxError) -> Self {
        Error::Provider {
            provider: provider.into(),
            source,
        }
    }

    /// Create an unknown-provider error.
    pub fn invalid_provider(name: impl Into<String>) -> Self {
        Error::InvalidProvider { name: name.into() }
    }

    /// Create a new configuration error with structured context.
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Whether the caller may reasonably retry after backing off.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimitExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_provider() {
        let err = Error::rate_limited("anthropic");
        assert!(err.to_string().contains("anthropic"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_configuration_context_formatting() {
        let err = Error::configuration_with_context(
            "no providers configured",
            ErrorContext::new().with_source("router_builder"),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("no providers configured"));
        assert!(rendered.contains("source: router_builder"));
    }

    #[test]
    fn test_provider_error_preserves_cause() {
        let cause: BoxError = "connection reset".into();
        let err = Error::provider("openai", cause);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("connection reset"));
    }
}
