//! Cache key generation.

use crate::types::GenerationRequest;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Unit separator keeps field boundaries unambiguous in the digest input.
const FIELD_DELIMITER: char = '\u{1f}';

/// Stable, collision-resistant identifier for a request's semantic fields.
///
/// Derivation is pure: no timestamp or randomness participates, so the
/// same `(model, prompt, max_tokens, temperature)` tuple always maps to
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    hash: String,
}

impl CacheKey {
    /// Derive the key for a request.
    pub fn derive(request: &GenerationRequest) -> Self {
        // Full-precision float formatting so distinct temperatures never
        // collapse onto one key.
        let canonical = format!(
            "{model}{d}{prompt}{d}{max_tokens}{d}{temperature}",
            model = request.model,
            prompt = request.prompt,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            d = FIELD_DELIMITER,
        );
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect();
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: &str, prompt: &str, max_tokens: u32, temperature: f64) -> GenerationRequest {
        GenerationRequest::new(model, prompt)
            .with_max_tokens(max_tokens)
            .with_temperature(temperature)
    }

    #[test]
    fn test_identical_fields_identical_key() {
        let a = request("gpt-4o", "hello", 100, 0.7);
        let mut b = a.clone();
        b.created_at = std::time::SystemTime::UNIX_EPOCH;
        assert_eq!(CacheKey::derive(&a), CacheKey::derive(&b));
    }

    #[test]
    fn test_each_field_perturbs_key() {
        let base = request("gpt-4o", "hello", 100, 0.7);
        let variants = [
            request("gpt-4o-mini", "hello", 100, 0.7),
            request("gpt-4o", "hello!", 100, 0.7),
            request("gpt-4o", "hello", 101, 0.7),
            request("gpt-4o", "hello", 100, 0.71),
        ];
        let key = CacheKey::derive(&base);
        for variant in &variants {
            assert_ne!(key, CacheKey::derive(variant));
        }
    }

    #[test]
    fn test_delimiter_prevents_field_bleed() {
        // "ab" + "c" must not collide with "a" + "bc".
        let a = request("ab", "c", 1, 0.0);
        let b = request("a", "bc", 1, 0.0);
        assert_ne!(CacheKey::derive(&a), CacheKey::derive(&b));
    }

    #[test]
    fn test_key_is_hex_digest() {
        let key = CacheKey::derive(&request("m", "p", 1, 0.0));
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
