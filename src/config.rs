//! Per-provider broker configuration.
//!
//! File loading and parsing belong to the embedding application; this
//! module only defines the shape consumed at router construction.

use serde::{Deserialize, Serialize};

/// Configuration for one provider's rate limiter and cache.
///
/// All fields default to the values used when a provider ships no
/// configuration of its own, so `#[serde(default)]` makes every field
/// optional in configuration sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Steady-state admissions per trailing 60-second window.
    pub requests_per_minute: u32,
    /// Extra permits beyond the window, replenished only by explicit reset.
    pub burst_capacity: u32,
    /// Whether responses for this provider are cached at all.
    pub caching_enabled: bool,
    /// Cache byte budget, in megabytes.
    pub max_size_mb: u64,
    /// Cache entry time-to-live, in minutes.
    pub ttl_minutes: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 50,
            burst_capacity: 10,
            caching_enabled: true,
            max_size_mb: 1000,
            ttl_minutes: 60,
        }
    }
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default limits with caching disabled, for providers that ship no
    /// cache configuration of their own.
    pub fn uncached() -> Self {
        Self {
            caching_enabled: false,
            ..Self::default()
        }
    }

    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = rpm;
        self
    }

    pub fn with_burst_capacity(mut self, burst: u32) -> Self {
        self.burst_capacity = burst;
        self
    }

    pub fn with_caching_enabled(mut self, enabled: bool) -> Self {
        self.caching_enabled = enabled;
        self
    }

    pub fn with_max_size_mb(mut self, mb: u64) -> Self {
        self.max_size_mb = mb;
        self
    }

    pub fn with_ttl_minutes(mut self, minutes: u64) -> Self {
        self.ttl_minutes = minutes;
        self
    }
}
