//! 响应缓存模块：按提供商维度的有界 TTL + LRU 响应缓存。
//!
//! # Response Caching Module
//!
//! Per-provider bounded response cache, reducing upstream API calls and
//! improving latency for repeated requests.
//!
//! ## Overview
//!
//! Caching is valuable for:
//! - Reducing API costs by avoiding duplicate requests
//! - Improving response latency for repeated queries
//! - Supporting development and testing workflows
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheKey`] | Stable digest over a request's semantic fields |
//! | [`ResponseCache`] | Byte-budgeted store with TTL expiry and LRU eviction |
//! | [`CacheSnapshot`] | Point-in-time occupancy for observability |
//!
//! ## Cache Key Generation
//!
//! Keys are derived from the model identifier, the prompt, `max_tokens`
//! and `temperature`. Identical field tuples always produce the identical
//! key; a change in any field produces a different key.

mod key;
mod store;

pub use key::CacheKey;
pub use store::{CacheSnapshot, ResponseCache};
