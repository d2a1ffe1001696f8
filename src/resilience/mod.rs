//! 弹性模式模块：提供滑动窗口限流器等吞吐保护机制。
//!
//! # Resilience Primitives Module
//!
//! Throughput protection for upstream providers.
//!
//! ## Overview
//!
//! Admission control is essential for production AI systems to:
//! - Protect against provider API rate limit violations
//! - Provide graceful degradation under high load
//! - Keep burst traffic within an explicitly granted allowance
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RateLimiter`] | Sliding-window limiter with a manual burst allowance |
//! | [`RateLimiterConfig`] | Per-provider throughput configuration |
//! | [`RateLimiterSnapshot`] | Point-in-time admission state |
//!
//! ## Rate Limiter
//!
//! The limiter admits up to `requests_per_minute` requests inside the
//! trailing 60-second window, then dips into a burst-token pool that is
//! replenished only by an explicit [`RateLimiter::reset_burst`] call:
//!
//! ```rust
//! use llm_broker::resilience::{RateLimiter, RateLimiterConfig};
//!
//! # tokio_test::block_on(async {
//! let limiter = RateLimiter::new(RateLimiterConfig::new(2, 1));
//! assert!(limiter.try_acquire().await);
//! # });
//! ```

pub mod rate_limiter;

pub use rate_limiter::{RateLimiter, RateLimiterConfig, RateLimiterSnapshot};
