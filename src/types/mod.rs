//! 类型系统模块：定义请求与响应的核心数据类型。
//!
//! # Types Module
//!
//! Core value types exchanged between callers, the router, and provider
//! clients.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`GenerationRequest`] | Immutable generation request (model, prompt, sampling parameters) |
//! | [`GenerationResponse`] | Produced response with usage and timing metadata |
//! | [`TokenUsage`] | Exact token accounting reported by an upstream provider |

pub mod request;
pub mod response;

pub use request::GenerationRequest;
pub use response::{GenerationResponse, TokenUsage};
