//! HTTP middleware shared by modules.

pub mod rate_limit;

pub use rate_limit::{FixedWindowLimiter, RateLimitPolicy};
