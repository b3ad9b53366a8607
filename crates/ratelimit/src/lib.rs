//! Request pacing for outbound provider calls.
//!
//! - `RateLimiter`: per-key minimum interval between calls

pub mod limiter;

pub use limiter::RateLimiter;
