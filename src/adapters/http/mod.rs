//! HTTP adapter for the paginated data API.

pub mod client;

pub use client::{DataApiClient, RateLimiter};
