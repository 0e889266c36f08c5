//! REST client built on top of [`HttpClient`](crate::clients::HttpClient).
//!
//! # Overview
//!
//! - [`RestClient`]: `get()`, `post()`, `put()`, `delete()` over absolute paths
//! - [`RestError`]: Error type for REST operations
//!
//! # Retry Behavior
//!
//! Requests are attempted `tries` times (from [`ResourceConfig`](crate::ResourceConfig))
//! when the server answers 429 or 500.

mod client;
mod errors;

pub use client::RestClient;
pub use errors::RestError;
