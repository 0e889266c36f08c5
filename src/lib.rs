//! # Reactive Resource
//!
//! Client-side mapping of REST resources with association-derived URLs.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ResourceConfig`] and [`ResourceConfigBuilder`]
//! - An explicit type registry with namespace-relative lookup
//! - `belongs_to`, `has_many` and `has_one` associations between types
//! - Nested path resolution driven by belongs-to declarations, including
//!   polymorphic parents and singleton resources
//! - Foreign-key propagation between URL prefixes and record attributes
//! - Async HTTP client with basic auth and retry handling
//!
//! ## Quick Start
//!
//! ```rust
//! use reactive_resource::{ResourceConfig, SiteUrl};
//! use reactive_resource::rest::{Params, ResourcePaths, ResourceRegistry, ResourceType};
//! use serde_json::json;
//!
//! let mut registry = ResourceRegistry::new();
//! registry.register(ResourceType::new("Lawyer").has_one("headshot")).unwrap();
//! registry
//!     .register(ResourceType::new("Headshot").singleton().belongs_to("lawyer"))
//!     .unwrap();
//!
//! let config = ResourceConfig::builder()
//!     .site(SiteUrl::new("https://api.avvo.com").unwrap())
//!     .prefix("/api/1/")
//!     .build()
//!     .unwrap();
//!
//! let mut params = Params::new();
//! params.insert("lawyer_id".to_string(), json!(1));
//!
//! let paths = ResourcePaths::new(&registry, &config);
//! assert_eq!(
//!     paths.element_path("Headshot", None, &params).unwrap(),
//!     "/api/1/lawyers/1/headshot.json"
//! );
//! ```
//!
//! ## Working With Records
//!
//! ```rust,ignore
//! use reactive_resource::{ResourceClient, Params};
//! use serde_json::json;
//!
//! let client = ResourceClient::new(config, registry)?;
//!
//! // GET /api/1/lawyers/1.json
//! let mut lawyer = client.find("Lawyer", 1, &Params::new()).await?;
//!
//! // GET /api/1/lawyers/1/headshot.json, fetched once and cached
//! let headshot = lawyer.get_related(&client, "headshot").await?;
//!
//! // POST /api/1/lawyers/1/lawyer_posts.json {"lawyer_post": {"post_id": 2}}
//! let attributes = json!({"lawyer_id": 1, "post_id": 2});
//! let mut post = client.new_record("LawyerPost", attributes.as_object().cloned().unwrap_or_default())?;
//! client.save(&mut post).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Types live in a registry passed explicitly
//! - **Fail-fast validation**: Configuration and type names validate on construction
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **One request per operation**: No hidden prefetching

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{Format, Password, ResourceConfig, ResourceConfigBuilder, SiteUrl};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};

// Re-export resource types
pub use rest::{
    Association, AssociationKind, AssociationOptions, Params, Record, Related, ResourceClient,
    ResourceError, ResourceRegistry, ResourceType,
};
