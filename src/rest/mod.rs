//! Resource mapping: associations, nested paths and records.
//!
//! This module provides:
//!
//! - **[`ResourceRegistry`] / [`ResourceType`]**: explicit type registry with
//!   namespace-relative lookup and subtype derivation
//! - **[`Association`]**: belongs-to, has-many and has-one declarations
//! - **[`ResourcePaths`]**: collection, element and custom-method paths
//!   derived from the belongs-to graph
//! - **[`Record`]**: attributes plus the prefix values that place a record
//! - **[`ResourceClient`]**: find, all, one, save, destroy and reload
//! - **[`ResourceError`]**: semantic error types for resource operations
//!
//! # Overview
//!
//! Types declare how they relate; URLs follow. A `Phone` that belongs to an
//! `Address`, which belongs to either a `Lawyer` or a `Doctor`, is fetched
//! from `doctors/2/addresses/3/phones/4.json` when those ids are known, and
//! from `addresses/3/phones/4.json` when only the address is.
//!
//! # Example
//!
//! ```rust,ignore
//! use reactive_resource::{ResourceClient, ResourceConfig, SiteUrl};
//! use reactive_resource::rest::{Params, ResourceRegistry, ResourceType};
//! use serde_json::json;
//!
//! let mut registry = ResourceRegistry::new();
//! registry.register(ResourceType::new("Doctor").has_many("addresses"))?;
//! registry.register(
//!     ResourceType::new("Address")
//!         .belongs_to("lawyer")
//!         .belongs_to("doctor")
//!         .has_many("phones"),
//! )?;
//! registry.register(ResourceType::new("Lawyer").has_many("addresses"))?;
//! registry.register(ResourceType::new("Phone").belongs_to("address"))?;
//!
//! let config = ResourceConfig::builder()
//!     .site(SiteUrl::new("https://api.avvo.com")?)
//!     .prefix("/api/1/")
//!     .build()?;
//! let client = ResourceClient::new(config, registry)?;
//!
//! let mut params = Params::new();
//! params.insert("doctor_id".to_string(), json!(2));
//! params.insert("address_id".to_string(), json!(3));
//!
//! // GET /api/1/doctors/2/addresses/3/phones/4.json
//! let mut phone = client.find("Phone", 4, &params).await?;
//!
//! // GET /api/1/doctors/2/addresses/3.json
//! let address = phone.get_related(&client, "address").await?;
//! ```

mod association;
mod errors;
pub mod inflector;
mod path;
mod record;
mod registry;
mod resource;

pub use association::{Association, AssociationKind, AssociationOptions};
pub use errors::ResourceError;
pub use path::{
    build_path, is_blank, param_to_string, query_string, template_placeholders, Params,
    PrefixSegment, ResourceOperation, ResourcePaths,
};
pub use record::{Record, Related};
pub use registry::{ResourceRegistry, ResourceType, MAX_NESTING_DEPTH, NAMESPACE_SEPARATOR};
pub use resource::ResourceClient;
