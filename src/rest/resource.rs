//! The resource client: CRUD operations over registered resource types.
//!
//! [`ResourceClient`] ties together a [`ResourceRegistry`], a
//! [`ResourceConfig`] and a [`RestClient`]. Every remote operation resolves
//! its path through [`ResourcePaths`] and issues exactly one HTTP request.
//!
//! # Request Bodies
//!
//! Outgoing records are wrapped in their element name:
//!
//! ```json
//! {"lawyer_post": {"post_id": 2}}
//! ```
//!
//! Foreign keys consumed by the URL are left out of the body. Foreign keys
//! the URL does not consume (a sibling belongs-to that lost the parent
//! selection) stay in the body.
//!
//! # Response Bodies
//!
//! A single record may come back wrapped (`{"phone": {...}}`) or bare.
//! Collections may be a bare array, an array of wrapped records, or wrapped
//! in the collection name (`{"phones": [...]}`). Any single-key object
//! whose value is an object or array counts as wrapped.
//!
//! # Example
//!
//! ```rust,ignore
//! use reactive_resource::{ResourceClient, ResourceConfig, SiteUrl};
//! use reactive_resource::rest::{Params, ResourceRegistry, ResourceType};
//! use serde_json::json;
//!
//! let mut registry = ResourceRegistry::new();
//! registry.register(ResourceType::new("Lawyer").has_many("addresses"))?;
//! registry.register(ResourceType::new("Address").belongs_to("lawyer"))?;
//!
//! let config = ResourceConfig::builder()
//!     .site(SiteUrl::new("https://api.avvo.com")?)
//!     .prefix("/api/1/")
//!     .build()?;
//! let client = ResourceClient::new(config, registry)?;
//!
//! let mut lawyer = client.find("Lawyer", 1, &Params::new()).await?;
//! let addresses = lawyer.get_related(&client, "addresses").await?;
//! ```

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::clients::{HttpMethod, RestClient};
use crate::config::ResourceConfig;
use crate::rest::errors::ResourceError;
use crate::rest::path::{
    param_to_string, query_string, template_placeholders, Params, ResourceOperation, ResourcePaths,
};
use crate::rest::record::{Record, RecordKeys};
use crate::rest::registry::{ResourceRegistry, ResourceType};

/// Client for registered resource types.
///
/// # Thread Safety
///
/// `ResourceClient` is `Send + Sync`. Operations take `&self`; records are
/// owned by the caller.
#[derive(Debug)]
pub struct ResourceClient {
    registry: ResourceRegistry,
    config: ResourceConfig,
    rest: RestClient,
}

// Verify ResourceClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceClient>();
};

impl ResourceClient {
    /// Creates a client for `config` serving the types in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Rest`] if the HTTP transport cannot be built.
    pub fn new(config: ResourceConfig, registry: ResourceRegistry) -> Result<Self, ResourceError> {
        let rest = RestClient::new(&config)?;
        Ok(Self {
            registry,
            config,
            rest,
        })
    }

    /// Returns the type registry.
    #[must_use]
    pub const fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Returns the type registry for further declarations.
    ///
    /// Records created before a mutation keep the foreign keys they were
    /// created with.
    pub fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }

    /// Returns the site configuration.
    #[must_use]
    pub const fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Returns the underlying REST client.
    #[must_use]
    pub const fn rest_client(&self) -> &RestClient {
        &self.rest
    }

    /// Returns a path builder over this client's registry and site.
    #[must_use]
    pub const fn paths(&self) -> ResourcePaths<'_> {
        ResourcePaths::new(&self.registry, &self.config)
    }

    /// Builds an unsaved record of `resource` from `attributes`.
    ///
    /// Foreign keys and site prefix placeholders found in `attributes` are
    /// picked up as prefix values.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] for an unregistered type.
    pub fn new_record(
        &self,
        resource: &str,
        attributes: Map<String, Value>,
    ) -> Result<Record, ResourceError> {
        let mut record = self.blank_record(resource)?;
        record.load(attributes);
        Ok(record)
    }

    /// Fetches one record by id.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the server answers 404, and
    /// path or transport errors otherwise.
    pub async fn find(
        &self,
        resource: &str,
        id: impl Into<Value>,
        params: &Params,
    ) -> Result<Record, ResourceError> {
        let id = id.into();
        let paths = self.paths();
        let path = paths.element_path(resource, Some(&id), params)?;
        let (prefix_options, _) = paths.split_options(resource, params)?;

        let body = self
            .send(HttpMethod::Get, &path, None, resource, Some(&id))
            .await?;
        self.instantiate_one(resource, body, prefix_options)
    }

    /// Lists records of `resource`.
    ///
    /// Prefix parameters in `params` select the nesting; the rest become
    /// the query string.
    ///
    /// # Errors
    ///
    /// Returns path, transport or decoding errors.
    pub async fn all(&self, resource: &str, params: &Params) -> Result<Vec<Record>, ResourceError> {
        let paths = self.paths();
        let path = paths.collection_path(resource, params)?;
        let (prefix_options, _) = paths.split_options(resource, params)?;

        let body = self.send(HttpMethod::Get, &path, None, resource, None).await?;
        self.instantiate_many(resource, body, &prefix_options)
    }

    /// Fetches the single record of a singleton resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathResolutionFailed`] for non-singleton
    /// types; use [`ResourceClient::one_from`] with an explicit path there.
    pub async fn one(&self, resource: &str, params: &Params) -> Result<Record, ResourceError> {
        if !self.registry.lookup(resource)?.is_singleton() {
            return Err(ResourceError::PathResolutionFailed {
                resource: resource.to_string(),
                operation: ResourceOperation::One.as_str(),
            });
        }

        let paths = self.paths();
        let path = paths.element_path(resource, None, params)?;
        let (prefix_options, _) = paths.split_options(resource, params)?;

        let body = self.send(HttpMethod::Get, &path, None, resource, None).await?;
        self.instantiate_one(resource, body, prefix_options)
    }

    /// Fetches a single record from an explicit absolute path.
    ///
    /// All of `params` go to the query string.
    ///
    /// # Errors
    ///
    /// Returns transport or decoding errors.
    pub async fn one_from(
        &self,
        resource: &str,
        path: &str,
        params: &Params,
    ) -> Result<Record, ResourceError> {
        let (prefix_options, _) = self.paths().split_options(resource, params)?;
        let path = format!("{path}{}", query_string(params));

        let body = self.send(HttpMethod::Get, &path, None, resource, None).await?;
        self.instantiate_one(resource, body, prefix_options)
    }

    /// Creates (POST) or updates (PUT) `record`.
    ///
    /// A non-empty response is loaded back into the record, so ids assigned
    /// by the server become visible.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ValidationFailed`] on 422 and
    /// [`ResourceError::NotFound`] on 404.
    pub async fn save(&self, record: &mut Record) -> Result<(), ResourceError> {
        let resource = record.resource_type().to_string();
        let resource_type = self.registry.lookup(&resource)?;
        let paths = self.paths();

        let claimed = paths.claimed_foreign_keys(&resource, record.prefix_values())?;
        let mut body = Map::new();
        body.insert(
            resource_type.element_name(),
            Value::Object(record.body_attributes(&claimed)),
        );

        let (method, path) = if record.is_new() {
            (
                ResourceOperation::Create.default_http_method(),
                paths.collection_path(&resource, record.prefix_values())?,
            )
        } else {
            (
                ResourceOperation::Update.default_http_method(),
                paths.element_path(&resource, record.id(), record.prefix_values())?,
            )
        };

        let id = record.id().cloned();
        let response = self
            .send(method, &path, Some(Value::Object(body)), &resource, id.as_ref())
            .await?;

        if !response.is_null() {
            let attributes = unwrap_element(resource_type, response)?;
            record.load(attributes);
        }
        Ok(())
    }

    /// Deletes `record`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] on 404, and
    /// [`ResourceError::PathResolutionFailed`] for an unsaved record of a
    /// non-singleton type.
    pub async fn destroy(&self, record: &Record) -> Result<(), ResourceError> {
        let resource = record.resource_type();
        let path = self
            .paths()
            .element_path(resource, record.id(), record.prefix_values())?;

        self.send(
            ResourceOperation::Delete.default_http_method(),
            &path,
            None,
            resource,
            record.id(),
        )
        .await?;
        Ok(())
    }

    /// Re-fetches `record`, replacing its attributes and dropping cached
    /// associations. Prefix values are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] on 404.
    pub async fn reload(&self, record: &mut Record) -> Result<(), ResourceError> {
        let resource = record.resource_type().to_string();
        let resource_type = self.registry.lookup(&resource)?;
        let path = self
            .paths()
            .element_path(&resource, record.id(), record.prefix_values())?;

        let id = record.id().cloned();
        let body = self
            .send(HttpMethod::Get, &path, None, &resource, id.as_ref())
            .await?;
        record.replace(unwrap_element(resource_type, body)?);
        Ok(())
    }

    /// Returns `true` if `find` succeeds, `false` on 404.
    ///
    /// # Errors
    ///
    /// Propagates every error other than [`ResourceError::NotFound`].
    pub async fn exists(
        &self,
        resource: &str,
        id: impl Into<Value>,
        params: &Params,
    ) -> Result<bool, ResourceError> {
        match self.find(resource, id, params).await {
            Ok(_) => Ok(true),
            Err(error) if error.is_not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Calls a custom collection method (`lawyers/search.json`) and returns
    /// the decoded body.
    ///
    /// # Errors
    ///
    /// Returns path or transport errors.
    pub async fn collection_request(
        &self,
        method: HttpMethod,
        resource: &str,
        name: &str,
        params: &Params,
        body: Option<Value>,
    ) -> Result<Value, ResourceError> {
        let path = self
            .paths()
            .custom_method_collection_path(resource, name, params)?;
        self.send(method, &path, body, resource, None).await
    }

    /// Calls a custom member method (`lawyers/1/billing_plan.json`) on
    /// `record` and returns the decoded body.
    ///
    /// The record's prefix values are merged under `params`.
    ///
    /// # Errors
    ///
    /// Returns path or transport errors.
    pub async fn element_request(
        &self,
        method: HttpMethod,
        record: &Record,
        name: &str,
        params: &Params,
        body: Option<Value>,
    ) -> Result<Value, ResourceError> {
        let resource = record.resource_type();
        let mut options = record.prefix_values().clone();
        options.extend(params.iter().map(|(key, value)| (key.clone(), value.clone())));

        let path = self
            .paths()
            .custom_method_element_path(resource, record.id(), name, &options)?;
        self.send(method, &path, body, resource, record.id()).await
    }

    /// Issues one request and returns the decoded body.
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        resource: &str,
        id: Option<&Value>,
    ) -> Result<Value, ResourceError> {
        match self.rest.request(method, path, body).await {
            Ok(response) => Ok(response.body),
            Err(error) => {
                let id = id.map(param_to_string);
                Err(ResourceError::from_rest_error(error, resource, id.as_deref()))
            }
        }
    }

    fn record_keys(&self, resource: &str) -> Result<RecordKeys, ResourceError> {
        let foreign_keys: BTreeSet<String> = self
            .registry
            .belongs_to_with_parents(resource)?
            .into_iter()
            .map(|name| format!("{name}_id"))
            .collect();
        let placeholders = template_placeholders(self.config.prefix())
            .into_iter()
            .filter(|name| !foreign_keys.contains(name))
            .collect();

        Ok(RecordKeys {
            foreign_keys,
            placeholders,
        })
    }

    fn blank_record(&self, resource: &str) -> Result<Record, ResourceError> {
        let name = self.registry.lookup(resource)?.name().to_string();
        let keys = self.record_keys(&name)?;
        Ok(Record::blank(name, keys))
    }

    fn instantiate(
        &self,
        resource: &str,
        attributes: Map<String, Value>,
        prefix_options: Params,
    ) -> Result<Record, ResourceError> {
        let mut record = self.blank_record(resource)?.with_prefix_values(prefix_options);
        record.load(attributes);
        Ok(record)
    }

    fn instantiate_one(
        &self,
        resource: &str,
        body: Value,
        prefix_options: Params,
    ) -> Result<Record, ResourceError> {
        let resource_type = self.registry.lookup(resource)?;
        let attributes = unwrap_element(resource_type, body)?;
        self.instantiate(resource, attributes, prefix_options)
    }

    fn instantiate_many(
        &self,
        resource: &str,
        body: Value,
        prefix_options: &Params,
    ) -> Result<Vec<Record>, ResourceError> {
        let resource_type = self.registry.lookup(resource)?;
        unwrap_collection(resource_type, body)?
            .into_iter()
            .map(|attributes| self.instantiate(resource, attributes, prefix_options.clone()))
            .collect()
    }
}

/// Strips a single-key root: `{"phone": {...}}` and `{"phones": [...]}`
/// yield the inner value, anything else is returned unchanged.
fn remove_root(body: Value) -> Value {
    match body {
        Value::Object(map) if map.len() == 1 => {
            let (key, inner) = map.into_iter().next().unwrap_or_default();
            if inner.is_object() || inner.is_array() {
                inner
            } else {
                let mut map = Map::new();
                map.insert(key, inner);
                Value::Object(map)
            }
        }
        other => other,
    }
}

/// Decodes a single record body, unwrapping a root element if present.
fn unwrap_element(
    resource_type: &ResourceType,
    body: Value,
) -> Result<Map<String, Value>, ResourceError> {
    match remove_root(body) {
        Value::Object(map) => Ok(map),
        other => Err(ResourceError::Serialization {
            resource: resource_type.name().to_string(),
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}

/// Decodes a collection body: `[...]`, `[{element_name: {...}}, ...]` or
/// `{collection_name: [...]}`. An empty body is an empty collection.
fn unwrap_collection(
    resource_type: &ResourceType,
    body: Value,
) -> Result<Vec<Map<String, Value>>, ResourceError> {
    match remove_root(body) {
        Value::Array(items) => items
            .into_iter()
            .map(|item| unwrap_element(resource_type, item))
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(ResourceError::Serialization {
            resource: resource_type.name().to_string(),
            message: format!("expected an array, got {other}"),
        }),
    }
}
