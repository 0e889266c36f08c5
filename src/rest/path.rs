//! Nested path resolution for resources.
//!
//! Paths are derived from declared belongs-to associations rather than
//! written out per resource. Given a type and the prefix values known at
//! call time, [`ResourcePaths`] decides which parent chain is in play and
//! builds collection, element and custom-method paths from it.
//!
//! # Path Resolution
//!
//! For a type `T` with options `opts`:
//!
//! 1. Each belongs-to target of `T` is resolved recursively, in
//!    declaration order; the first one yielding a non-empty chain becomes
//!    the parent chain.
//! 2. `T`'s own belongs-to associations are scanned in declaration order
//!    and the first eligible one is appended: its target is a singleton, or
//!    `opts` carries a value for `<attribute>_id` (which is claimed).
//! 3. The chain renders as `collection/id/` segments (`collection/` for
//!    singleton targets).
//!
//! A resource declaring `belongs_to :lawyer` and `belongs_to :doctor` is
//! therefore nested under whichever id was supplied, and under `lawyer`
//! when both were.
//!
//! # Example
//!
//! ```rust
//! use reactive_resource::{ResourceConfig, SiteUrl};
//! use reactive_resource::rest::{Params, ResourcePaths, ResourceRegistry, ResourceType};
//! use serde_json::json;
//!
//! let mut registry = ResourceRegistry::new();
//! registry.register(ResourceType::new("Lawyer")).unwrap();
//! registry.register(ResourceType::new("Address").belongs_to("lawyer")).unwrap();
//!
//! let config = ResourceConfig::builder()
//!     .site(SiteUrl::new("https://api.avvo.com").unwrap())
//!     .prefix("/api/1/")
//!     .build()
//!     .unwrap();
//! let paths = ResourcePaths::new(&registry, &config);
//!
//! let mut params = Params::new();
//! params.insert("lawyer_id".to_string(), json!(2));
//!
//! assert_eq!(
//!     paths.collection_path("Address", &params).unwrap(),
//!     "/api/1/lawyers/2/addresses.json"
//! );
//! assert_eq!(
//!     paths.element_path("Address", Some(&json!(3)), &params).unwrap(),
//!     "/api/1/lawyers/2/addresses/3.json"
//! );
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{self, Display};

use serde_json::Value;

use crate::clients::HttpMethod;
use crate::config::ResourceConfig;
use crate::rest::errors::ResourceError;
use crate::rest::registry::{ResourceRegistry, ResourceType, MAX_NESTING_DEPTH};

/// Prefix and query parameters, ordered by name.
pub type Params = BTreeMap<String, Value>;

/// Operations that can be performed on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    /// Fetch one record by id (GET element path).
    Find,
    /// List records (GET collection path).
    All,
    /// Fetch the single record of a context (GET element path, no id).
    One,
    /// Create a record (POST collection path).
    Create,
    /// Update a record (PUT element path).
    Update,
    /// Delete a record (DELETE element path).
    Delete,
    /// Call a custom collection or member method.
    Custom,
}

impl ResourceOperation {
    /// Returns the default HTTP method for this operation.
    #[must_use]
    pub const fn default_http_method(&self) -> HttpMethod {
        match self {
            Self::Find | Self::All | Self::One | Self::Custom => HttpMethod::Get,
            Self::Create => HttpMethod::Post,
            Self::Update => HttpMethod::Put,
            Self::Delete => HttpMethod::Delete,
        }
    }

    /// Returns the operation name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::All => "all",
            Self::One => "one",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Custom => "custom",
        }
    }
}

/// One `collection/id` step of an association prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixSegment {
    /// The belongs-to attribute that selected this segment.
    pub attribute: String,
    /// The `<attribute>_id` key the id was claimed from.
    pub foreign_key: String,
    /// Collection name of the parent type.
    pub collection_name: String,
    /// Claimed id, `None` for singleton parents.
    pub id: Option<String>,
}

impl Display for PrefixSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{}", self.collection_name, urlencoding::encode(id)),
            None => f.write_str(&self.collection_name),
        }
    }
}

/// Path builder over a registry and a site configuration.
#[derive(Debug, Clone, Copy)]
pub struct ResourcePaths<'a> {
    registry: &'a ResourceRegistry,
    config: &'a ResourceConfig,
}

impl<'a> ResourcePaths<'a> {
    /// Creates a path builder.
    #[must_use]
    pub const fn new(registry: &'a ResourceRegistry, config: &'a ResourceConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the belongs-to chain in play for `resource` given `options`.
    ///
    /// `options` is not modified; claimed ids only affect the walk.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] if any association on the
    /// walk has no registered target, and [`ResourceError::NestingTooDeep`]
    /// for chains deeper than [`MAX_NESTING_DEPTH`].
    pub fn prefix_associations(
        &self,
        resource: &str,
        options: &Params,
    ) -> Result<Vec<PrefixSegment>, ResourceError> {
        let resource_type = self.registry.lookup(resource)?;
        let mut options = options.clone();
        self.walk(resource_type, &mut options, 0)
    }

    fn walk(
        &self,
        resource: &ResourceType,
        options: &mut Params,
        depth: usize,
    ) -> Result<Vec<PrefixSegment>, ResourceError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ResourceError::NestingTooDeep {
                resource: resource.name().to_string(),
                limit: MAX_NESTING_DEPTH,
            });
        }

        let mut chain = Vec::new();
        for association in resource.belongs_to_associations() {
            let parent = association.resolved_target_type(self.registry)?;
            let mut parent_options = options.clone();
            let parent_chain = self.walk(parent, &mut parent_options, depth + 1)?;
            if !parent_chain.is_empty() {
                chain = parent_chain;
                break;
            }
        }

        for association in resource.belongs_to_associations() {
            let target = association.resolved_target_type(self.registry)?;
            let foreign_key = association.foreign_key();

            let id = if target.is_singleton() {
                None
            } else {
                match options.remove(&foreign_key) {
                    Some(value) if !is_blank(&value) => Some(param_to_string(&value)),
                    _ => continue,
                }
            };

            chain.push(PrefixSegment {
                attribute: association.attribute().to_string(),
                foreign_key,
                collection_name: target.collection_name(),
                id,
            });
            break;
        }

        Ok(chain)
    }

    /// Renders the association prefix (`"lawyers/2/addresses/3/"`), or `""`.
    ///
    /// # Errors
    ///
    /// See [`ResourcePaths::prefix_associations`].
    pub fn association_prefix(
        &self,
        resource: &str,
        options: &Params,
    ) -> Result<String, ResourceError> {
        let segments = self.prefix_associations(resource, options)?;
        if segments.is_empty() {
            return Ok(String::new());
        }
        let mut prefix = segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/");
        prefix.push('/');
        Ok(prefix)
    }

    /// Returns the foreign keys claimed by the path for these prefix values.
    ///
    /// # Errors
    ///
    /// See [`ResourcePaths::prefix_associations`].
    pub fn claimed_foreign_keys(
        &self,
        resource: &str,
        options: &Params,
    ) -> Result<Vec<String>, ResourceError> {
        Ok(self
            .prefix_associations(resource, options)?
            .into_iter()
            .filter(|segment| segment.id.is_some())
            .map(|segment| segment.foreign_key)
            .collect())
    }

    /// Returns every parameter name that belongs in the path for `resource`:
    /// site prefix placeholders plus `<name>_id` for each transitive
    /// belongs-to attribute.
    ///
    /// # Errors
    ///
    /// See [`ResourceRegistry::belongs_to_with_parents`].
    pub fn prefix_parameters(&self, resource: &str) -> Result<BTreeSet<String>, ResourceError> {
        let mut parameters: BTreeSet<String> =
            template_placeholders(self.config.prefix()).into_iter().collect();
        for name in self.registry.belongs_to_with_parents(resource)? {
            parameters.insert(format!("{name}_id"));
        }
        Ok(parameters)
    }

    /// Splits `params` into `(prefix_options, query_options)`.
    ///
    /// # Errors
    ///
    /// See [`ResourcePaths::prefix_parameters`].
    pub fn split_options(
        &self,
        resource: &str,
        params: &Params,
    ) -> Result<(Params, Params), ResourceError> {
        let prefix_parameters = self.prefix_parameters(resource)?;
        Ok(params
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .partition(|(key, _)| prefix_parameters.contains(key)))
    }

    /// Returns the site prefix with its placeholders filled in.
    #[must_use]
    pub fn prefix(&self, prefix_options: &Params) -> String {
        let values: HashMap<&str, String> = prefix_options
            .iter()
            .map(|(key, value)| (key.as_str(), urlencoding::encode(&param_to_string(value)).into_owned()))
            .collect();
        build_path(self.config.prefix(), &values)
    }

    /// Returns the format extension for `resource` (`".json"` or `""`).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] for an unknown type.
    pub fn extension(&self, resource: &str) -> Result<&'static str, ResourceError> {
        let resource_type = self.registry.lookup(resource)?;
        Ok(resource_type
            .format()
            .unwrap_or_else(|| self.config.format())
            .extension())
    }

    /// `prefix + association_prefix + collection_name + extension + query`.
    ///
    /// # Errors
    ///
    /// See [`ResourcePaths::prefix_associations`].
    pub fn collection_path(&self, resource: &str, params: &Params) -> Result<String, ResourceError> {
        let (prefix_options, query_options) = self.split_options(resource, params)?;
        let path = format!(
            "{}{}{}",
            self.base(resource, &prefix_options)?,
            self.extension(resource)?,
            query_string(&query_options)
        );
        tracing::debug!(resource, %path, "resolved collection path");
        Ok(path)
    }

    /// Like [`ResourcePaths::collection_path`] with `/<id>` appended before
    /// the extension.
    ///
    /// Singleton resources omit the id segment when no id (or an empty one)
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathResolutionFailed`] for a non-singleton
    /// without an id, otherwise see [`ResourcePaths::prefix_associations`].
    pub fn element_path(
        &self,
        resource: &str,
        id: Option<&Value>,
        params: &Params,
    ) -> Result<String, ResourceError> {
        let (prefix_options, query_options) = self.split_options(resource, params)?;
        let mut path = self.base(resource, &prefix_options)?;
        self.push_id(resource, id, &mut path)?;
        path.push_str(self.extension(resource)?);
        path.push_str(&query_string(&query_options));
        tracing::debug!(resource, %path, "resolved element path");
        Ok(path)
    }

    /// `prefix + association_prefix + collection_name/method + extension + query`.
    ///
    /// # Errors
    ///
    /// See [`ResourcePaths::prefix_associations`].
    pub fn custom_method_collection_path(
        &self,
        resource: &str,
        method: &str,
        params: &Params,
    ) -> Result<String, ResourceError> {
        let (prefix_options, query_options) = self.split_options(resource, params)?;
        Ok(format!(
            "{}/{}{}{}",
            self.base(resource, &prefix_options)?,
            method,
            self.extension(resource)?,
            query_string(&query_options)
        ))
    }

    /// `prefix + association_prefix + collection_name/id/method + extension + query`.
    ///
    /// # Errors
    ///
    /// See [`ResourcePaths::element_path`].
    pub fn custom_method_element_path(
        &self,
        resource: &str,
        id: Option<&Value>,
        method: &str,
        params: &Params,
    ) -> Result<String, ResourceError> {
        let (prefix_options, query_options) = self.split_options(resource, params)?;
        let mut path = self.base(resource, &prefix_options)?;
        self.push_id(resource, id, &mut path)?;
        path.push('/');
        path.push_str(method);
        path.push_str(self.extension(resource)?);
        path.push_str(&query_string(&query_options));
        Ok(path)
    }

    /// `prefix + association_prefix + collection_name`.
    fn base(&self, resource: &str, prefix_options: &Params) -> Result<String, ResourceError> {
        let resource_type = self.registry.lookup(resource)?;
        Ok(format!(
            "{}{}{}",
            self.prefix(prefix_options),
            self.association_prefix(resource, prefix_options)?,
            resource_type.collection_name()
        ))
    }

    fn push_id(
        &self,
        resource: &str,
        id: Option<&Value>,
        path: &mut String,
    ) -> Result<(), ResourceError> {
        match id.filter(|value| !is_blank(value)) {
            Some(id) => {
                path.push('/');
                path.push_str(&urlencoding::encode(&param_to_string(id)));
                Ok(())
            }
            None if self.registry.lookup(resource)?.is_singleton() => Ok(()),
            None => Err(ResourceError::PathResolutionFailed {
                resource: resource.to_string(),
                operation: ResourceOperation::Find.as_str(),
            }),
        }
    }
}

/// Renders a parameter value as path or query text.
///
/// Strings are used verbatim, `null` is empty, everything else uses its
/// JSON rendering.
#[must_use]
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Returns `true` for `null` and the empty string.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Renders `?k=v&k2=v2`, or `""` when there are no parameters.
///
/// Array values repeat the key with a `[]` suffix.
#[must_use]
pub fn query_string(params: &Params) -> String {
    if params.is_empty() {
        return String::new();
    }

    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                let key = format!("{key}[]");
                for item in items {
                    pairs.push(format!(
                        "{}={}",
                        urlencoding::encode(&key),
                        urlencoding::encode(&param_to_string(item))
                    ));
                }
            }
            other => pairs.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&param_to_string(other))
            )),
        }
    }

    format!("?{}", pairs.join("&"))
}

/// Returns the `{name}` placeholders of a template, in order.
#[must_use]
pub fn template_placeholders(template: &str) -> Vec<String> {
    let mut placeholders = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() && !placeholders.iter().any(|p| p == name) {
                    placeholders.push(name.to_string());
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    placeholders
}

/// Interpolates `{name}` placeholders in a template.
///
/// Placeholders without a value are left in place.
///
/// # Example
///
/// ```rust
/// use reactive_resource::rest::build_path;
/// use std::collections::HashMap;
///
/// let mut ids = HashMap::new();
/// ids.insert("account_id", "7");
///
/// assert_eq!(build_path("/accounts/{account_id}/", &ids), "/accounts/7/");
/// ```
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn build_path<V: Display>(template: &str, ids: &HashMap<&str, V>) -> String {
    let mut result = template.to_string();

    for (key, value) in ids {
        let placeholder = format!("{{{key}}}");
        result = result.replace(&placeholder, &value.to_string());
    }

    result
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceOperation>();
    assert_send_sync::<PrefixSegment>();
    assert_send_sync::<ResourcePaths<'static>>();
};
