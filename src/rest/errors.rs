//! Error types for resource operations.
//!
//! [`ResourceError`] extends [`RestError`] with resource-level
//! semantics: missing records, failed validations, unknown types and
//! associations, and malformed nesting.
//!
//! # Error Handling
//!
//! HTTP status codes are mapped to semantic variants:
//!
//! - **404**: [`ResourceError::NotFound`] - Record doesn't exist
//! - **422**: [`ResourceError::ValidationFailed`] - Validation errors from the server
//! - **Other 4xx/5xx**: [`ResourceError::Rest`] - Wrapped transport error
//!
//! # Example
//!
//! ```rust,ignore
//! use reactive_resource::rest::ResourceError;
//!
//! match client.find("Lawyer", 123, &Params::new()).await {
//!     Ok(lawyer) => println!("Found: {:?}", lawyer.get("name")),
//!     Err(ResourceError::NotFound { resource, id }) => {
//!         println!("{resource} with id {id} not found");
//!     }
//!     Err(ResourceError::ValidationFailed { errors, .. }) => {
//!         for (field, messages) in errors {
//!             println!("{field}: {messages:?}");
//!         }
//!     }
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use std::collections::HashMap;

use crate::clients::{HttpError, HttpResponseError, RestError};
use crate::error::ConfigError;
use thiserror::Error;

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The record was not found (HTTP 404).
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// The resource type name.
        resource: String,
        /// The requested id (`"unknown"` when none was given).
        id: String,
    },

    /// The server rejected the record (HTTP 422).
    #[error("Validation failed: {errors:?}")]
    ValidationFailed {
        /// Field name to error messages.
        errors: HashMap<String, Vec<String>>,
        /// The `X-Request-Id` of the failed request.
        request_id: Option<String>,
    },

    /// A resource type could not be located in the registry.
    #[error("Resource type '{name}' not found (looked up from '{from}')")]
    TypeNotFound {
        /// The type name that was searched for.
        name: String,
        /// The type whose namespace the search started in.
        from: String,
    },

    /// The type declares no association with this attribute name.
    #[error("{resource} has no association named '{attribute}'")]
    UnknownAssociation {
        /// The resource type name.
        resource: String,
        /// The requested attribute.
        attribute: String,
    },

    /// A belongs-to association was resolved without a foreign key value.
    #[error("{resource} has no value for '{foreign_key}'")]
    MissingForeignKey {
        /// The resource type name.
        resource: String,
        /// The missing `<attribute>_id` key.
        foreign_key: String,
    },

    /// The belongs-to graph is deeper than allowed (usually a cycle).
    #[error("belongs_to nesting under {resource} exceeds {limit} levels")]
    NestingTooDeep {
        /// The type at which the limit was hit.
        resource: String,
        /// The configured limit.
        limit: usize,
    },

    /// No path can be built for the operation.
    #[error("Cannot resolve path for {resource}::{operation}")]
    PathResolutionFailed {
        /// The resource type name.
        resource: String,
        /// The operation name.
        operation: &'static str,
    },

    /// A type declaration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A response body could not be interpreted.
    #[error("Failed to decode {resource} response: {message}")]
    Serialization {
        /// The resource type name.
        resource: String,
        /// Description of the problem.
        message: String,
    },

    /// A transport-level error.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A REST client error.
    #[error(transparent)]
    Rest(#[from] RestError),
}

impl ResourceError {
    /// Creates a `ResourceError` from a status code and response body.
    ///
    /// - 404 becomes [`ResourceError::NotFound`]
    /// - 422 becomes [`ResourceError::ValidationFailed`] with parsed errors
    /// - anything else is wrapped as an [`HttpResponseError`]
    #[must_use]
    pub fn from_http_response(
        code: u16,
        body: &serde_json::Value,
        resource: &str,
        id: Option<&str>,
        request_id: Option<&str>,
    ) -> Self {
        match code {
            404 => Self::NotFound {
                resource: resource.to_string(),
                id: id.unwrap_or("unknown").to_string(),
            },
            422 => Self::ValidationFailed {
                errors: parse_validation_errors(body),
                request_id: request_id.map(ToString::to_string),
            },
            _ => Self::Http(HttpError::Response(HttpResponseError {
                code,
                message: body.to_string(),
                body: body.clone(),
                request_id: request_id.map(ToString::to_string),
            })),
        }
    }

    /// Maps a transport error into resource terms.
    ///
    /// Server answers of 404 and 422 become [`ResourceError::NotFound`] and
    /// [`ResourceError::ValidationFailed`], and a successful answer that is
    /// not JSON becomes [`ResourceError::Serialization`]. Everything else is
    /// kept as [`ResourceError::Rest`].
    #[must_use]
    pub fn from_rest_error(error: RestError, resource: &str, id: Option<&str>) -> Self {
        match error {
            RestError::Http(HttpError::Response(response))
                if response.code == 404 || response.code == 422 =>
            {
                Self::from_http_response(
                    response.code,
                    &response.body,
                    resource,
                    id,
                    response.request_id.as_deref(),
                )
            }
            RestError::Http(HttpError::InvalidBody { message, .. }) => Self::Serialization {
                resource: resource.to_string(),
                message,
            },
            other => Self::Rest(other),
        }
    }

    /// Returns the request id associated with this error, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { request_id, .. } => request_id.as_deref(),
            Self::Http(HttpError::Response(e))
            | Self::Rest(RestError::Http(HttpError::Response(e))) => e.request_id.as_deref(),
            Self::Http(HttpError::MaxRetries(e))
            | Self::Rest(RestError::Http(HttpError::MaxRetries(e))) => e.request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` for [`ResourceError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Accepts `{"errors": {...}}`, `{"errors": [...]}`, `{"errors": "..."}`
/// and a bare field map.
fn parse_validation_errors(body: &serde_json::Value) -> HashMap<String, Vec<String>> {
    fn messages(value: &serde_json::Value) -> Vec<String> {
        match value {
            serde_json::Value::Array(arr) => arr
                .iter()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), ToString::to_string))
                .collect(),
            serde_json::Value::String(s) => vec![s.clone()],
            other => vec![other.to_string()],
        }
    }

    let mut result = HashMap::new();

    let errors = body.get("errors").unwrap_or(body);
    match errors {
        serde_json::Value::Object(map) => {
            for (field, value) in map {
                result.insert(field.clone(), messages(value));
            }
        }
        serde_json::Value::Array(arr) if !arr.is_empty() => {
            result.insert("base".to_string(), messages(errors));
        }
        serde_json::Value::String(s) => {
            result.insert("base".to_string(), vec![s.clone()]);
        }
        _ => {}
    }

    result
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};
