//! Error types for configuration and resource declaration.
//!
//! This module contains the error type returned while building a
//! [`ResourceConfig`](crate::ResourceConfig) or declaring resource types.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use reactive_resource::{ConfigError, SiteUrl};
//!
//! let result = SiteUrl::new("api.example.com");
//! assert!(matches!(result, Err(ConfigError::InvalidSiteUrl { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur during configuration or type declaration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Site URL is invalid.
    #[error("Invalid site URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://api.example.com/v1').")]
    InvalidSiteUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Basic auth user name cannot be empty.
    #[error("User name cannot be empty when HTTP basic authentication is configured.")]
    EmptyUser,

    /// Path prefix is not absolute.
    #[error("Invalid path prefix '{prefix}'. The prefix must start with '/' (e.g., '/api/1/').")]
    InvalidPrefix {
        /// The invalid prefix that was provided.
        prefix: String,
    },

    /// A resource type name is malformed.
    #[error("Invalid resource type name '{name}'. Expected CamelCase segments separated by '::' (e.g., 'Directory::Lawyer').")]
    InvalidTypeName {
        /// The invalid type name that was provided.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_site_url_error_message() {
        let error = ConfigError::InvalidSiteUrl {
            url: "not a url".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("not a url"));
        assert!(message.contains("scheme"));
    }

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField { field: "site" };
        let message = error.to_string();
        assert!(message.contains("site"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_invalid_type_name_error_message() {
        let error = ConfigError::InvalidTypeName {
            name: "lower::case".to_string(),
        };
        assert!(error.to_string().contains("lower::case"));
    }

    #[test]
    fn test_invalid_prefix_error_message() {
        let error = ConfigError::InvalidPrefix {
            prefix: "api/1/".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("api/1/"));
        assert!(message.contains("must start with '/'"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyUser;
        let _: &dyn std::error::Error = &error;
    }
}
