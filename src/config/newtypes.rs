//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated site URL: the root every resource path is resolved against.
///
/// The site is split into an origin (`scheme://host[:port]`) and an optional
/// path. The path becomes the default resource prefix.
///
/// # Example
///
/// ```rust
/// use reactive_resource::SiteUrl;
///
/// let site = SiteUrl::new("https://api.example.com/v1/").unwrap();
/// assert_eq!(site.scheme(), "https");
/// assert_eq!(site.host_name(), "api.example.com");
/// assert_eq!(site.origin(), "https://api.example.com");
/// assert_eq!(site.path(), "/v1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteUrl {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
    origin_end: usize,
}

impl SiteUrl {
    /// Creates a new validated site URL.
    ///
    /// Trailing slashes, query strings and fragments are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSiteUrl`] if the URL is invalid.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into();
        let invalid = || ConfigError::InvalidSiteUrl { url: raw.clone() };

        let mut url = raw.trim().to_string();
        if let Some(cut) = url.find(['?', '#']) {
            url.truncate(cut);
        }
        while url.ends_with('/') && !url.ends_with("://") {
            url.pop();
        }

        let scheme_end = url.find("://").ok_or_else(invalid)?;
        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        if host_start >= url.len() {
            return Err(invalid());
        }

        // Host ends at port or path, origin ends at path
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/'])
            .map_or(url.len(), |i| host_start + i);
        let origin_end = remainder.find('/').map_or(url.len(), |i| host_start + i);

        if host_end == host_start {
            return Err(invalid());
        }

        let port = &url[host_end..origin_end];
        if let Some(port) = port.strip_prefix(':') {
            if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
            origin_end,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }

    /// Returns `scheme://host[:port]`.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.url[..self.origin_end]
    }

    /// Returns the path portion without a trailing slash, or `""`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.url[self.origin_end..]
    }
}

impl AsRef<str> for SiteUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for SiteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Serialize for SiteUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for SiteUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A password for HTTP basic authentication.
///
/// # Security
///
/// The `Debug` implementation masks the value, displaying only
/// `Password(*****)` instead of the actual secret.
///
/// # Example
///
/// ```rust
/// use reactive_resource::Password;
///
/// let password = Password::new("hunter2");
/// assert_eq!(format!("{:?}", password), "Password(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wraps a password. Empty passwords are allowed.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(*****)")
    }
}
