//! Configuration types for resource clients.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ResourceConfig`]: Where resources live and how to talk to them
//! - [`ResourceConfigBuilder`]: A builder for constructing [`ResourceConfig`] instances
//! - [`SiteUrl`]: A validated site URL
//! - [`Password`]: A basic-auth password with masked debug output
//! - [`Format`]: Body format and path extension
//!
//! # Example
//!
//! ```rust
//! use reactive_resource::{Format, ResourceConfig, SiteUrl};
//!
//! let config = ResourceConfig::builder()
//!     .site(SiteUrl::new("https://api.example.com").unwrap())
//!     .prefix("/api/1/")
//!     .format(Format::Json)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.prefix(), "/api/1/");
//! ```

mod format;
mod newtypes;

pub use format::Format;
pub use newtypes::{Password, SiteUrl};

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine;

use crate::error::ConfigError;

/// Configuration shared by every resource type served from one site.
///
/// # Thread Safety
///
/// `ResourceConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ResourceConfig {
    site: SiteUrl,
    prefix: String,
    format: Format,
    user: Option<String>,
    password: Option<Password>,
    headers: HashMap<String, String>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
    tries: u32,
}

impl ResourceConfig {
    /// Creates a new builder for constructing a `ResourceConfig`.
    #[must_use]
    pub fn builder() -> ResourceConfigBuilder {
        ResourceConfigBuilder::new()
    }

    /// Returns the site URL.
    #[must_use]
    pub const fn site(&self) -> &SiteUrl {
        &self.site
    }

    /// Returns the path prefix placed before every resource path.
    ///
    /// May contain `{name}` placeholders filled from prefix options.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the default format for resource types that don't override it.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Returns the basic-auth user, if configured.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Returns the basic-auth password, if configured.
    #[must_use]
    pub const fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }

    /// Returns the extra headers sent with every request.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns how many times a request is attempted on 429/500 responses.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    /// Returns the `Authorization` header value for basic auth, if a user is set.
    #[must_use]
    pub fn basic_auth_header(&self) -> Option<String> {
        let user = self.user.as_deref()?;
        let password = self.password.as_ref().map_or("", AsRef::as_ref);
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
        Some(format!("Basic {encoded}"))
    }
}

// Verify ResourceConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceConfig>();
};

/// Builder for constructing [`ResourceConfig`] instances.
///
/// `site` is the only required field.
///
/// # Defaults
///
/// - `prefix`: the site path followed by `/` (`"/"` for a bare host)
/// - `format`: [`Format::Json`]
/// - `tries`: `1` (no retries)
/// - everything else: unset
#[derive(Debug, Default)]
pub struct ResourceConfigBuilder {
    site: Option<SiteUrl>,
    prefix: Option<String>,
    format: Option<Format>,
    user: Option<String>,
    password: Option<Password>,
    headers: HashMap<String, String>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
    tries: Option<u32>,
}

impl ResourceConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the site URL (required).
    #[must_use]
    pub fn site(mut self, site: SiteUrl) -> Self {
        self.site = Some(site);
        self
    }

    /// Overrides the path prefix.
    ///
    /// The prefix must start with `/`. A missing trailing `/` is added, and
    /// `""` places resources directly under the host root.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the default format.
    #[must_use]
    pub const fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the basic-auth user.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the basic-auth password.
    #[must_use]
    pub fn password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many times to attempt requests that fail with 429 or 500.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    /// Builds the [`ResourceConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `site` is not set,
    /// [`ConfigError::EmptyUser`] if an empty user name was given, and
    /// [`ConfigError::InvalidPrefix`] if the prefix is not absolute.
    pub fn build(self) -> Result<ResourceConfig, ConfigError> {
        let site = self
            .site
            .ok_or(ConfigError::MissingRequiredField { field: "site" })?;

        if self.user.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::EmptyUser);
        }

        let prefix = match self.prefix {
            Some(prefix) => normalize_prefix(prefix)?,
            None => format!("{}/", site.path()),
        };

        Ok(ResourceConfig {
            site,
            prefix,
            format: self.format.unwrap_or_default(),
            user: self.user,
            password: self.password,
            headers: self.headers,
            user_agent_prefix: self.user_agent_prefix,
            timeout: self.timeout,
            tries: self.tries.unwrap_or(1).max(1),
        })
    }
}

fn normalize_prefix(prefix: String) -> Result<String, ConfigError> {
    if prefix.is_empty() {
        return Ok("/".to_string());
    }
    if !prefix.starts_with('/') {
        return Err(ConfigError::InvalidPrefix { prefix });
    }
    if prefix.ends_with('/') {
        Ok(prefix)
    } else {
        Ok(format!("{prefix}/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteUrl {
        SiteUrl::new("https://api.example.com/api/1").unwrap()
    }

    #[test]
    fn test_builder_requires_site() {
        let result = ResourceConfigBuilder::new().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "site" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ResourceConfig::builder().site(site()).build().unwrap();

        assert_eq!(config.prefix(), "/api/1/");
        assert_eq!(config.format(), Format::Json);
        assert_eq!(config.tries(), 1);
        assert!(config.user().is_none());
        assert!(config.timeout().is_none());
        assert!(config.basic_auth_header().is_none());
    }

    #[test]
    fn test_default_prefix_for_bare_host() {
        let config = ResourceConfig::builder()
            .site(SiteUrl::new("https://api.example.com").unwrap())
            .build()
            .unwrap();
        assert_eq!(config.prefix(), "/");
    }

    #[test]
    fn test_prefix_override() {
        let config = ResourceConfig::builder()
            .site(site())
            .prefix("/v2/")
            .build()
            .unwrap();
        assert_eq!(config.prefix(), "/v2/");
    }

    #[test]
    fn test_empty_prefix_means_host_root() {
        let config = ResourceConfig::builder()
            .site(site())
            .prefix("")
            .build()
            .unwrap();
        assert_eq!(config.prefix(), "/");
    }

    #[test]
    fn test_prefix_gets_trailing_slash() {
        let config = ResourceConfig::builder()
            .site(site())
            .prefix("/accounts/{account_id}")
            .build()
            .unwrap();
        assert_eq!(config.prefix(), "/accounts/{account_id}/");
    }

    #[test]
    fn test_relative_prefix_is_rejected() {
        let result = ResourceConfig::builder()
            .site(site())
            .prefix("api/1/")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPrefix { ref prefix }) if prefix == "api/1/"
        ));
    }

    #[test]
    fn test_basic_auth_header() {
        let config = ResourceConfig::builder()
            .site(site())
            .user("Aladdin")
            .password(Password::new("open sesame"))
            .build()
            .unwrap();

        assert_eq!(
            config.basic_auth_header().as_deref(),
            Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
        );
    }

    #[test]
    fn test_empty_user_is_rejected() {
        let result = ResourceConfig::builder().site(site()).user("").build();
        assert!(matches!(result, Err(ConfigError::EmptyUser)));
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = ResourceConfig::builder()
            .site(site())
            .format(Format::ExtensionlessJson)
            .header("X-Api-Key", "abc")
            .user_agent_prefix("MyApp/1.0")
            .timeout(Duration::from_secs(5))
            .tries(3)
            .build()
            .unwrap();

        assert_eq!(config.format(), Format::ExtensionlessJson);
        assert_eq!(config.headers().get("X-Api-Key"), Some(&"abc".to_string()));
        assert_eq!(config.user_agent_prefix(), Some("MyApp/1.0"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.tries(), 3);
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResourceConfig>();
    }
}
