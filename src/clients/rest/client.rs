//! REST client over a configured site.
//!
//! Paths handed to [`RestClient`] are complete: prefix, nesting, format
//! extension and query string have already been resolved by the resource
//! layer. The client only validates and dispatches them.

use crate::clients::rest::RestError;
use crate::clients::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::config::ResourceConfig;

/// REST client with `get`, `post`, `put` and `delete` helpers.
///
/// # Thread Safety
///
/// `RestClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use reactive_resource::{ResourceConfig, SiteUrl};
/// use reactive_resource::clients::RestClient;
///
/// let config = ResourceConfig::builder()
///     .site(SiteUrl::new("https://api.avvo.com")?)
///     .build()?;
/// let client = RestClient::new(&config)?;
///
/// let response = client.get("/api/1/lawyers/1.json").await?;
/// let body = serde_json::json!({"lawyer": {"name": "Ada"}});
/// let response = client.post("/api/1/lawyers.json", body).await?;
/// ```
#[derive(Debug)]
pub struct RestClient {
    http_client: HttpClient,
}

// Verify RestClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestClient>();
};

impl RestClient {
    /// Creates a new REST client for the configured site.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Http`] if the transport cannot be created.
    pub fn new(config: &ResourceConfig) -> Result<Self, RestError> {
        Ok(Self {
            http_client: HttpClient::new(config)?,
        })
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is empty or relative.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn get(&self, path: &str) -> Result<HttpResponse, RestError> {
        self.make_request(HttpMethod::Get, path, None).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is empty or relative.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<HttpResponse, RestError> {
        self.make_request(HttpMethod::Post, path, Some(body)).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is empty or relative.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn put(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<HttpResponse, RestError> {
        self.make_request(HttpMethod::Put, path, Some(body)).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is empty or relative.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn delete(&self, path: &str) -> Result<HttpResponse, RestError> {
        self.make_request(HttpMethod::Delete, path, None).await
    }

    /// Sends a request with an arbitrary method.
    ///
    /// POST and PUT without a body send an empty JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is empty or relative.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, RestError> {
        let body = match (method, body) {
            (HttpMethod::Post | HttpMethod::Put, None) => Some(serde_json::json!({})),
            (_, body) => body,
        };
        self.make_request(method, path, body).await
    }

    async fn make_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, RestError> {
        let path = Self::validate_path(path)?;

        let mut builder = HttpRequest::builder(method, path);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let request = builder
            .build()
            .map_err(|e| RestError::Http(crate::clients::HttpError::InvalidRequest(e)))?;

        self.http_client.request(request).await.map_err(Into::into)
    }

    /// Rejects empty or relative paths.
    fn validate_path(path: &str) -> Result<&str, RestError> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed == "/" || !trimmed.starts_with('/') {
            return Err(RestError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(trimmed)
    }
}
