//! BIGSdb API client.
//!
//! Low-level HTTP client implementing [`Fetch`]. Navigation between entities
//! is implemented on the model types and only needs the trait.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{BigsdbError, Result};
use crate::traits::Fetch;

const USER_AGENT: &str = concat!("seqtypo/", env!("CARGO_PKG_VERSION"));

/// HTTP client for a BIGSdb REST service.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use seqtypo::{BigsdbClient, ClientConfig};
///
/// # fn example() -> seqtypo::Result<()> {
/// // Create from environment variables
/// let client = BigsdbClient::from_env()?;
///
/// // Or use a preset
/// let client = BigsdbClient::with_config(ClientConfig::pasteur())?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BigsdbClient {
    http: Client,
    base_url: Arc<Url>,
    api_key: Option<String>,
}

impl std::fmt::Debug for BigsdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigsdbClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BigsdbClient {
    /// Create a client from environment variables (see [`ClientConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds an invalid setting.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a client for the given REST root with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    /// Create a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or a header is invalid.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        // Ensure base URL ends with / so relative links join below it
        let base_url_str = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };

        let base_url = Url::parse(&base_url_str)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| BigsdbError::ConfigInvalid(format!("header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| BigsdbError::ConfigInvalid(format!("header value for '{name}': {e}")))?;
            headers.insert(name, value);
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .build()
            .map_err(BigsdbError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            api_key: config.api_key,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        Ok(self.base_url.join(url)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, url: &str) -> Result<Response> {
        let url = self.resolve(url)?;

        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(BigsdbError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a POST request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post(&self, url: &str, body: &Value) -> Result<Response> {
        let url = self.resolve(url)?;

        let response = self
            .authorize(self.http.post(url))
            .json(body)
            .send()
            .await
            .map_err(BigsdbError::HttpError)?;

        Self::check_response(response).await
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = Self::extract_error_message(response, status).await;
        tracing::debug!(status = status.as_u16(), %message, "request failed");
        Err(BigsdbError::Api {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Extract error message from a failed response.
    ///
    /// BIGSdb reports errors as `{"status": 404, "message": "..."}`; other
    /// bodies fall back to the reason phrase.
    async fn extract_error_message(response: Response, status: reqwest::StatusCode) -> String {
        let reason = status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {status}"), str::to_string);

        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return reason,
        };

        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        reason
    }
}

#[async_trait]
impl Fetch for BigsdbClient {
    fn root_url(&self) -> &str {
        self.base_url.as_str()
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(BigsdbError::HttpError)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(BigsdbError::HttpError)
    }

    async fn post_json(&self, url: &str, payload: &Value) -> Result<Value> {
        let response = self.post(url, payload).await?;
        let bytes = response.bytes().await.map_err(BigsdbError::HttpError)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let config = ClientConfig::new("https://rest.pubmlst.org").with_api_key("secret-key");
        let client = BigsdbClient::with_config(config).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("BigsdbClient"));
        assert!(debug.contains("base_url"));
        // Key should not be in debug output
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = BigsdbClient::new("https://bigsdb.pasteur.fr/api").unwrap();
        let client2 = BigsdbClient::new("https://bigsdb.pasteur.fr/api/").unwrap();
        assert_eq!(client1.base_url().as_str(), client2.base_url().as_str());
        assert_eq!(client1.root_url(), "https://bigsdb.pasteur.fr/api/");
    }

    #[test]
    fn test_absolute_links_are_kept() {
        let client = BigsdbClient::new("https://bigsdb.pasteur.fr/api").unwrap();
        let url = client
            .resolve("https://rest.pubmlst.org/db/pubmlst_neisseria_seqdef")
            .unwrap();
        assert_eq!(url.as_str(), "https://rest.pubmlst.org/db/pubmlst_neisseria_seqdef");

        let url = client.resolve("db/pubmlst_test").unwrap();
        assert_eq!(url.as_str(), "https://bigsdb.pasteur.fr/api/db/pubmlst_test");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let config = ClientConfig::new("https://rest.pubmlst.org").with_header("bad header", "x");
        let err = BigsdbClient::with_config(config).unwrap_err();
        assert!(matches!(err, BigsdbError::ConfigInvalid(_)));
    }
}
