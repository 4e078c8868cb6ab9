//! Authenticated HTTP transport.
//!
//! Every call goes to `<base_url>/api/<segments...>` with a bearer token and
//! a JSON content type, bounded by the configured timeout. Non-2xx responses
//! are mapped onto [`AnimaError`] via the `detail` field of the error body,
//! falling back to the status reason phrase.

use std::error::Error as StdError;
use std::time::Instant;

use anima_core::{AnimaError, ClientConfig, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Error body shape returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Low-level request executor shared by every client operation.
#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    config: ClientConfig,
    base: Url,
    headers: HeaderMap,
}

impl Transport {
    /// Create a transport.
    ///
    /// `extra_headers` are sent with every request; the authorization and
    /// content-type headers are applied on top of them and cannot be
    /// overridden.
    ///
    /// # Errors
    /// Returns `AnimaError::Config` if the base URL is not an http(s) URL or
    /// the credential cannot be encoded as a header value.
    pub fn new(config: ClientConfig, http: Client, extra_headers: HeaderMap) -> Result<Self> {
        let base = Url::parse(config.base_url())
            .map_err(|e| AnimaError::Config(format!("invalid base_url '{}': {e}", config.base_url())))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(AnimaError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                config.base_url()
            )));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|_| AnimaError::Config("api_key contains characters not allowed in a header".into()))?;
        auth.set_sensitive(true);

        let mut headers = extra_headers;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            http,
            config,
            base,
            headers,
        })
    }

    /// The configuration this transport was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build `<base_url>/api/<segments...>`, percent-encoding each segment.
    #[must_use]
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Cannot fail: `new` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// Perform a request and decode the JSON response.
    ///
    /// # Errors
    /// Any [`AnimaError`]; see the module docs for the mapping.
    pub async fn request<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (status, bytes) = self.send(method, segments, query, body).await?;
        decode(status, &bytes)
    }

    /// Like [`Transport::request`], but an empty body or a JSON `null`
    /// yields `Ok(None)`.
    ///
    /// # Errors
    /// Any [`AnimaError`]; see the module docs for the mapping.
    pub async fn request_optional<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (status, bytes) = self.send(method, segments, query, body).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        decode(status, &bytes)
    }

    async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<(StatusCode, Vec<u8>)>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(segments);
        let path = url.path().to_string();

        let mut builder = self
            .http
            .request(method.clone(), url)
            .headers(self.headers.clone())
            .timeout(self.config.timeout());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?
            .to_vec();
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if status.is_success() {
            debug!(%method, %path, status = status.as_u16(), elapsed_ms, "Anima API request");
            return Ok((status, bytes));
        }

        let err = error_from_response(status, &bytes);
        warn!(%method, %path, status = status.as_u16(), elapsed_ms, error = %err, "Anima API returned error");
        Err(err)
    }

    fn transport_error(&self, err: &reqwest::Error) -> AnimaError {
        if err.is_timeout() {
            let ms = self.config.timeout_ms();
            warn!("Anima API request timed out after {}ms", ms);
            AnimaError::api(format!("Request timed out after {ms}ms"), None)
        } else {
            let chain = error_chain(err);
            warn!("Anima API request failed: {}", chain);
            AnimaError::api(
                format!("Request failed: {chain}"),
                err.status().map(|s| s.as_u16()),
            )
        }
    }
}

/// Render an error followed by each of its causes, separated by `": "`.
///
/// reqwest's own `Display` stops at "error sending request", which hides
/// whether DNS, TLS or the connection failed.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn decode<T: DeserializeOwned>(status: StatusCode, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        AnimaError::api(
            format!("Failed to decode response body: {e}"),
            Some(status.as_u16()),
        )
    })
}

/// Map a non-2xx response onto the error taxonomy.
fn error_from_response(status: StatusCode, body: &[u8]) -> AnimaError {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| match d {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty());
    let message = detail.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });
    AnimaError::from_status(status.as_u16(), message)
}
