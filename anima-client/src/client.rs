//! Anima client — create animas, submit events, fetch memory packs.

use anima_core::config::ClientSettings;
use anima_core::{
    Anima, AnimaError, ClientConfig, Event, MemoryPack, MemoryPackRecord, Metadata, NewAnima,
    NewEvent, Result, resolve_event_type,
};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use tracing::debug;

use crate::transport::Transport;

/// Parameters for [`AnimaClient::latest_memory_pack`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackRequest {
    /// Anima to fetch for; falls back to the configured default.
    pub anima_id: Option<String>,
    /// Free-text query the pack should be compiled around.
    pub query: Option<String>,
    /// Named compilation preset.
    pub preset: Option<String>,
}

impl PackRequest {
    /// Fetch for a specific anima.
    #[must_use]
    pub fn for_anima(anima_id: impl Into<String>) -> Self {
        Self {
            anima_id: Some(anima_id.into()),
            ..Self::default()
        }
    }

    /// Set the query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the preset.
    #[must_use]
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }
}

/// Optional fields for [`AnimaClient::submit_event`].
///
/// Anything left as `None` is omitted from the request body entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOptions {
    /// Overrides the configured default anima.
    pub anima_id: Option<String>,
    /// Conversation/session grouping key.
    pub session_id: Option<String>,
    /// Speaker role (`user`, `assistant`, `tool`, ...).
    pub role: Option<String>,
    /// Free-text author name.
    pub author: Option<String>,
    /// When the event happened, if not "now".
    pub occurred_at: Option<DateTime<Utc>>,
    /// Free-form metadata.
    pub meta: Option<Metadata>,
    /// Caller-assigned importance. NaN and infinities are rejected.
    pub importance_score: Option<f64>,
    /// Server-side deduplication key.
    pub dedupe_key: Option<String>,
}

impl EventOptions {
    /// Target a specific anima instead of the configured default.
    #[must_use]
    pub fn anima_id(mut self, anima_id: impl Into<String>) -> Self {
        self.anima_id = Some(anima_id.into());
        self
    }

    /// Set the session id.
    #[must_use]
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the speaker role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the author.
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set when the event happened.
    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    /// Attach metadata.
    #[must_use]
    pub fn meta(mut self, meta: Metadata) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Set the importance score.
    #[must_use]
    pub fn importance_score(mut self, score: f64) -> Self {
        self.importance_score = Some(score);
        self
    }

    /// Set the deduplication key.
    #[must_use]
    pub fn dedupe_key(mut self, key: impl Into<String>) -> Self {
        self.dedupe_key = Some(key.into());
        self
    }
}

/// Client for the Anima memory API.
///
/// Cheap to clone and safe to share across tasks: it holds only immutable
/// configuration and a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct AnimaClient {
    transport: Transport,
}

impl AnimaClient {
    /// Create a client with an explicit credential; everything else comes
    /// from the environment or defaults.
    ///
    /// # Errors
    /// Returns `AnimaError::Config` for invalid environment values.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client entirely from `ANIMA_*` environment variables.
    ///
    /// # Errors
    /// Returns `AnimaError::Authentication` when `ANIMA_API_KEY` is unset.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client from an already-resolved configuration.
    ///
    /// # Errors
    /// Returns `AnimaError::Config` if the base URL or credential is unusable.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = Transport::new(config, Client::new(), HeaderMap::new())?;
        Ok(Self { transport })
    }

    /// Start building a client.
    #[must_use]
    pub fn builder() -> AnimaClientBuilder {
        AnimaClientBuilder::default()
    }

    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    /// The anima used when an operation does not name one.
    #[must_use]
    pub fn default_anima_id(&self) -> Option<&str> {
        self.config().anima_id()
    }

    /// Create a new anima.
    ///
    /// # Errors
    /// Server-side validation failures surface as `AnimaError::Validation`.
    pub async fn create_anima(&self, anima: &NewAnima) -> Result<Anima> {
        debug!(name = %anima.name, "Creating anima");
        self.transport
            .request(Method::POST, &["animas"], &[], Some(anima))
            .await
    }

    /// Fetch the most recently compiled memory pack.
    ///
    /// Returns `Ok(None)` when the server has no pack for this anima yet.
    ///
    /// # Errors
    /// `AnimaError::Config` if no anima id is available (before any request);
    /// otherwise any transport error.
    pub async fn latest_memory_pack(&self, request: &PackRequest) -> Result<Option<MemoryPack>> {
        let anima_id = self
            .config()
            .effective_anima_id(request.anima_id.as_deref())?;

        let mut query: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let Some(q) = request.query.as_deref() {
            query.push(("query", q));
        }
        if let Some(p) = request.preset.as_deref() {
            query.push(("preset", p));
        }

        let record: Option<MemoryPackRecord> = self
            .transport
            .request_optional::<_, ()>(
                Method::GET,
                &["animas", anima_id, "memory-packs", "latest"],
                &query,
                None,
            )
            .await?;

        if record.is_none() {
            debug!(anima_id, "No memory pack compiled yet");
        }
        Ok(record.map(MemoryPack::new))
    }

    /// Submit an event for server-side memory synthesis.
    ///
    /// `event_type` accepts a canonical tag (`"message.in"`) or a legacy
    /// alias in any casing (`"message_in"`, `"MESSAGE_IN"`).
    ///
    /// # Errors
    /// `AnimaError::Validation` for an unknown event type or a non-finite
    /// importance score and `AnimaError::Config` for a missing anima id, all
    /// before any request;
    /// otherwise any transport error.
    pub async fn submit_event(
        &self,
        event_type: &str,
        content: impl Into<String>,
        options: EventOptions,
    ) -> Result<Event> {
        let event_type = resolve_event_type(event_type)?;
        if let Some(score) = options.importance_score.filter(|s| !s.is_finite()) {
            return Err(AnimaError::validation(Some(format!(
                "importance_score must be a finite number, got {score}"
            ))));
        }
        let anima_id = self
            .config()
            .effective_anima_id(options.anima_id.as_deref())?
            .to_string();

        let payload = NewEvent {
            anima_id,
            event_type,
            content: content.into(),
            session_id: options.session_id,
            role: options.role,
            author: options.author,
            occurred_at: options.occurred_at,
            meta: options.meta,
            importance_score: options.importance_score,
            dedupe_key: options.dedupe_key,
        };

        debug!(anima_id = %payload.anima_id, event_type = %event_type, "Submitting event");
        self.transport
            .request(Method::POST, &["events"], &[], Some(&payload))
            .await
    }
}

/// Builder for [`AnimaClient`].
#[derive(Debug, Default)]
pub struct AnimaClientBuilder {
    settings: ClientSettings,
    headers: Vec<(String, String)>,
    http: Option<Client>,
}

impl AnimaClientBuilder {
    /// Start from pre-loaded settings, e.g. [`ClientSettings::from_file`].
    #[must_use]
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the API credential.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.settings.api_key = Some(api_key.into());
        self
    }

    /// Set the default anima used when an operation does not name one.
    #[must_use]
    pub fn anima_id(mut self, anima_id: impl Into<String>) -> Self {
        self.settings.anima_id = Some(anima_id.into());
        self
    }

    /// Set the API base URL. A trailing `/` is stripped.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.settings.base_url = Some(base_url.into());
        self
    }

    /// Set the per-request timeout in milliseconds.
    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.settings.timeout_ms = Some(timeout_ms);
        self
    }

    /// Send an extra header with every request. Authorization and
    /// content-type are always set by the client and cannot be replaced.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Use a caller-provided `reqwest::Client` (proxies, TLS roots, ...).
    #[must_use]
    pub fn http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build, filling unset values from the process environment.
    ///
    /// # Errors
    /// `AnimaError::Authentication` without a credential, `AnimaError::Config`
    /// for invalid values.
    pub fn build(self) -> Result<AnimaClient> {
        self.build_with_env(|key| std::env::var(key).ok())
    }

    /// Build, filling unset values from `env` instead of the process environment.
    ///
    /// # Errors
    /// Same as [`AnimaClientBuilder::build`].
    pub fn build_with_env<F>(self, env: F) -> Result<AnimaClient>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = self.settings.resolve_with(env)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AnimaError::Config(format!("invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| AnimaError::Config(format!("invalid value for header '{name}': {e}")))?;
            headers.append(name, value);
        }

        let transport = Transport::new(config, self.http.unwrap_or_default(), headers)?;
        Ok(AnimaClient { transport })
    }
}
