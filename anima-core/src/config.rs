//! Client configuration.
//!
//! [`ClientSettings`] is the partial, user-facing layer: every field is
//! optional and it can be loaded from TOML. [`ClientSettings::resolve`] fills
//! the gaps from the environment and from built-in defaults, producing an
//! immutable [`ClientConfig`]. Explicit values always win over environment
//! values.
//!
//! ```toml
//! api_key = "ak_live_..."
//! anima_id = "an_123"
//! base_url = "https://api.anima.dev"
//! timeout_ms = 30000
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnimaError, Result};

/// Production endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.anima.dev";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Environment variable holding the API credential.
pub const ENV_API_KEY: &str = "ANIMA_API_KEY";
/// Environment variable holding the default anima id.
pub const ENV_ANIMA_ID: &str = "ANIMA_ID";
/// Environment variable holding the base endpoint URL.
pub const ENV_BASE_URL: &str = "ANIMA_BASE_URL";
/// Environment variable holding the request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "ANIMA_TIMEOUT_MS";

/// Partial client settings, loadable from TOML.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// API credential.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Default anima used when an operation does not name one.
    #[serde(default)]
    pub anima_id: Option<String>,
    /// Base endpoint URL, without the `/api` suffix.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-request timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ClientSettings {
    /// Load settings from a TOML string.
    ///
    /// # Errors
    /// Returns `AnimaError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| AnimaError::Config(e.to_string()))
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    /// Returns `AnimaError::Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnimaError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Set the API credential.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the default anima id.
    #[must_use]
    pub fn with_anima_id(mut self, anima_id: impl Into<String>) -> Self {
        self.anima_id = Some(anima_id.into());
        self
    }

    /// Set the base endpoint URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout in milliseconds.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Resolve against the process environment.
    ///
    /// # Errors
    /// See [`ClientSettings::resolve_with`].
    pub fn resolve(self) -> Result<ClientConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve against an arbitrary environment lookup.
    ///
    /// # Errors
    /// - `AnimaError::Authentication` when no credential is available.
    /// - `AnimaError::Config` when the timeout is zero or not a number.
    pub fn resolve_with<F>(self, env: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<String>, key: &str| {
            non_empty(explicit).or_else(|| non_empty(env(key)))
        };

        let api_key = pick(self.api_key, ENV_API_KEY).ok_or_else(|| {
            AnimaError::authentication(Some(format!(
                "API key is required. Pass it explicitly or set {ENV_API_KEY}."
            )))
        })?;

        let anima_id = pick(self.anima_id, ENV_ANIMA_ID);

        let base_url = pick(self.base_url, ENV_BASE_URL)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_ms = match self.timeout_ms {
            Some(ms) => ms,
            None => match non_empty(env(ENV_TIMEOUT_MS)) {
                Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                    AnimaError::Config(format!("{ENV_TIMEOUT_MS} must be an integer, got '{raw}'"))
                })?,
                None => DEFAULT_TIMEOUT_MS,
            },
        };
        if timeout_ms == 0 {
            return Err(AnimaError::Config("timeout_ms must be greater than zero".into()));
        }

        debug!(
            base_url = %base_url,
            timeout_ms,
            default_anima = anima_id.is_some(),
            "Resolved client configuration"
        );

        Ok(ClientConfig {
            api_key,
            anima_id,
            base_url,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("anima_id", &self.anima_id)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fully resolved, immutable client configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    anima_id: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl ClientConfig {
    /// The API credential.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The default anima id, if one was configured.
    #[must_use]
    pub fn anima_id(&self) -> Option<&str> {
        self.anima_id.as_deref()
    }

    /// Base endpoint URL, trailing slash stripped.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Per-request timeout in whole milliseconds.
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Pick the anima to act on: an explicit id wins over the configured default.
    ///
    /// # Errors
    /// Returns `AnimaError::Config` when neither is available.
    pub fn effective_anima_id<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str> {
        explicit
            .filter(|id| !id.is_empty())
            .or(self.anima_id.as_deref())
            .ok_or_else(|| {
                AnimaError::Config(format!(
                    "anima_id is required. Pass it to the call, configure a default, or set {ENV_ANIMA_ID}."
                ))
            })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("anima_id", &self.anima_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_credential_is_an_authentication_error() {
        let err = ClientSettings::default().resolve_with(env(&[])).unwrap_err();
        assert!(matches!(err, AnimaError::Authentication { .. }));
        assert!(err.to_string().contains(ENV_API_KEY));
    }

    #[test]
    fn empty_credential_counts_as_missing() {
        let err = ClientSettings::default()
            .with_api_key("")
            .resolve_with(env(&[(ENV_API_KEY, "  ")]))
            .unwrap_err();
        assert!(matches!(err, AnimaError::Authentication { .. }));
    }

    #[test]
    fn defaults_apply() {
        let cfg = ClientSettings::default()
            .with_api_key("k")
            .resolve_with(env(&[]))
            .unwrap();
        assert_eq!(cfg.api_key(), "k");
        assert_eq!(cfg.anima_id(), None);
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout_ms(), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn environment_fills_gaps() {
        let cfg = ClientSettings::default()
            .resolve_with(env(&[
                (ENV_API_KEY, "env-key"),
                (ENV_ANIMA_ID, "env-anima"),
                (ENV_BASE_URL, "http://localhost:8000/"),
                (ENV_TIMEOUT_MS, "1500"),
            ]))
            .unwrap();
        assert_eq!(cfg.api_key(), "env-key");
        assert_eq!(cfg.anima_id(), Some("env-anima"));
        assert_eq!(cfg.base_url(), "http://localhost:8000");
        assert_eq!(cfg.timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let cfg = ClientSettings::default()
            .with_api_key("k")
            .with_anima_id("a1")
            .with_base_url("https://staging.example.com//")
            .with_timeout_ms(250)
            .resolve_with(env(&[
                (ENV_API_KEY, "env-key"),
                (ENV_ANIMA_ID, "env-anima"),
                (ENV_BASE_URL, "http://localhost:8000"),
                (ENV_TIMEOUT_MS, "1500"),
            ]))
            .unwrap();
        assert_eq!(cfg.api_key(), "k");
        assert_eq!(cfg.anima_id(), Some("a1"));
        assert_eq!(cfg.base_url(), "https://staging.example.com");
        assert_eq!(cfg.timeout_ms(), 250);
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let err = ClientSettings::default()
            .with_api_key("k")
            .resolve_with(env(&[(ENV_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, AnimaError::Config(_)));

        let err = ClientSettings::default()
            .with_api_key("k")
            .with_timeout_ms(0)
            .resolve_with(env(&[]))
            .unwrap_err();
        assert!(matches!(err, AnimaError::Config(_)));
    }

    #[test]
    fn effective_anima_id_prefers_explicit() {
        let cfg = ClientSettings::default()
            .with_api_key("k")
            .with_anima_id("default")
            .resolve_with(env(&[]))
            .unwrap();
        assert_eq!(cfg.effective_anima_id(Some("other")).unwrap(), "other");
        assert_eq!(cfg.effective_anima_id(None).unwrap(), "default");
    }

    #[test]
    fn effective_anima_id_without_any_is_config_error() {
        let cfg = ClientSettings::default()
            .with_api_key("k")
            .resolve_with(env(&[]))
            .unwrap();
        let err = cfg.effective_anima_id(None).unwrap_err();
        assert!(matches!(err, AnimaError::Config(_)));
    }

    #[test]
    fn debug_output_redacts_the_credential() {
        let settings = ClientSettings::default().with_api_key("super-secret");
        assert!(!format!("{settings:?}").contains("super-secret"));
        let cfg = settings.resolve_with(env(&[])).unwrap();
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }

    #[test]
    fn parses_toml() {
        let settings = ClientSettings::from_toml(
            r#"
            api_key = "k"
            anima_id = "a1"
            timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("k"));
        assert_eq!(settings.anima_id.as_deref(), Some("a1"));
        assert_eq!(settings.base_url, None);
        assert_eq!(settings.timeout_ms, Some(5000));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = ClientSettings::from_toml("timeout_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, AnimaError::Config(_)));
    }
}
