//! `OpenAI` provider configuration.

use std::time::Duration;

/// Default endpoint for the Chat Completions API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for the `OpenAI` provider.
///
/// The model is not part of the configuration: it travels with every
/// request in [`ChatParams::model`](llm_runner::ChatParams::model), so one
/// provider serves every runner.
///
/// Use struct update syntax with [`Default`] for ergonomic construction:
///
/// ```rust
/// use llm_runner_openai::OpenAiConfig;
///
/// let config = OpenAiConfig {
///     api_key: "sk-...".into(),
///     base_url: "http://localhost:4000".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key, sent as a bearer token.
    pub api_key: String,
    /// Base URL for the API. Override for proxies such as `LiteLLM`.
    pub base_url: String,
    /// Optional organization ID for API requests.
    pub organization: Option<String>,
    /// Request timeout. `None` uses reqwest's default.
    pub timeout: Option<Duration>,
    /// Pre-configured HTTP client for connection pooling across providers.
    /// When `None`, a new client is created.
    pub client: Option<reqwest::Client>,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("timeout", &self.timeout)
            .field("client", &self.client.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            organization: None,
            timeout: None,
            client: None,
        }
    }
}

impl OpenAiConfig {
    /// Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_ORGANIZATION`.
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            api_key: var("OPENAI_API_KEY").unwrap_or(defaults.api_key),
            base_url: var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            organization: var("OPENAI_ORGANIZATION"),
            ..defaults
        }
    }
}
