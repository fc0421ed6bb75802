//! `OpenAI` `Provider` implementation.

use llm_runner::ChatResponse;
use llm_runner::error::LlmError;
use llm_runner::provider::{ChatParams, Provider};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use crate::config::OpenAiConfig;
use crate::convert;

/// Chat Completions provider implementing [`Provider`].
///
/// Speaks the `OpenAI` wire format, so it also works against compatible
/// proxies such as `LiteLLM` by pointing [`OpenAiConfig::base_url`] at them.
///
/// # Example
///
/// ```rust,no_run
/// use llm_runner::{ChatMessage, ChatParams, Provider};
/// use llm_runner_openai::{OpenAiConfig, OpenAiProvider};
///
/// # async fn example() -> Result<(), llm_runner::LlmError> {
/// let provider = OpenAiProvider::new(OpenAiConfig::from_env())?;
///
/// let response = provider.generate(&ChatParams {
///     model: "gpt-4o-mini".into(),
///     messages: vec![ChatMessage::user("Hello!")],
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a new provider from configuration.
    ///
    /// If `config.client` is `Some`, that client is reused for connection
    /// pooling. Otherwise a new client is built with the configured timeout.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = match config.client.clone() {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = config.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(|e| LlmError::Http {
                    status: None,
                    message: format!("Failed to build HTTP client: {e}"),
                    retryable: false,
                })?
            }
        };
        Ok(Self { config, client })
    }

    /// Build the default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", self.config.api_key);
        headers.insert(
            "authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|_| LlmError::Auth("API key contains invalid header characters".into()))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        if let Some(org) = &self.config.organization {
            headers.insert(
                "openai-organization",
                HeaderValue::from_str(org).map_err(|_| {
                    LlmError::InvalidRequest(
                        "Organization ID contains invalid header characters".into(),
                    )
                })?,
            );
        }

        Ok(headers)
    }

    /// Build the full URL for the chat completions endpoint.
    fn completions_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// Send a request and return the raw response.
    async fn send_request(&self, params: &ChatParams) -> Result<reqwest::Response, LlmError> {
        let request_body = convert::build_request(params)?;
        let headers = self.default_headers()?;

        debug!(
            messages = params.messages.len(),
            tools = params.tools.as_ref().map_or(0, Vec::len),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .headers(headers)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        elapsed_ms: self
                            .config
                            .timeout
                            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
                    }
                } else {
                    LlmError::Http {
                        status: e.status().map(|s| {
                            http::StatusCode::from_u16(s.as_u16())
                                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
                        }),
                        message: e.to_string(),
                        retryable: e.is_connect(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let http_status = http::StatusCode::from_u16(status.as_u16())
                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
            return Err(convert::convert_error(http_status, &body));
        }

        Ok(response)
    }
}

impl Provider for OpenAiProvider {
    #[instrument(skip_all, fields(model = %params.model))]
    async fn generate(&self, params: &ChatParams) -> Result<ChatResponse, LlmError> {
        let response = self.send_request(params).await?;

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::ResponseFormat {
                message: format!("Failed to read response body: {e}"),
                raw: String::new(),
            })?;

        let api_response: crate::types::Response =
            serde_json::from_str(&body).map_err(|e| LlmError::ResponseFormat {
                message: format!("Failed to parse chat completion: {e}"),
                raw: body.clone(),
            })?;

        convert::convert_response(api_response, &body)
    }
}
