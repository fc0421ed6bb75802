//! Error types for completion requests and whole runs.
//!
//! Two layers:
//!
//! - [`LlmError`] is what a [`Provider`](crate::Provider) returns for one
//!   request. Provider crates map their native errors into it.
//! - [`RunError`] is what [`LlmRunner::run`](crate::LlmRunner::run)
//!   returns. It classifies a failed run into one of four kinds so callers
//!   can tell transport problems from response-shape problems from their
//!   own parser's rejections.
//!
//! Tool failures are neither: they become [`ToolResult`](crate::ToolResult)
//! errors and never abort a run.
//!
//! # Retryability
//!
//! The core never retries. `LlmError` keeps the `retryable` flag providers
//! set (HTTP 429, 503, ...) so callers can implement their own policy:
//!
//! ```rust
//! use llm_runner::LlmError;
//!
//! let err = LlmError::Timeout { elapsed_ms: 5000 };
//! assert!(err.is_retryable());
//!
//! let err = LlmError::Auth("bad key".into());
//! assert!(!err.is_retryable());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::output::OutputParseError;

/// The error type returned by provider operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// An HTTP-level failure (transport error, unexpected status code).
    ///
    /// `status` is `None` when no response was received.
    #[error("HTTP error (status={status:?}): {message}")]
    Http {
        /// The HTTP status code, if one was received.
        status: Option<http::StatusCode>,
        /// A human-readable description of the failure.
        message: String,
        /// Whether the caller may retry this request.
        retryable: bool,
    },

    /// The API key or token was rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The request was malformed (missing fields, invalid parameters).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A provider-specific error that doesn't map to another variant.
    #[error("Provider error ({code}): {message}")]
    Provider {
        /// Provider-defined error code (e.g. `"overloaded"`).
        code: String,
        /// Human-readable error description.
        message: String,
        /// Whether the caller may retry this request.
        retryable: bool,
    },

    /// The response arrived but its shape was unusable.
    #[error("Response format error: {message}")]
    ResponseFormat {
        /// What went wrong during parsing.
        message: String,
        /// The raw response body, for diagnostics.
        raw: String,
    },

    /// The request exceeded its deadline.
    #[error("Operation timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds elapsed before the timeout fired.
        elapsed_ms: u64,
    },

    /// The configured prompt-caching index points outside the transcript.
    #[error("cache control index {index} is out of range for a transcript of {len} messages")]
    CacheControlIndex {
        /// The configured index.
        index: usize,
        /// Length of the rendered transcript.
        len: usize,
    },
}

impl LlmError {
    /// Returns `true` if the error is transient and the request may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { retryable, .. } | Self::Provider { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Whether the error is about the completion service failing the request,
    /// as opposed to the shape of what it returned.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. }
                | Self::Auth(_)
                | Self::InvalidRequest(_)
                | Self::Provider { .. }
                | Self::Timeout { .. }
        )
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResponseFormat {
            message: err.to_string(),
            raw: String::new(),
        }
    }
}

/// Character counts of each prompt input value, keyed by input name.
///
/// Attached to [`RunError::Response`] so a failure caused by an oversized
/// prompt is visible without logging the (possibly private) values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharCounts(pub BTreeMap<String, usize>);

impl CharCounts {
    /// Counts the characters of every value in `input`.
    pub fn of<'a, I>(input: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        Self(
            input
                .into_iter()
                .map(|(k, v)| (k.clone(), v.chars().count()))
                .collect(),
        )
    }
}

impl fmt::Display for CharCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, count)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{key}': {count}")?;
        }
        f.write_str("}")
    }
}

/// Why a run failed.
///
/// Every variant except [`OutputParsing`](Self::OutputParsing) wraps the
/// underlying cause. `OutputParsing` carries the parser's own error
/// unchanged.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RunError {
    /// The completion service rejected or failed a request.
    #[error(
        "Failed to get response for query made by {query_source} with model {model}. \
         Prompt input character counts: {char_counts}"
    )]
    Response {
        /// Caller-supplied label of the query.
        query_source: String,
        /// The configured model.
        model: String,
        /// Per-input character counts of the prompt.
        char_counts: CharCounts,
        /// The provider error.
        #[source]
        source: LlmError,
    },

    /// The completion service answered with an unusable response.
    #[error("Failed to process response for query made by {query_source} with model {model}")]
    ResponseParsing {
        /// Caller-supplied label of the query.
        query_source: String,
        /// The configured model.
        model: String,
        /// The provider error.
        #[source]
        source: LlmError,
    },

    /// The output parser rejected the final text.
    #[error(transparent)]
    OutputParsing(#[from] OutputParseError),

    /// Any other failure.
    #[error("Unknown error occurred for query made by {query_source} with model {model}")]
    Unknown {
        /// Caller-supplied label of the query.
        query_source: String,
        /// The configured model.
        model: String,
        /// The underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RunError {
    /// Classifies a provider error raised during a run.
    pub fn from_llm(
        err: LlmError,
        query_source: &str,
        model: &str,
        char_counts: CharCounts,
    ) -> Self {
        let query_source = query_source.to_owned();
        let model = model.to_owned();
        if err.is_transport() {
            Self::Response {
                query_source,
                model,
                char_counts,
                source: err,
            }
        } else if matches!(err, LlmError::ResponseFormat { .. }) {
            Self::ResponseParsing {
                query_source,
                model,
                source: err,
            }
        } else {
            Self::Unknown {
                query_source,
                model,
                source: Box::new(err),
            }
        }
    }

    /// The error tag the run's trace is closed with.
    pub fn trace_tag(&self) -> &'static str {
        match self {
            Self::Response { .. } => "ResponseFailure",
            Self::ResponseParsing { .. } => "ResponseParsingFailure",
            Self::OutputParsing(_) => "Failed to parse output.",
            Self::Unknown { .. } => "UnknownFailure",
        }
    }
}
