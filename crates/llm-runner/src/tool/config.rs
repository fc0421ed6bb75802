//! Tool loop configuration and result types.

use crate::chat::{ChatResponse, Transcript};
use crate::error::LlmError;
use crate::usage::Usage;

/// Configuration for [`tool_loop`](super::tool_loop).
///
/// ```rust
/// use llm_runner::tool::ToolLoopConfig;
///
/// let config = ToolLoopConfig {
///     max_iterations: 3,
///     cache_control_index: Some(0),
///     use_prompt_caching: true,
///     ..Default::default()
/// };
/// assert_eq!(config.max_tokens, 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLoopConfig {
    /// Tool-executing iterations allowed before the final request.
    ///
    /// The loop issues at most `max_iterations + 1` requests.
    pub max_iterations: u32,
    /// Upper bound on generated tokens per request.
    pub max_tokens: u32,
    /// Transcript index of the message that carries the caching marker.
    pub cache_control_index: Option<usize>,
    /// Whether the caching marker is applied at all.
    pub use_prompt_caching: bool,
}

impl Default for ToolLoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            max_tokens: 4096,
            cache_control_index: None,
            use_prompt_caching: false,
        }
    }
}

impl ToolLoopConfig {
    /// The index to mark for caching, if caching is in effect.
    pub fn cache_marker(&self) -> Option<usize> {
        self.cache_control_index.filter(|_| self.use_prompt_caching)
    }
}

/// Why a tool loop terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The model answered without requesting tools.
    Complete,
    /// The iteration budget ran out and the final request was issued.
    /// Tool calls in that final response were not executed.
    MaxIterations {
        /// The configured limit that was reached.
        limit: u32,
    },
}

/// The result of a completed tool loop.
#[derive(Debug, Clone)]
pub struct ToolLoopResult {
    /// The final text (`""` if the last response had none).
    pub content: String,
    /// The last response from the model.
    pub response: ChatResponse,
    /// How many tool-executing iterations ran.
    pub iterations: u32,
    /// How many completion requests were issued.
    pub requests: u32,
    /// Usage summed across all requests.
    pub total_usage: Usage,
    /// Why the loop stopped.
    pub termination_reason: TerminationReason,
    /// The full transcript, including the redacted view.
    pub transcript: Transcript,
}

/// A completion request failed partway through the loop.
#[derive(Debug, thiserror::Error)]
#[error("tool loop failed after {iterations} iterations: {error}")]
pub struct LoopError {
    /// The provider error that ended the loop.
    #[source]
    pub error: LlmError,
    /// Text of the last successful response, `""` if there was none.
    pub partial_output: String,
    /// Tool-executing iterations completed before the failure.
    pub iterations: u32,
    /// Usage summed across the successful requests.
    pub total_usage: Usage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolLoopConfig::default();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.max_tokens, 4096);
        assert!(config.cache_control_index.is_none());
        assert!(!config.use_prompt_caching);
    }

    #[test]
    fn test_cache_marker_requires_both_settings() {
        let index_only = ToolLoopConfig {
            cache_control_index: Some(1),
            ..Default::default()
        };
        assert_eq!(index_only.cache_marker(), None);

        let flag_only = ToolLoopConfig {
            use_prompt_caching: true,
            ..Default::default()
        };
        assert_eq!(flag_only.cache_marker(), None);

        let both = ToolLoopConfig {
            cache_control_index: Some(1),
            use_prompt_caching: true,
            ..Default::default()
        };
        assert_eq!(both.cache_marker(), Some(1));
    }
}
