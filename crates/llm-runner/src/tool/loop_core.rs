//! The iteration engine behind [`tool_loop`](super::tool_loop).
//!
//! `LoopCore` owns the transcript and counters of one loop and advances a
//! [`LoopState`] one transition at a time:
//!
//! ```text
//! Requesting ──► Extracting ──► Executing ──► Requesting ...
//!      │              │
//!      │ (budget)     │ (no tool calls)
//!      ▼              ▼
//!  Terminated     Terminated
//! ```
//!
//! The provider, registry and trace are passed into each step; the core
//! itself holds only owned state.

use tracing::debug;

use crate::chat::{ChatMessage, ChatResponse, ToolCall, Transcript};
use crate::error::LlmError;
use crate::provider::{ChatParams, DynProvider};
use crate::trace::RunTrace;
use crate::usage::Usage;

use super::ToolRegistry;
use super::config::{LoopError, TerminationReason, ToolLoopConfig, ToolLoopResult};
use super::execution::execute_all;
use super::extractor::extract_tool_calls;

/// Where the loop is.
#[derive(Debug)]
pub(crate) enum LoopState {
    /// About to issue a request over the current transcript.
    Requesting,
    /// A response arrived and its tool calls have not been looked at yet.
    Extracting(ChatResponse),
    /// The response asked for tools; they run next.
    Executing {
        response: ChatResponse,
        calls: Vec<ToolCall>,
    },
    /// Done.
    Terminated {
        reason: TerminationReason,
        response: ChatResponse,
    },
}

/// Mutable state for one tool loop.
pub(crate) struct LoopCore {
    transcript: Transcript,
    /// Request settings; `messages` is refreshed from the transcript on every request.
    params: ChatParams,
    max_iterations: u32,
    iterations: u32,
    requests: u32,
    total_usage: Usage,
    last_output: String,
}

impl LoopCore {
    /// Prepares the first request, applying the caching marker if configured.
    pub(crate) fn new(
        model: &str,
        mut transcript: Transcript,
        registry: &ToolRegistry,
        config: &ToolLoopConfig,
    ) -> Result<Self, LlmError> {
        if let Some(index) = config.cache_marker() {
            transcript.mark_cache_point(index)?;
        }

        let tools = (!registry.is_empty()).then(|| registry.definitions().to_vec());

        Ok(Self {
            transcript,
            params: ChatParams {
                model: model.to_owned(),
                messages: Vec::new(),
                max_tokens: Some(config.max_tokens),
                tools,
            },
            max_iterations: config.max_iterations,
            iterations: 0,
            requests: 0,
            total_usage: Usage::default(),
            last_output: String::new(),
        })
    }

    /// Performs one transition.
    pub(crate) async fn step(
        &mut self,
        state: LoopState,
        provider: &dyn DynProvider,
        registry: &ToolRegistry,
        trace: &RunTrace<'_>,
    ) -> Result<LoopState, LlmError> {
        match state {
            LoopState::Requesting => {
                let response = self.request(provider, trace).await?;
                if self.iterations >= self.max_iterations {
                    if response.has_tool_calls() {
                        debug!(
                            limit = self.max_iterations,
                            dropped = response.tool_calls.len(),
                            "iteration budget exhausted; final tool calls are not executed"
                        );
                    }
                    return Ok(LoopState::Terminated {
                        reason: TerminationReason::MaxIterations {
                            limit: self.max_iterations,
                        },
                        response,
                    });
                }
                Ok(LoopState::Extracting(response))
            }
            LoopState::Extracting(response) => {
                let calls = extract_tool_calls(&response);
                if calls.is_empty() || registry.is_empty() {
                    return Ok(LoopState::Terminated {
                        reason: TerminationReason::Complete,
                        response,
                    });
                }
                debug!(
                    iteration = self.iterations + 1,
                    calls = calls.len(),
                    "model requested tools"
                );
                Ok(LoopState::Executing { response, calls })
            }
            LoopState::Executing { response, calls } => {
                self.transcript.push(ChatMessage::assistant_tool_calls(
                    response.text(),
                    calls.clone(),
                ));
                for result in execute_all(registry, &calls, trace).await {
                    self.transcript.push(ChatMessage::tool_result(&result));
                }
                self.iterations += 1;
                Ok(LoopState::Requesting)
            }
            terminated @ LoopState::Terminated { .. } => Ok(terminated),
        }
    }

    async fn request(
        &mut self,
        provider: &dyn DynProvider,
        trace: &RunTrace<'_>,
    ) -> Result<ChatResponse, LlmError> {
        self.params.messages.clear();
        self.params.messages.extend_from_slice(self.transcript.messages());
        debug!(
            model = %self.params.model,
            request = self.requests + 1,
            messages = self.params.messages.len(),
            "issuing completion request"
        );
        trace.call_started(&self.params.model, self.transcript.redacted());
        let response = provider.generate_boxed(&self.params).await?;
        trace.call_finished(&response);

        self.requests += 1;
        self.total_usage += &response.usage;
        response.text().clone_into(&mut self.last_output);
        Ok(response)
    }

    /// The error result for a failed step.
    pub(crate) fn fail(&self, error: LlmError) -> LoopError {
        LoopError {
            error,
            partial_output: self.last_output.clone(),
            iterations: self.iterations,
            total_usage: self.total_usage.clone(),
        }
    }

    /// Consumes the core into the loop's result.
    pub(crate) fn finish(self, reason: TerminationReason, response: ChatResponse) -> ToolLoopResult {
        ToolLoopResult {
            content: response.text().to_owned(),
            response,
            iterations: self.iterations,
            requests: self.requests,
            total_usage: self.total_usage,
            termination_reason: reason,
            transcript: self.transcript,
        }
    }
}
