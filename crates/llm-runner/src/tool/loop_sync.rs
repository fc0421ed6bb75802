//! Runs the tool loop to completion.

use tracing::debug;

use crate::chat::Transcript;
use crate::provider::DynProvider;
use crate::trace::RunTrace;
use crate::usage::Usage;

use super::ToolRegistry;
use super::config::{LoopError, ToolLoopConfig, ToolLoopResult};
use super::loop_core::{LoopCore, LoopState};

/// Drives a conversation until the model stops asking for tools or the
/// iteration budget runs out.
///
/// Each iteration:
/// 1. sends the whole transcript (and the tool definitions, when any tool
///    is registered) to the provider;
/// 2. if the response asks for no tools, returns its text;
/// 3. otherwise appends an assistant message carrying the tool calls, runs
///    each call in order and appends one tool message per result.
///
/// After `config.max_iterations` iterations one final request is issued and
/// its text returned as-is; tool calls in it are not executed. At most
/// `max_iterations + 1` requests are made.
///
/// Every append goes to both views of `transcript`; the redacted view is
/// what `trace` sees.
///
/// # Errors
///
/// Returns [`LoopError`] when a request fails or the caching index is out
/// of range. Tool failures are not errors; they reach the model as
/// `"Error: ..."` tool messages.
pub async fn tool_loop(
    provider: &dyn DynProvider,
    registry: &ToolRegistry,
    model: &str,
    transcript: Transcript,
    config: &ToolLoopConfig,
    trace: &RunTrace<'_>,
) -> Result<ToolLoopResult, LoopError> {
    let mut core = LoopCore::new(model, transcript, registry, config).map_err(|error| LoopError {
        error,
        partial_output: String::new(),
        iterations: 0,
        total_usage: Usage::default(),
    })?;

    let mut state = LoopState::Requesting;
    loop {
        state = match core.step(state, provider, registry, trace).await {
            Ok(LoopState::Terminated { reason, response }) => {
                debug!(?reason, "tool loop finished");
                return Ok(core.finish(reason, response));
            }
            Ok(next) => next,
            Err(error) => return Err(core.fail(error)),
        };
    }
}
