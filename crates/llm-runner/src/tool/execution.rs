//! Traced tool execution.

use crate::chat::{ToolCall, ToolResult};
use crate::trace::RunTrace;

use super::ToolRegistry;
use super::error::ToolError;
use super::registry::invoke;

/// Executes one call against the registry, reporting it to the run trace.
///
/// An unknown tool yields a failed [`ToolResult`] and no trace events.
/// Otherwise `begin_tool` and `end_tool` bracket the invocation, and
/// `end_tool` is emitted for failures as well. Tracer failures never
/// affect the returned result.
pub async fn execute_call(registry: &ToolRegistry, call: &ToolCall, trace: &RunTrace<'_>) -> ToolResult {
    let Some(handler) = registry.get(&call.name) else {
        return ToolResult::failure(&call.call_id, ToolError::not_found(&call.name).message);
    };

    trace.tool_started(call);
    let result = invoke(handler.as_ref(), call).await;
    trace.tool_finished(call, &result);
    result
}

/// Executes `calls` one at a time, in order.
pub(crate) async fn execute_all(
    registry: &ToolRegistry,
    calls: &[ToolCall],
    trace: &RunTrace<'_>,
) -> Vec<ToolResult> {
    let mut results = Vec::with_capacity(calls.len());
    for call in calls {
        results.push(execute_call(registry, call, trace).await);
    }
    results
}
