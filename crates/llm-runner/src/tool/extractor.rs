//! Turning a provider response into structured tool calls.

use serde_json::{Map, Value};
use tracing::warn;

use crate::chat::{ChatResponse, ToolCall, ToolCallDirective};

/// Extracts the tool calls a response asks for, in the order the model
/// emitted them.
///
/// Never fails. An argument payload that is not a JSON object (invalid
/// JSON, or valid JSON of another shape) becomes an empty argument map and
/// the call still goes ahead. Extraction is pure: running it twice on the
/// same response yields equal results.
///
/// ```rust
/// use llm_runner::{ChatResponse, ToolCallDirective};
/// use llm_runner::tool::extract_tool_calls;
///
/// let response = ChatResponse {
///     tool_calls: vec![ToolCallDirective {
///         id: "call_1".into(),
///         name: "get_weather".into(),
///         arguments: r#"{"city": "Montreal"}"#.into(),
///     }],
///     ..Default::default()
/// };
/// let calls = extract_tool_calls(&response);
/// assert_eq!(calls[0].arguments["city"], "Montreal");
/// ```
pub fn extract_tool_calls(response: &ChatResponse) -> Vec<ToolCall> {
    response.tool_calls.iter().map(to_tool_call).collect()
}

fn to_tool_call(directive: &ToolCallDirective) -> ToolCall {
    ToolCall::new(
        directive.id.clone(),
        directive.name.clone(),
        parse_arguments(directive),
    )
}

fn parse_arguments(directive: &ToolCallDirective) -> Map<String, Value> {
    match serde_json::from_str::<Value>(&directive.arguments) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(
                tool = %directive.name,
                call_id = %directive.id,
                kind = json_kind(&other),
                "tool arguments are not an object; using empty arguments"
            );
            Map::new()
        }
        Err(e) => {
            warn!(
                tool = %directive.name,
                call_id = %directive.id,
                error = %e,
                "malformed tool arguments; using empty arguments"
            );
            Map::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
