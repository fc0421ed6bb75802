//! Conversion between `llm-runner` types and Chat Completions wire types.

use llm_runner::chat::{ChatMessage, ChatResponse, ChatRole, ToolCallDirective};
use llm_runner::error::LlmError;
use llm_runner::provider::ChatParams;
use llm_runner::usage::Usage;

use crate::types::{
    ErrorResponse, FunctionCallRequest, FunctionDef, Message, Request, Tool, ToolCallRequest,
};

// ── Request conversion ───────────────────────────────────────────────

/// Build a Chat Completions request from `ChatParams`.
pub(crate) fn build_request(params: &ChatParams) -> Result<Request<'_>, LlmError> {
    if params.model.is_empty() {
        return Err(LlmError::InvalidRequest("No model specified".into()));
    }

    let tools = params.tools.as_ref().map(|tools| {
        tools
            .iter()
            .map(|t| Tool {
                tool_type: "function",
                function: FunctionDef {
                    name: &t.name,
                    description: &t.description,
                    parameters: t.parameters.as_value(),
                },
            })
            .collect()
    });

    Ok(Request {
        model: &params.model,
        messages: params.messages.iter().map(convert_message).collect(),
        max_tokens: params.max_tokens,
        tools,
    })
}

/// Convert a single transcript message to the wire format.
fn convert_message(msg: &ChatMessage) -> Message<'_> {
    let role = match msg.role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
        ChatRole::Tool => "tool",
    };

    let tool_calls = if msg.tool_calls.is_empty() {
        None
    } else {
        Some(
            msg.tool_calls
                .iter()
                .map(|call| ToolCallRequest {
                    id: call.call_id.clone(),
                    call_type: "function",
                    function: FunctionCallRequest {
                        name: call.name.clone(),
                        arguments: call.arguments_json(),
                    },
                })
                .collect(),
        )
    };

    // An assistant turn that only calls tools is sent with null content.
    let content = if tool_calls.is_some() && msg.content.is_empty() {
        None
    } else {
        Some(msg.content.as_str())
    };

    Message {
        role,
        content,
        tool_calls,
        tool_call_id: msg.tool_call_id.as_deref(),
        cache_control: msg.cache_control.as_ref(),
    }
}

// ── Response conversion ──────────────────────────────────────────────

/// Convert a Chat Completions response to a `ChatResponse`.
///
/// Only the first choice is used. Tool-call arguments are passed through as
/// the raw strings the model produced; decoding them is the extractor's job.
pub(crate) fn convert_response(
    resp: crate::types::Response,
    raw: &str,
) -> Result<ChatResponse, LlmError> {
    let Some(choice) = resp.choices.into_iter().next() else {
        return Err(LlmError::ResponseFormat {
            message: "Response contained no choices".into(),
            raw: raw.to_owned(),
        });
    };

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCallDirective {
            id: tc.id,
            name: tc.function.name,
            arguments: tc.function.arguments,
        })
        .collect();

    let usage = resp.usage.map_or_else(Usage::default, |u| {
        Usage::new(u.prompt_tokens, u.completion_tokens)
    });

    Ok(ChatResponse {
        content: choice.message.content,
        tool_calls,
        usage,
        model: resp.model,
        finish_reason: choice.finish_reason,
    })
}

// ── Error conversion ─────────────────────────────────────────────────

/// Convert an HTTP status + optional error body into an `LlmError`.
pub(crate) fn convert_error(status: http::StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map_or_else(|_| body.to_string(), |e| e.error.message);

    if status == http::StatusCode::UNAUTHORIZED || status == http::StatusCode::FORBIDDEN {
        return LlmError::Auth(message);
    }

    if status == http::StatusCode::BAD_REQUEST {
        return LlmError::InvalidRequest(message);
    }

    let retryable = matches!(status.as_u16(), 429 | 500 | 502 | 503);

    LlmError::Http {
        status: Some(status),
        message,
        retryable,
    }
}
