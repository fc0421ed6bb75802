//! Conversation types: messages, tool calls, tool results and responses.
//!
//! A conversation is an ordered list of [`ChatMessage`]s. The order is
//! significant: the whole list is replayed to the provider on every request
//! of the tool loop. [`Transcript`] keeps the list the model sees and the
//! redacted copy shown to the tracer side by side.
//!
//! Tool calling involves three shapes:
//!
//! - [`ToolCallDirective`] - what the provider returned, with the
//!   arguments still serialized as a string;
//! - [`ToolCall`] - the parsed request, produced by
//!   [`extract_tool_calls`](crate::tool::extract_tool_calls);
//! - [`ToolResult`] - the outcome of executing one call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LlmError;
use crate::usage::Usage;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions that frame the conversation.
    System,
    /// The caller.
    User,
    /// The model.
    Assistant,
    /// The output of a tool invocation.
    Tool,
}

impl ChatRole {
    /// The wire name of the role (`"system"`, `"user"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A prompt-caching hint attached to one message.
///
/// Providers that support prompt caching cache the transcript prefix
/// ending at the marked message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControl {
    /// The cache type. Only `"ephemeral"` is in use today.
    #[serde(rename = "type")]
    pub kind: String,
}

impl CacheControl {
    /// The `{"type": "ephemeral"}` marker.
    pub fn ephemeral() -> Self {
        Self {
            kind: "ephemeral".into(),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: ChatRole,
    /// The textual content.
    pub content: String,
    /// Optional prompt-caching marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    /// Tool calls emitted by the model. Only set on assistant messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// The call this message answers. Only set on tool messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            cache_control: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::User, content)
    }

    /// Creates an assistant message with text only.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::Assistant, content)
    }

    /// Creates an assistant message carrying the tool calls the model emitted.
    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::plain(ChatRole::Assistant, content)
        }
    }

    /// Creates the tool message answering one call.
    ///
    /// The content is [`ToolResult::transcript_content`]: the stringified
    /// result, or `"Error: <message>"`.
    pub fn tool_result(result: &ToolResult) -> Self {
        Self {
            tool_call_id: Some(result.call_id().to_owned()),
            ..Self::plain(ChatRole::Tool, result.transcript_content())
        }
    }

    /// Returns the message with a cache-control marker attached.
    #[must_use]
    pub fn with_cache_control(mut self, cache_control: CacheControl) -> Self {
        self.cache_control = Some(cache_control);
        self
    }
}

/// A tool invocation requested by the model, with parsed arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned identifier; echoed back in the tool message.
    pub call_id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Keyword arguments for the tool.
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Creates a tool call.
    pub fn new(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// The arguments re-serialized as a JSON object string.
    pub fn arguments_json(&self) -> String {
        serde_json::to_string(&self.arguments).unwrap_or_else(|_| "{}".into())
    }
}

/// The outcome of executing one [`ToolCall`].
///
/// Exactly one of [`result`](Self::result) and [`error`](Self::error) is
/// set. The fields are private so the invariant holds for the lifetime of
/// the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    call_id: String,
    result: Option<Value>,
    error: Option<String>,
}

impl ToolResult {
    /// A successful execution returning `value`.
    pub fn success(call_id: impl Into<String>, value: Value) -> Self {
        Self {
            call_id: call_id.into(),
            result: Some(value),
            error: None,
        }
    }

    /// A failed lookup or execution.
    pub fn failure(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            result: None,
            error: Some(error.into()),
        }
    }

    /// The id of the originating call.
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// The value the tool returned, if it succeeded.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// The failure message, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether this result records a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The content of the tool message fed back to the model.
    ///
    /// Strings are used verbatim, other values as compact JSON, errors as
    /// `"Error: <message>"`.
    pub fn transcript_content(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Error: {error}");
        }
        match &self.result {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => Value::Null.to_string(),
        }
    }
}

/// A raw tool-call directive as returned by the provider.
///
/// `arguments` is the provider's serialized argument payload. It is only
/// parsed by [`extract_tool_calls`](crate::tool::extract_tool_calls).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallDirective {
    /// Provider-assigned call identifier.
    pub id: String,
    /// Name of the requested tool.
    pub name: String,
    /// Serialized argument payload (normally a JSON object).
    pub arguments: String,
}

/// A complete response from a completion service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Textual content. `None` when the model only emitted tool calls.
    pub content: Option<String>,
    /// Tool-call directives, in the order the model emitted them.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDirective>,
    /// Token usage for this request.
    #[serde(default)]
    pub usage: Usage,
    /// The model that actually served the request.
    #[serde(default)]
    pub model: String,
    /// Provider finish reason (e.g. `"stop"`, `"tool_calls"`).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// The textual content, or `""` when the model returned none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Whether the model emitted any tool-call directives.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// The transcript of one run: the messages sent to the model and a
/// redacted mirror of them used only for tracing.
///
/// Both views start with the same length and every append goes to both,
/// so they stay the same length for the life of the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    redacted: Vec<ChatMessage>,
}

impl Transcript {
    /// Seeds a transcript from the rendered prompt and its redacted rendering.
    ///
    /// # Panics
    ///
    /// Panics if the two renderings differ in length.
    pub fn new(messages: Vec<ChatMessage>, redacted: Vec<ChatMessage>) -> Self {
        assert_eq!(
            messages.len(),
            redacted.len(),
            "redacted transcript must mirror the real one"
        );
        Self { messages, redacted }
    }

    /// Seeds a transcript whose redacted view equals the real one.
    pub fn unredacted(messages: Vec<ChatMessage>) -> Self {
        Self {
            redacted: messages.clone(),
            messages,
        }
    }

    /// Appends a message to both views.
    pub fn push(&mut self, message: ChatMessage) {
        self.redacted.push(message.clone());
        self.messages.push(message);
    }

    /// Marks the message at `index` as a prompt-caching breakpoint in both views.
    pub fn mark_cache_point(&mut self, index: usize) -> Result<(), LlmError> {
        let len = self.messages.len();
        let (Some(message), Some(mirror)) =
            (self.messages.get_mut(index), self.redacted.get_mut(index))
        else {
            return Err(LlmError::CacheControlIndex { index, len });
        };
        message.cache_control = Some(CacheControl::ephemeral());
        mirror.cache_control = Some(CacheControl::ephemeral());
        Ok(())
    }

    /// The messages sent to the model.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The redacted messages shown to the tracer.
    pub fn redacted(&self) -> &[ChatMessage] {
        &self.redacted
    }

    /// Number of messages in the real transcript.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Splits the transcript into `(messages, redacted)`.
    pub fn into_parts(self) -> (Vec<ChatMessage>, Vec<ChatMessage>) {
        (self.messages, self.redacted)
    }
}
