//! The completion-service contract and its request types.
//!
//! - **[`Provider`]** - the trait every backend implements, using native
//!   async-fn-in-traits.
//! - **[`DynProvider`]** - an object-safe mirror of `Provider` with boxed
//!   futures. A blanket `impl<T: Provider> DynProvider for T` bridges the
//!   two, so the runner can hold any backend as `Arc<dyn DynProvider>`.
//!
//! A request is a [`ChatParams`]: the model, the full transcript, the
//! token limit and the tool definitions. The response is a
//! [`ChatResponse`] with textual content, raw tool-call directives and
//! token usage.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::{ChatMessage, ChatResponse};
use crate::error::LlmError;

/// The trait every completion service implements.
///
/// Implementations map transport failures to the transport variants of
/// [`LlmError`] and unusable response bodies to
/// [`LlmError::ResponseFormat`]; the runner classifies them accordingly.
pub trait Provider: Send + Sync {
    /// Sends one completion request and returns the full response.
    fn generate(
        &self,
        params: &ChatParams,
    ) -> impl Future<Output = Result<ChatResponse, LlmError>> + Send;
}

/// Object-safe counterpart of [`Provider`] for dynamic dispatch.
///
/// You rarely implement this directly; the blanket impl covers every
/// `Provider`.
///
/// ```rust,no_run
/// use llm_runner::{ChatMessage, ChatParams, DynProvider};
///
/// async fn ask(provider: &dyn DynProvider, question: &str) -> String {
///     let params = ChatParams {
///         model: "gpt-4o-mini".into(),
///         messages: vec![ChatMessage::user(question)],
///         ..Default::default()
///     };
///     match provider.generate_boxed(&params).await {
///         Ok(resp) => resp.text().to_owned(),
///         Err(e) => e.to_string(),
///     }
/// }
/// ```
pub trait DynProvider: Send + Sync {
    /// Boxed-future version of [`Provider::generate`].
    fn generate_boxed<'a>(
        &'a self,
        params: &'a ChatParams,
    ) -> Pin<Box<dyn Future<Output = Result<ChatResponse, LlmError>> + Send + 'a>>;
}

impl<T: Provider> DynProvider for T {
    fn generate_boxed<'a>(
        &'a self,
        params: &'a ChatParams,
    ) -> Pin<Box<dyn Future<Output = Result<ChatResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.generate(params))
    }
}

/// Parameters for one completion request.
///
/// ```rust
/// use llm_runner::{ChatMessage, ChatParams};
///
/// let params = ChatParams {
///     model: "gpt-4o-2024-08-06".into(),
///     messages: vec![ChatMessage::user("Hello")],
///     max_tokens: Some(256),
///     ..Default::default()
/// };
/// assert!(params.tools.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatParams {
    /// The model identifier.
    pub model: String,
    /// The full transcript, replayed on every request.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,
    /// Tool definitions the model may invoke. `None` sends no tools.
    pub tools: Option<Vec<ToolDefinition>>,
}

/// The schema descriptor of one registered tool, as sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool's name, matched against [`ToolCall::name`](crate::ToolCall::name).
    pub name: String,
    /// Shown to the model so it knows when to use the tool.
    pub description: String,
    /// JSON Schema describing the tool's parameters.
    pub parameters: JsonSchema,
}

/// A JSON Schema document describing tool parameters.
///
/// The inner value is private; use [`as_value`](Self::as_value) for read
/// access.
///
/// ```rust
/// use llm_runner::JsonSchema;
///
/// let schema = JsonSchema::new(serde_json::json!({
///     "type": "object",
///     "properties": { "city": { "type": "string", "description": "city" } },
///     "required": ["city"]
/// }));
/// assert_eq!(schema.required(), vec!["city"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema(Value);

impl JsonSchema {
    /// Creates a schema from a raw JSON value.
    pub fn new(schema: Value) -> Self {
        Self(schema)
    }

    /// Returns a reference to the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The `properties` object, if present.
    pub fn properties(&self) -> Option<&serde_json::Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }

    /// The names listed under `required`.
    pub fn required(&self) -> Vec<&str> {
        self.0
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
