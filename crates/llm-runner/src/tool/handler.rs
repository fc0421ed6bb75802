//! Tool handler trait and implementations.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::ToolError;
use super::schema::ToolSignature;

/// A tool the model can invoke.
///
/// Implement this trait for tools that carry state. For simple tools use
/// [`tool_fn`](super::tool_fn) or [`typed_tool_fn`](super::typed_tool_fn).
///
/// The trait is object-safe (boxed futures) so handlers are stored as
/// `Arc<dyn ToolHandler>`.
///
/// ```rust
/// use std::future::Future;
/// use std::pin::Pin;
///
/// use llm_runner::tool::{ToolError, ToolHandler, ToolSignature, TypeHint};
/// use serde_json::{Map, Value, json};
///
/// struct Counter {
///     signature: ToolSignature,
/// }
///
/// impl ToolHandler for Counter {
///     fn signature(&self) -> &ToolSignature {
///         &self.signature
///     }
///
///     fn invoke<'a>(
///         &'a self,
///         args: Map<String, Value>,
///     ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'a>> {
///         Box::pin(async move {
///             let text = args.get("text").and_then(Value::as_str).unwrap_or_default();
///             Ok(json!(text.chars().count()))
///         })
///     }
/// }
///
/// let tool = Counter {
///     signature: ToolSignature::new("count_chars").param("text", TypeHint::String),
/// };
/// assert_eq!(tool.signature().name(), "count_chars");
/// ```
pub trait ToolHandler: Send + Sync {
    /// The declared shape of the tool.
    fn signature(&self) -> &ToolSignature;

    /// Runs the tool with the call's keyword arguments.
    ///
    /// The returned value is stringified into the transcript: strings
    /// verbatim, anything else as compact JSON.
    fn invoke<'a>(
        &'a self,
        args: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'a>>;
}

/// A tool backed by an async closure over the raw argument map.
///
/// Created via [`tool_fn`](super::tool_fn).
pub struct FnTool<F> {
    pub(crate) signature: ToolSignature,
    pub(crate) handler: F,
}

impl<F> std::fmt::Debug for FnTool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.signature.name())
            .finish_non_exhaustive()
    }
}

impl<F, Fut, O> ToolHandler for FnTool<F>
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    O: Into<Value> + Send + 'static,
{
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    fn invoke<'a>(
        &'a self,
        args: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'a>> {
        let fut = (self.handler)(args);
        Box::pin(async move { fut.await.map(Into::into) })
    }
}

/// A tool whose arguments are deserialized into `A` before the closure runs.
///
/// Created via [`typed_tool_fn`](super::typed_tool_fn). Arguments that do
/// not deserialize into `A` (missing or mistyped fields) fail the call with
/// a [`ToolError`]. Unknown and missing argument names are rejected against
/// the signature by the registry before the handler runs.
pub struct TypedFnTool<A, F> {
    pub(crate) signature: ToolSignature,
    pub(crate) handler: F,
    pub(crate) _args: PhantomData<fn(A)>,
}

impl<A, F> std::fmt::Debug for TypedFnTool<A, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedFnTool")
            .field("name", &self.signature.name())
            .finish_non_exhaustive()
    }
}

impl<A, F, Fut, O> ToolHandler for TypedFnTool<A, F>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    O: Into<Value> + Send + 'static,
{
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    fn invoke<'a>(
        &'a self,
        args: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'a>> {
        match serde_json::from_value::<A>(Value::Object(args)) {
            Ok(args) => {
                let fut = (self.handler)(args);
                Box::pin(async move { fut.await.map(Into::into) })
            }
            Err(e) => {
                let err = ToolError::new(format!("{}() got invalid arguments: {e}", self.signature.name()));
                Box::pin(async move { Err(err) })
            }
        }
    }
}
