//! Constructors for closure-backed tools.

use std::future::Future;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::ToolError;
use super::handler::{FnTool, TypedFnTool};
use super::schema::ToolSignature;

/// Creates a tool from an async closure over the raw argument map.
///
/// ```rust
/// use llm_runner::tool::{ToolHandler, ToolSignature, TypeHint, tool_fn};
/// use serde_json::{Map, Value};
///
/// let tool = tool_fn(
///     ToolSignature::new("get_weather")
///         .doc("Get the current weather.\ncity: City name")
///         .param("city", TypeHint::String),
///     |args: Map<String, Value>| async move {
///         let city = args.get("city").and_then(Value::as_str).unwrap_or("nowhere");
///         Ok(format!("The weather in {city} is sunny."))
///     },
/// );
/// assert_eq!(tool.signature().name(), "get_weather");
/// ```
pub fn tool_fn<F, Fut, O>(signature: ToolSignature, handler: F) -> FnTool<F>
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    O: Into<Value> + Send + 'static,
{
    FnTool { signature, handler }
}

/// Creates a tool whose arguments are deserialized into `A`.
///
/// ```rust
/// use llm_runner::tool::{ToolSignature, typed_tool_fn};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct AddArgs {
///     a: i64,
///     b: i64,
/// }
///
/// let tool = typed_tool_fn(
///     ToolSignature::new("add")
///         .doc("Add two integers.")
///         .typed_param::<i64>("a")
///         .typed_param::<i64>("b"),
///     |args: AddArgs| async move { Ok(args.a + args.b) },
/// );
/// # let _ = tool;
/// ```
pub fn typed_tool_fn<A, F, Fut, O>(signature: ToolSignature, handler: F) -> TypedFnTool<A, F>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    O: Into<Value> + Send + 'static,
{
    TypedFnTool {
        signature,
        handler,
        _args: PhantomData,
    }
}
