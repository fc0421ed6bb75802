//! Tool registry: name lookup plus the schema descriptor of every tool.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::error;

use super::ToolHandler;
use super::error::{SchemaError, ToolError};
use crate::chat::{ToolCall, ToolResult};
use crate::provider::ToolDefinition;

/// A registry of tool handlers, indexed by name.
///
/// Each tool's [`ToolDefinition`] is derived once, when it is registered,
/// and never changes afterward. A signature that cannot be turned into a
/// schema is rejected right there with a [`SchemaError`].
///
/// ```rust
/// use llm_runner::tool::{ToolRegistry, ToolSignature, TypeHint, tool_fn};
/// use serde_json::{Map, Value};
///
/// let mut registry = ToolRegistry::new();
/// registry
///     .register(tool_fn(
///         ToolSignature::new("echo").doc("Echo the input.").param("text", TypeHint::String),
///         |args: Map<String, Value>| async move { Ok(args.get("text").cloned().unwrap_or(Value::Null)) },
///     ))
///     .unwrap();
/// assert!(registry.contains("echo"));
/// assert_eq!(registry.definitions()[0].description, "Echo the input.");
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    definitions: Vec<ToolDefinition>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool handler.
    ///
    /// If a handler with the same name already exists, it is replaced and
    /// its definition keeps its position.
    pub fn register(&mut self, handler: impl ToolHandler + 'static) -> Result<&mut Self, SchemaError> {
        self.register_shared(Arc::new(handler))
    }

    /// Registers a shared tool handler.
    pub fn register_shared(&mut self, handler: Arc<dyn ToolHandler>) -> Result<&mut Self, SchemaError> {
        let definition = handler.signature().to_definition()?;
        let name = definition.name.clone();
        match self.definitions.iter_mut().find(|d| d.name == name) {
            Some(existing) => *existing = definition,
            None => self.definitions.push(definition),
        }
        self.handlers.insert(name, handler);
        Ok(self)
    }

    /// Returns the handler for the given tool name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.get(name)
    }

    /// Returns whether a tool with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// The definitions of all registered tools, in registration order.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// The registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Executes a single tool call without tracing.
    ///
    /// Never fails at the outer level: an unknown tool, a tool error and a
    /// panic inside the tool all come back as a [`ToolResult`] error.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.handlers.get(&call.name) {
            Some(handler) => invoke(handler.as_ref(), call).await,
            None => ToolResult::failure(&call.call_id, ToolError::not_found(&call.name).message),
        }
    }
}

/// Checks the call's arguments against the handler's signature, invokes
/// it, and captures the outcome.
pub(crate) async fn invoke(handler: &dyn ToolHandler, call: &ToolCall) -> ToolResult {
    if let Err(e) = handler.signature().check_arguments(&call.arguments) {
        error!(tool = %call.name, call_id = %call.call_id, error = %e, "tool called with mismatched arguments");
        return ToolResult::failure(&call.call_id, e.message);
    }
    let args = call.arguments.clone();
    let outcome = AssertUnwindSafe(async move { handler.invoke(args).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(value)) => ToolResult::success(&call.call_id, value),
        Ok(Err(e)) => {
            error!(tool = %call.name, call_id = %call.call_id, error = %e, "tool execution failed");
            ToolResult::failure(&call.call_id, e.message)
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(tool = %call.name, call_id = %call.call_id, error = %message, "tool panicked");
            ToolResult::failure(&call.call_id, message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_owned()
    }
}
