//! Tool calling: registration, schema generation, extraction, execution
//! and the conversation loop.
//!
//! # Architecture
//!
//! ```text
//!   ToolSignature      - declared name, doc string and typed parameters
//!       │
//!   ToolHandler        - a signature plus an async invoke(args) -> value
//!       │
//!   ToolRegistry       - handlers by name, schema derived at registration
//!       │
//!   extract_tool_calls - provider directives → ToolCall (never fails)
//!   execute_call       - ToolCall → ToolResult (never fails)
//!       │
//!   tool_loop()        - request → extract → execute → request ... (bounded)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use llm_runner::tool::{ToolLoopConfig, ToolRegistry, ToolSignature, TypeHint, tool_fn, tool_loop};
//! use llm_runner::{ChatMessage, RunTrace, Transcript};
//! use serde_json::{Map, Value};
//!
//! # async fn example(provider: &dyn llm_runner::DynProvider) -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = ToolRegistry::new();
//! registry.register(tool_fn(
//!     ToolSignature::new("get_weather")
//!         .doc("Get the current weather for a city.\ncity: The city name")
//!         .param("city", TypeHint::String),
//!     |args: Map<String, Value>| async move {
//!         let city = args.get("city").and_then(Value::as_str).unwrap_or("?").to_owned();
//!         Ok(format!("The weather in {city} is sunny."))
//!     },
//! ))?;
//!
//! let transcript = Transcript::unredacted(vec![ChatMessage::user("Weather in Montreal?")]);
//! let result = tool_loop(
//!     provider,
//!     &registry,
//!     "gpt-4o-2024-08-06",
//!     transcript,
//!     &ToolLoopConfig::default(),
//!     &RunTrace::detached(),
//! )
//! .await?;
//! println!("{}", result.content);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod execution;
mod extractor;
mod handler;
mod helpers;
pub(crate) mod loop_core;
mod loop_sync;
mod registry;
mod schema;

pub use config::{LoopError, TerminationReason, ToolLoopConfig, ToolLoopResult};
pub use error::{SchemaError, ToolError};
pub use execution::execute_call;
pub use extractor::extract_tool_calls;
pub use handler::{FnTool, ToolHandler, TypedFnTool};
pub use helpers::{tool_fn, typed_tool_fn};
pub use loop_sync::tool_loop;
pub use registry::ToolRegistry;
pub use schema::{HasTypeHint, ParamSpec, ToolSignature, TypeHint, parse_docstring};

#[cfg(test)]
mod tests;
