//! # llm-runner
//!
//! Runs prompt-templated queries against large language models, with
//! optional tool calling and run tracing.
//!
//! The heart of the crate is the tool-calling loop: the model is asked,
//! any tools it requests are executed, their results are fed back, and
//! this repeats until the model answers or the iteration budget runs out.
//! Everything around it (prompt rendering, output parsing, trace storage,
//! the HTTP client) is reached through narrow traits.
//!
//! # Architecture
//!
//! ```text
//!   LlmRunner<T>  ── PromptTemplate ── OutputParser<T> ── Tracer
//!       │
//!   tool_loop()   ── DynProvider (llm-runner-openai, MockProvider, ...)
//!       │
//!   ToolRegistry  ── extract_tool_calls ── execute_call
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use llm_runner::output::parse_text;
//! use llm_runner::tool::{ToolSignature, TypeHint, tool_fn};
//! use llm_runner::{ChatMessage, DynProvider, LlmRunner, RunOptions};
//! use serde_json::{Map, Value};
//!
//! # async fn example(provider: Arc<dyn DynProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! let runner = LlmRunner::builder(
//!     provider,
//!     |input: &HashMap<String, String>| {
//!         vec![ChatMessage::user(format!("What's the weather in {}?", input["city"]))]
//!     },
//!     parse_text,
//! )
//! .tool(tool_fn(
//!     ToolSignature::new("get_weather")
//!         .doc("Get the current weather.\ncity: The city name")
//!         .param("city", TypeHint::String),
//!     |args: Map<String, Value>| async move {
//!         let city = args.get("city").and_then(Value::as_str).unwrap_or("?").to_owned();
//!         Ok(format!("The weather in {city} is sunny."))
//!     },
//! ))
//! .build()?;
//!
//! let input = HashMap::from([("city".to_owned(), "Montreal".to_owned())]);
//! let answer = runner.run(&input, RunOptions::new("weather_bot")).await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chat`] | Messages, tool calls, tool results, responses, transcripts |
//! | [`censor`] | Redaction of private prompt inputs for tracing |
//! | [`error`] | [`LlmError`] for requests, [`RunError`] for runs |
//! | [`models`] | Model identifier constants |
//! | [`output`] | The [`OutputParser`] contract |
//! | [`prompt`] | The [`PromptTemplate`] contract |
//! | [`provider`] | The [`Provider`] trait and request parameters |
//! | [`runner`] | [`LlmRunner`], the top-level entry point |
//! | [`tool`] | Schema generation, extraction, execution and the loop |
//! | [`trace`] | The [`Tracer`] contract and the best-effort [`RunTrace`] |
//! | [`usage`] | Token counts |

#![warn(missing_docs)]

pub mod censor;
pub mod chat;
pub mod error;
pub mod models;
pub mod output;
pub mod prompt;
pub mod provider;
pub mod runner;
pub mod tool;
pub mod trace;
pub mod usage;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use chat::{
    CacheControl, ChatMessage, ChatResponse, ChatRole, ToolCall, ToolCallDirective, ToolResult,
    Transcript,
};
pub use error::{LlmError, RunError};
pub use output::{OutputParseError, OutputParser};
pub use prompt::PromptTemplate;
pub use provider::{ChatParams, DynProvider, JsonSchema, Provider, ToolDefinition};
pub use runner::{LlmRunner, LlmRunnerBuilder, RunOptions, RunnerConfig};
pub use tool::{ToolHandler, ToolLoopConfig, ToolRegistry};
pub use trace::{RunTrace, SpanId, Tracer};
pub use usage::Usage;
