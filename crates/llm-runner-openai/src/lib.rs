//! `OpenAI`-compatible Chat Completions provider for `llm-runner`.
//!
//! This crate implements [`Provider`](llm_runner::Provider) over the Chat
//! Completions API with tool calling. Any endpoint that speaks the same wire
//! format (a `LiteLLM` proxy, Azure-compatible gateways, local servers) works
//! by overriding [`OpenAiConfig::base_url`].
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use llm_runner::output::parse_text;
//! use llm_runner::{ChatMessage, LlmRunner, RunOptions};
//! use llm_runner_openai::{OpenAiConfig, OpenAiProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OpenAiProvider::new(OpenAiConfig::from_env())?;
//!
//! let runner = LlmRunner::builder(
//!     Arc::new(provider),
//!     |_: &HashMap<String, String>| vec![ChatMessage::user("Hello!")],
//!     parse_text,
//! )
//! .build()?;
//!
//! let reply = runner.run(&HashMap::new(), RunOptions::new("greeting")).await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod convert;
mod provider;
mod types;

pub use config::{DEFAULT_BASE_URL, OpenAiConfig};
pub use provider::OpenAiProvider;
