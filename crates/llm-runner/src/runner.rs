//! The top-level entry point: render, request (with tools), parse, trace.
//!
//! An [`LlmRunner<T>`] bundles everything one kind of query needs: a
//! prompt template, an output parser producing `T`, a model and its
//! limits, the tools the model may call, a provider and a tracer. It holds
//! no per-run state, so one runner can serve concurrent runs.
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use llm_runner::output::parse_text;
//! use llm_runner::{ChatMessage, DynProvider, LlmRunner, RunOptions, RunnerConfig};
//!
//! # async fn example(provider: Arc<dyn DynProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! let runner = LlmRunner::builder(
//!     provider,
//!     |input: &HashMap<String, String>| vec![ChatMessage::user(format!("Summarize: {}", input["text"]))],
//!     parse_text,
//! )
//! .config(RunnerConfig {
//!     private_input_variables: vec!["text".into()],
//!     ..Default::default()
//! })
//! .build()?;
//!
//! let input = HashMap::from([("text".to_owned(), "...".to_owned())]);
//! let summary = runner.run(&input, RunOptions::new("summarizer")).await?;
//! # let _ = summary;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::censor::{Censor, censor_prompt};
use crate::chat::{ChatMessage, Transcript};
use crate::error::{CharCounts, RunError};
use crate::models;
use crate::output::OutputParser;
use crate::prompt::PromptTemplate;
use crate::provider::DynProvider;
use crate::tool::{SchemaError, ToolHandler, ToolLoopConfig, ToolRegistry, tool_loop};
use crate::trace::{NoopTracer, RunTrace, SpanId, Tracer};

/// Static configuration of a runner.
///
/// Deserializable from any serde format; missing fields take their
/// defaults.
///
/// ```rust
/// use llm_runner::RunnerConfig;
///
/// let config: RunnerConfig = serde_json::from_str(r#"{"max_tool_iterations": 2}"#).unwrap();
/// assert_eq!(config.model, "gpt-4o-2024-08-06");
/// assert_eq!(config.max_tool_iterations, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Upper bound on generated tokens per request.
    pub max_tokens: u32,
    /// Transcript index to mark for prompt caching.
    pub cache_control_index: Option<usize>,
    /// Tool-executing iterations before the final request.
    pub max_tool_iterations: u32,
    /// Input names whose values are masked in traces.
    pub private_input_variables: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            model: models::openai::GPT_4O_2024_08_06.to_owned(),
            max_tokens: 4096,
            cache_control_index: None,
            max_tool_iterations: 5,
            private_input_variables: Vec::new(),
        }
    }
}

/// Per-run options.
#[derive(Clone, Copy)]
pub struct RunOptions<'a> {
    /// Label of the caller, used in traces and error messages.
    pub query_source: &'a str,
    /// Produces the traced copy of the input. Defaults to [`censor_prompt`].
    pub censor: Censor,
    /// The enclosing run, when this run is nested.
    pub parent: Option<SpanId>,
    /// Applies the configured caching marker.
    pub use_prompt_caching: bool,
}

impl<'a> RunOptions<'a> {
    /// Options with the default censor, no parent and caching off.
    pub fn new(query_source: &'a str) -> Self {
        Self {
            query_source,
            censor: censor_prompt,
            parent: None,
            use_prompt_caching: false,
        }
    }

    /// Uses `censor` to build the traced input.
    #[must_use]
    pub fn with_censor(mut self, censor: Censor) -> Self {
        self.censor = censor;
        self
    }

    /// Nests the run under `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: SpanId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Turns the caching marker on or off.
    #[must_use]
    pub fn with_prompt_caching(mut self, enabled: bool) -> Self {
        self.use_prompt_caching = enabled;
        self
    }
}

impl fmt::Debug for RunOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("query_source", &self.query_source)
            .field("parent", &self.parent)
            .field("use_prompt_caching", &self.use_prompt_caching)
            .finish_non_exhaustive()
    }
}

/// Runs one kind of query against a completion service.
pub struct LlmRunner<T> {
    name: String,
    config: RunnerConfig,
    prompt: Arc<dyn PromptTemplate>,
    parser: Arc<dyn OutputParser<T>>,
    registry: ToolRegistry,
    provider: Arc<dyn DynProvider>,
    tracer: Arc<dyn Tracer>,
}

impl<T> fmt::Debug for LlmRunner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmRunner")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("tools", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<T> LlmRunner<T> {
    /// Starts building a runner.
    pub fn builder<P, O>(provider: Arc<dyn DynProvider>, prompt: P, parser: O) -> LlmRunnerBuilder<T>
    where
        P: PromptTemplate + 'static,
        O: OutputParser<T> + 'static,
    {
        LlmRunnerBuilder {
            name: "LlmRunner".to_owned(),
            config: RunnerConfig::default(),
            prompt: Arc::new(prompt),
            parser: Arc::new(parser),
            registry: ToolRegistry::new(),
            registration_error: None,
            provider,
            tracer: Arc::new(NoopTracer),
        }
    }

    /// The runner's name, used as the trace run name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The runner's configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// The registered tools.
    pub fn tools(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Renders the transcript for `input`.
    pub fn render_prompt(&self, input: &HashMap<String, String>) -> Vec<ChatMessage> {
        self.prompt.render(input)
    }

    /// Runs the query for `input` and parses the final text.
    ///
    /// The trace run is opened with the censored input and closed exactly
    /// once: with the raw text on success, or with the error's
    /// [`trace_tag`](RunError::trace_tag) on failure.
    ///
    /// # Errors
    ///
    /// - [`RunError::Response`] when the completion service fails a request;
    /// - [`RunError::ResponseParsing`] when its response is unusable;
    /// - [`RunError::OutputParsing`] with the parser's own error;
    /// - [`RunError::Unknown`] for anything else.
    pub async fn run(&self, input: &HashMap<String, String>, options: RunOptions<'_>) -> Result<T, RunError> {
        let censored = (options.censor)(input, &self.config.private_input_variables);
        let redacted = self.prompt.render(&censored);
        let trace = RunTrace::begin(
            self.tracer.as_ref(),
            &self.name,
            &censored,
            options.query_source,
            options.parent,
        );
        let transcript = Transcript::new(self.prompt.render(input), redacted);

        let loop_config = ToolLoopConfig {
            max_iterations: self.config.max_tool_iterations,
            max_tokens: self.config.max_tokens,
            cache_control_index: self.config.cache_control_index,
            use_prompt_caching: options.use_prompt_caching,
        };
        let outcome = tool_loop(
            self.provider.as_ref(),
            &self.registry,
            &self.config.model,
            transcript,
            &loop_config,
            &trace,
        )
        .await;

        let result = match outcome {
            Ok(result) => result,
            Err(failure) => {
                let err = RunError::from_llm(
                    failure.error,
                    options.query_source,
                    &self.config.model,
                    CharCounts::of(input),
                );
                trace.fail(&failure.partial_output, err.trace_tag());
                return Err(err);
            }
        };
        debug!(
            run = %trace.id(),
            requests = result.requests,
            iterations = result.iterations,
            reason = ?result.termination_reason,
            "llm interaction finished"
        );

        match self
            .parser
            .parse(&result.content, options.query_source, &self.config.model)
        {
            Ok(parsed) => {
                trace.succeed(&result.content);
                Ok(parsed)
            }
            Err(e) => {
                let err = RunError::OutputParsing(e);
                trace.fail(&result.content, err.trace_tag());
                Err(err)
            }
        }
    }
}

/// Builder for [`LlmRunner`].
pub struct LlmRunnerBuilder<T> {
    name: String,
    config: RunnerConfig,
    prompt: Arc<dyn PromptTemplate>,
    parser: Arc<dyn OutputParser<T>>,
    registry: ToolRegistry,
    registration_error: Option<SchemaError>,
    provider: Arc<dyn DynProvider>,
    tracer: Arc<dyn Tracer>,
}

impl<T> fmt::Debug for LlmRunnerBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmRunnerBuilder")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("tools", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<T> LlmRunnerBuilder<T> {
    /// Sets the trace run name. Defaults to `"LlmRunner"`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a tool. A signature error surfaces from [`build`](Self::build).
    #[must_use]
    pub fn tool(mut self, handler: impl ToolHandler + 'static) -> Self {
        if self.registration_error.is_none() {
            if let Err(e) = self.registry.register(handler) {
                self.registration_error = Some(e);
            }
        }
        self
    }

    /// Uses an already-built registry, replacing any tools added so far.
    #[must_use]
    pub fn tools(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the tracer. Defaults to [`NoopTracer`].
    #[must_use]
    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Finishes the runner.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] raised while registering tools.
    pub fn build(self) -> Result<LlmRunner<T>, SchemaError> {
        if let Some(e) = self.registration_error {
            return Err(e);
        }
        Ok(LlmRunner {
            name: self.name,
            config: self.config,
            prompt: self.prompt,
            parser: self.parser,
            registry: self.registry,
            provider: self.provider,
            tracer: self.tracer,
        })
    }
}
