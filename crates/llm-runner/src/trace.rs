//! Run tracing: the [`Tracer`] contract and the best-effort [`RunTrace`] adapter.
//!
//! A run is traced as one span with nested events:
//!
//! ```text
//! begin_run
//!   begin_call → end_call          (one pair per completion request)
//!   begin_tool → end_tool          (one pair per executed tool call)
//!   ...
//! end_run (success | error tag)    (exactly once)
//! ```
//!
//! Tracers are observers. Every method returns `Result<(), TraceError>`,
//! and [`RunTrace`] logs and discards any error, so a broken tracer can
//! never change what a run returns.
//!
//! Implementations in this crate: [`NoopTracer`] and [`LogTracer`]. The
//! test helpers add `RecordingTracer`.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::{ChatMessage, ChatResponse, ToolCall, ToolResult};
use crate::usage::Usage;

/// Identifier of a traced run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId(Uuid);

impl SpanId {
    /// A fresh random (v4) id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SpanId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SpanId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything known when a run starts.
#[derive(Debug, Clone, Copy)]
pub struct RunStart<'a> {
    /// Id of the new run.
    pub id: SpanId,
    /// Name of the runner.
    pub name: &'a str,
    /// The censored prompt input.
    pub input: &'a HashMap<String, String>,
    /// Caller-supplied label of the query.
    pub query_source: &'a str,
    /// The enclosing run, when nested.
    pub parent: Option<SpanId>,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome<'a> {
    /// The run produced its output.
    Success,
    /// The run failed; the payload is the error tag.
    Error(&'a str),
}

/// Returned by a [`Tracer`] that failed to record an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tracer error: {message}")]
pub struct TraceError {
    /// What went wrong.
    pub message: String,
}

impl TraceError {
    /// Creates a trace error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receives the lifecycle events of a run.
///
/// All methods default to accepting the event, so implementations only
/// override what they record.
pub trait Tracer: Send + Sync {
    /// A run started.
    fn begin_run(&self, run: &RunStart<'_>) -> Result<(), TraceError> {
        let _ = run;
        Ok(())
    }

    /// A completion request is about to be issued over `messages`.
    ///
    /// `messages` is the redacted transcript.
    fn begin_call(
        &self,
        run: SpanId,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<(), TraceError> {
        let _ = (run, model, messages);
        Ok(())
    }

    /// A completion request returned.
    fn end_call(&self, run: SpanId, output: &str, usage: &Usage) -> Result<(), TraceError> {
        let _ = (run, output, usage);
        Ok(())
    }

    /// A tool is about to be invoked.
    fn begin_tool(&self, run: SpanId, call: &ToolCall) -> Result<(), TraceError> {
        let _ = (run, call);
        Ok(())
    }

    /// A tool invocation finished. `output` is the serialized [`ToolResult`].
    fn end_tool(&self, run: SpanId, call: &ToolCall, output: &str) -> Result<(), TraceError> {
        let _ = (run, call, output);
        Ok(())
    }

    /// The run ended.
    fn end_run(&self, run: SpanId, output: &str, outcome: RunOutcome<'_>) -> Result<(), TraceError> {
        let _ = (run, output, outcome);
        Ok(())
    }
}

/// A tracer that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// A tracer that emits every lifecycle event as a `tracing` event.
///
/// Useful during development; it does not persist anything itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn begin_run(&self, run: &RunStart<'_>) -> Result<(), TraceError> {
        info!(
            run = %run.id,
            parent = ?run.parent.map(|p| p.to_string()),
            name = run.name,
            query_source = run.query_source,
            inputs = run.input.len(),
            "run started"
        );
        Ok(())
    }

    fn begin_call(
        &self,
        run: SpanId,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<(), TraceError> {
        debug!(run = %run, model, messages = messages.len(), "completion request");
        Ok(())
    }

    fn end_call(&self, run: SpanId, output: &str, usage: &Usage) -> Result<(), TraceError> {
        debug!(
            run = %run,
            output_chars = output.chars().count(),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "completion response"
        );
        Ok(())
    }

    fn begin_tool(&self, run: SpanId, call: &ToolCall) -> Result<(), TraceError> {
        debug!(run = %run, tool = %call.name, call_id = %call.call_id, "tool started");
        Ok(())
    }

    fn end_tool(&self, run: SpanId, call: &ToolCall, output: &str) -> Result<(), TraceError> {
        debug!(run = %run, tool = %call.name, call_id = %call.call_id, output, "tool finished");
        Ok(())
    }

    fn end_run(&self, run: SpanId, output: &str, outcome: RunOutcome<'_>) -> Result<(), TraceError> {
        match outcome {
            RunOutcome::Success => {
                info!(run = %run, output_chars = output.chars().count(), "run succeeded");
            }
            RunOutcome::Error(tag) => info!(run = %run, status = tag, "run failed"),
        }
        Ok(())
    }
}

static DETACHED: NoopTracer = NoopTracer;

/// Best-effort handle on one traced run.
///
/// Forwards events to a [`Tracer`], logging (never propagating) its
/// failures, and guarantees the run is closed at most once: the first of
/// [`succeed`](Self::succeed) or [`fail`](Self::fail) wins, later calls
/// are ignored.
pub struct RunTrace<'t> {
    tracer: &'t dyn Tracer,
    id: SpanId,
    closed: AtomicBool,
}

impl<'t> RunTrace<'t> {
    /// Opens a run on `tracer` and returns its handle.
    pub fn begin(
        tracer: &'t dyn Tracer,
        name: &str,
        input: &HashMap<String, String>,
        query_source: &str,
        parent: Option<SpanId>,
    ) -> Self {
        let trace = Self {
            tracer,
            id: SpanId::new(),
            closed: AtomicBool::new(false),
        };
        let start = RunStart {
            id: trace.id,
            name,
            input,
            query_source,
            parent,
        };
        trace.report("begin_run", tracer.begin_run(&start));
        trace
    }

    /// A handle that records nothing, for driving the loop without a run.
    pub fn detached() -> RunTrace<'static> {
        RunTrace {
            tracer: &DETACHED,
            id: SpanId::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Id of the run.
    pub fn id(&self) -> SpanId {
        self.id
    }

    /// Whether the run has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Records that a completion request is about to be issued.
    pub fn call_started(&self, model: &str, redacted: &[ChatMessage]) {
        self.report("begin_call", self.tracer.begin_call(self.id, model, redacted));
    }

    /// Records a completion response.
    pub fn call_finished(&self, response: &ChatResponse) {
        self.report(
            "end_call",
            self.tracer.end_call(self.id, response.text(), &response.usage),
        );
    }

    /// Records that `call` is about to be invoked.
    pub fn tool_started(&self, call: &ToolCall) {
        self.report("begin_tool", self.tracer.begin_tool(self.id, call));
    }

    /// Records the outcome of `call`, serialized as pretty-printed JSON.
    pub fn tool_finished(&self, call: &ToolCall, result: &ToolResult) {
        let output = match serde_json::to_string_pretty(result) {
            Ok(json) => json,
            Err(e) => {
                warn!(run = %self.id, call_id = %call.call_id, error = %e, "failed to serialize tool result");
                result.transcript_content()
            }
        };
        self.report("end_tool", self.tracer.end_tool(self.id, call, &output));
    }

    /// Closes the run as successful.
    pub fn succeed(&self, output: &str) {
        self.close(output, RunOutcome::Success);
    }

    /// Closes the run with an error tag.
    pub fn fail(&self, output: &str, tag: &str) {
        self.close(output, RunOutcome::Error(tag));
    }

    fn close(&self, output: &str, outcome: RunOutcome<'_>) {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!(run = %self.id, ?outcome, "run already closed; ignoring");
            return;
        }
        self.report("end_run", self.tracer.end_run(self.id, output, outcome));
    }

    fn report(&self, event: &'static str, result: Result<(), TraceError>) {
        if let Err(e) = result {
            warn!(run = %self.id, event, error = %e, "tracer failed; continuing");
        }
    }
}

impl fmt::Debug for RunTrace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunTrace")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
