//! Pre-built helpers for testing code that uses `llm-runner`.
//!
//! Available when the `test-utils` feature is enabled, so downstream crates
//! can reuse them. Also compiled for this crate's own tests. Provides
//! sample responses, tool-call directives, a quick [`MockProvider`]
//! factory and [`RecordingTracer`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::chat::{ChatMessage, ChatResponse, ToolCall, ToolCallDirective};
use crate::mock::MockProvider;
use crate::trace::{RunOutcome, RunStart, SpanId, TraceError, Tracer};
use crate::usage::Usage;

/// Builds a text-only [`ChatResponse`] with [`sample_usage`].
pub fn sample_response(text: &str) -> ChatResponse {
    ChatResponse {
        content: Some(text.into()),
        tool_calls: Vec::new(),
        usage: sample_usage(),
        model: "test-model".into(),
        finish_reason: Some("stop".into()),
    }
}

/// Builds a [`ChatResponse`] that requests the given tool calls.
pub fn sample_tool_response(directives: Vec<ToolCallDirective>) -> ChatResponse {
    ChatResponse {
        content: None,
        tool_calls: directives,
        usage: sample_usage(),
        model: "test-model".into(),
        finish_reason: Some("tool_calls".into()),
    }
}

/// A tool-call directive whose arguments are `args` serialized as JSON.
pub fn directive(id: &str, name: &str, args: &Value) -> ToolCallDirective {
    ToolCallDirective {
        id: id.into(),
        name: name.into(),
        arguments: args.to_string(),
    }
}

/// Returns a [`Usage`] with 100 input / 50 output tokens.
pub fn sample_usage() -> Usage {
    Usage::new(100, 50)
}

/// Creates a [`MockProvider`] preloaded with `responses`, in order.
pub fn mock_with(responses: impl IntoIterator<Item = ChatResponse>) -> MockProvider {
    let mock = MockProvider::new();
    for response in responses {
        mock.queue_response(response);
    }
    mock
}

/// One event seen by a [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// `begin_run`.
    RunStarted {
        /// Run id.
        id: SpanId,
        /// Runner name.
        name: String,
        /// Censored input.
        input: HashMap<String, String>,
        /// Query label.
        query_source: String,
        /// Enclosing run.
        parent: Option<SpanId>,
    },
    /// `begin_call`.
    CallStarted {
        /// Model requested.
        model: String,
        /// Redacted transcript at request time.
        messages: Vec<ChatMessage>,
    },
    /// `end_call`.
    CallEnded {
        /// Response text.
        output: String,
        /// Response usage.
        usage: Usage,
    },
    /// `begin_tool`.
    ToolStarted {
        /// The call about to run.
        call: ToolCall,
    },
    /// `end_tool`.
    ToolEnded {
        /// Id of the finished call.
        call_id: String,
        /// Serialized tool result.
        output: String,
    },
    /// `end_run`.
    RunEnded {
        /// Final output.
        output: String,
        /// Error tag, `None` on success.
        error: Option<String>,
    },
}

/// A [`Tracer`] that keeps every event in memory.
///
/// [`failing`](Self::failing) builds one that records each event and then
/// reports a failure, for checking that tracer errors never leak into a
/// run's result.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Mutex<Vec<TraceEvent>>,
    fail: AtomicBool,
}

impl RecordingTracer {
    /// A tracer that accepts every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracer that records every event and then returns an error.
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }

    /// How many `begin_call` events were recorded.
    pub fn call_count(&self) -> usize {
        self.count(|e| matches!(e, TraceEvent::CallStarted { .. }))
    }

    /// How many `end_run` events were recorded.
    pub fn run_end_count(&self) -> usize {
        self.count(|e| matches!(e, TraceEvent::RunEnded { .. }))
    }

    /// The last `end_run` event as `(output, error)`, if any.
    pub fn run_end(&self) -> Option<(String, Option<String>)> {
        self.events().into_iter().rev().find_map(|e| match e {
            TraceEvent::RunEnded { output, error } => Some((output, error)),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&TraceEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    fn record(&self, event: TraceEvent) -> Result<(), TraceError> {
        self.events.lock().unwrap().push(event);
        if self.fail.load(Ordering::Relaxed) {
            Err(TraceError::new("injected tracer failure"))
        } else {
            Ok(())
        }
    }
}

impl Tracer for RecordingTracer {
    fn begin_run(&self, run: &RunStart<'_>) -> Result<(), TraceError> {
        self.record(TraceEvent::RunStarted {
            id: run.id,
            name: run.name.to_owned(),
            input: run.input.clone(),
            query_source: run.query_source.to_owned(),
            parent: run.parent,
        })
    }

    fn begin_call(
        &self,
        _run: SpanId,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<(), TraceError> {
        self.record(TraceEvent::CallStarted {
            model: model.to_owned(),
            messages: messages.to_vec(),
        })
    }

    fn end_call(&self, _run: SpanId, output: &str, usage: &Usage) -> Result<(), TraceError> {
        self.record(TraceEvent::CallEnded {
            output: output.to_owned(),
            usage: usage.clone(),
        })
    }

    fn begin_tool(&self, _run: SpanId, call: &ToolCall) -> Result<(), TraceError> {
        self.record(TraceEvent::ToolStarted { call: call.clone() })
    }

    fn end_tool(&self, _run: SpanId, call: &ToolCall, output: &str) -> Result<(), TraceError> {
        self.record(TraceEvent::ToolEnded {
            call_id: call.call_id.clone(),
            output: output.to_owned(),
        })
    }

    fn end_run(&self, _run: SpanId, output: &str, outcome: RunOutcome<'_>) -> Result<(), TraceError> {
        let error = match outcome {
            RunOutcome::Success => None,
            RunOutcome::Error(tag) => Some(tag.to_owned()),
        };
        self.record(TraceEvent::RunEnded {
            output: output.to_owned(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_sample_response_is_valid() {
        let r = sample_response("hello");
        assert_eq!(r.text(), "hello");
        assert!(!r.has_tool_calls());
    }

    #[test]
    fn test_sample_tool_response() {
        let r = sample_tool_response(vec![directive("tc_1", "search", &json!({"q": "rust"}))]);
        assert!(r.has_tool_calls());
        assert_eq!(r.text(), "");
        assert_eq!(r.tool_calls[0].arguments, r#"{"q":"rust"}"#);
    }

    #[test]
    fn test_recording_tracer_failing_still_records() {
        let tracer = RecordingTracer::failing();
        assert!(tracer.end_call(SpanId::new(), "x", &Usage::default()).is_err());
        assert_eq!(tracer.events().len(), 1);
    }
}
