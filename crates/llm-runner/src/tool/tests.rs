//! Tests for the tool module.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::*;
use crate::chat::{CacheControl, ChatMessage, ChatResponse, ChatRole, ToolCall, Transcript};
use crate::error::LlmError;
use crate::mock::{MockError, MockProvider};
use crate::test_helpers::{
    RecordingTracer, TraceEvent, directive, mock_with, sample_response, sample_tool_response,
    sample_usage,
};
use crate::trace::RunTrace;
use crate::usage::Usage;

const MODEL: &str = "test-model";

fn weather_tool() -> impl ToolHandler + 'static {
    tool_fn(
        ToolSignature::new("get_weather")
            .doc("Get the current weather for a city.\ncity: The city name")
            .param("city", TypeHint::String),
        |args: Map<String, Value>| async move {
            let city = args
                .get("city")
                .and_then(Value::as_str)
                .unwrap_or("nowhere")
                .to_owned();
            Ok(format!("The weather in {city} is sunny."))
        },
    )
}

fn failing_tool() -> impl ToolHandler + 'static {
    tool_fn(
        ToolSignature::new("get_weather").param("city", TypeHint::String),
        |_args: Map<String, Value>| async move {
            Err::<Value, _>(ToolError::new("city database offline"))
        },
    )
}

fn arg_count_tool() -> impl ToolHandler + 'static {
    tool_fn(
        ToolSignature::new("count_args").param_with_default("anything", TypeHint::String),
        |args: Map<String, Value>| async move { Ok(json!(args.len())) },
    )
}

#[derive(Deserialize)]
struct AddArgs {
    a: i64,
    b: i64,
}

fn add_tool() -> impl ToolHandler + 'static {
    typed_tool_fn(
        ToolSignature::new("add")
            .doc("Add two integers.")
            .typed_param::<i64>("a")
            .typed_param::<i64>("b"),
        |args: AddArgs| async move { Ok(args.a + args.b) },
    )
}

fn registry_with(handlers: Vec<Arc<dyn ToolHandler>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for handler in handlers {
        registry.register_shared(handler).unwrap();
    }
    registry
}

fn weather_registry() -> ToolRegistry {
    registry_with(vec![Arc::new(weather_tool())])
}

fn start(tracer: &RecordingTracer) -> RunTrace<'_> {
    RunTrace::begin(tracer, "test_run", &HashMap::new(), "unit_test", None)
}

fn user_transcript(text: &str) -> Transcript {
    Transcript::unredacted(vec![ChatMessage::user(text)])
}

fn weather_call(id: &str, city: &str) -> crate::chat::ToolCallDirective {
    directive(id, "get_weather", &json!({ "city": city }))
}

async fn run(
    provider: &MockProvider,
    registry: &ToolRegistry,
    transcript: Transcript,
    config: &ToolLoopConfig,
    tracer: &RecordingTracer,
) -> Result<ToolLoopResult, LoopError> {
    let trace = start(tracer);
    tool_loop(provider, registry, MODEL, transcript, config, &trace).await
}

// ── Schema generation ───────────────────────────────────────────

#[test]
fn test_required_and_properties_counts() {
    for required in 0..4 {
        for optional in 0..4 {
            let mut signature = ToolSignature::new("t");
            for i in 0..required {
                signature = signature.param(format!("r{i}"), TypeHint::Integer);
            }
            for i in 0..optional {
                signature = signature.param_with_default(format!("o{i}"), TypeHint::String);
            }
            let def = signature.to_definition().unwrap();
            assert_eq!(def.parameters.required().len(), required);
            assert_eq!(
                def.parameters.properties().map(Map::len),
                Some(required + optional)
            );
        }
    }
}

#[test]
fn test_registry_definition_matches_signature() {
    let registry = weather_registry();
    let def = &registry.definitions()[0];
    assert_eq!(def.name, "get_weather");
    assert_eq!(def.description, "Get the current weather for a city.");
    assert_eq!(
        def.parameters.as_value()["properties"]["city"],
        json!({"type": "string", "description": "The city name"})
    );
}

#[test]
fn test_tool_handler_is_object_safe() {
    fn assert_object_safe(_: &dyn ToolHandler) {}
    assert_object_safe(&weather_tool());
}

#[test]
fn test_tool_error_display() {
    assert_eq!(ToolError::new("something broke").to_string(), "something broke");
    assert_eq!(ToolError::not_found("x").to_string(), "Tool not found: x");
}

// ── Handlers ────────────────────────────────────────────────────

#[tokio::test]
async fn test_typed_tool_deserializes_arguments() {
    let tool = add_tool();
    let mut args = Map::new();
    args.insert("a".into(), json!(2));
    args.insert("b".into(), json!(3));
    assert_eq!(tool.invoke(args).await.unwrap(), json!(5));
}

#[tokio::test]
async fn test_typed_tool_rejects_mismatched_arguments() {
    let tool = add_tool();
    let mut args = Map::new();
    args.insert("a".into(), json!("two"));
    let err = tool.invoke(args).await.unwrap_err();
    assert!(err.message.starts_with("add() got invalid arguments"), "{}", err.message);
}

// ── Execution ───────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_call_traces_success() {
    let registry = weather_registry();
    let tracer = RecordingTracer::new();
    let trace = start(&tracer);
    let mut args = Map::new();
    args.insert("city".into(), json!("Montreal"));
    let call = ToolCall::new("c1", "get_weather", args);

    let result = execute_call(&registry, &call, &trace).await;
    assert_eq!(result.result(), Some(&json!("The weather in Montreal is sunny.")));

    let events = tracer.events();
    assert!(matches!(&events[1], TraceEvent::ToolStarted { call: c } if *c == call));
    assert!(matches!(&events[2], TraceEvent::ToolEnded { call_id, .. } if call_id == "c1"));
}

#[tokio::test]
async fn test_execute_call_traces_failure_too() {
    let registry = registry_with(vec![Arc::new(failing_tool())]);
    let tracer = RecordingTracer::new();
    let trace = start(&tracer);
    let mut args = Map::new();
    args.insert("city".into(), json!("Montreal"));
    let call = ToolCall::new("c1", "get_weather", args);

    let result = execute_call(&registry, &call, &trace).await;
    assert_eq!(result.error(), Some("city database offline"));
    let TraceEvent::ToolEnded { output, .. } = &tracer.events()[2] else {
        panic!("expected ToolEnded");
    };
    assert!(output.contains("city database offline"));
}

#[tokio::test]
async fn test_unexpected_argument_fails_before_handler_runs() {
    let registry = registry_with(vec![Arc::new(add_tool())]);
    let tracer = RecordingTracer::new();
    let trace = start(&tracer);
    let mut args = Map::new();
    args.insert("a".into(), json!(1));
    args.insert("b".into(), json!(2));
    args.insert("c".into(), json!(3));
    let call = ToolCall::new("c1", "add", args);

    let result = execute_call(&registry, &call, &trace).await;
    assert!(result.result().is_none());
    assert_eq!(
        result.error(),
        Some("add() got an unexpected keyword argument 'c'")
    );
    let TraceEvent::ToolEnded { output, .. } = &tracer.events()[2] else {
        panic!("expected ToolEnded");
    };
    assert!(output.contains("unexpected keyword argument 'c'"));
}

#[tokio::test]
async fn test_missing_required_argument_fails_before_handler_runs() {
    let registry = weather_registry();
    let call = ToolCall::new("c1", "get_weather", Map::new());

    let result = registry.execute(&call).await;
    assert!(result.result().is_none());
    assert_eq!(
        result.error(),
        Some("get_weather() missing required argument 'city'")
    );
}

#[tokio::test]
async fn test_defaulted_argument_may_be_omitted() {
    let registry = registry_with(vec![Arc::new(arg_count_tool())]);
    let result = registry
        .execute(&ToolCall::new("c1", "count_args", Map::new()))
        .await;
    assert_eq!(result.result(), Some(&json!(0)));
}

#[tokio::test]
async fn test_unregistered_tool_never_raises() {
    let registry = weather_registry();
    let tracer = RecordingTracer::new();
    let trace = start(&tracer);
    for name in ["", "GET_WEATHER", "get_weather ", "unknown"] {
        let call = ToolCall::new("c", name, Map::new());
        let result = execute_call(&registry, &call, &trace).await;
        assert!(result.result().is_none());
        assert!(!result.error().unwrap_or_default().is_empty());
    }
    // Only RunStarted: lookup failures emit no tool events.
    assert_eq!(tracer.events().len(), 1);
}

#[tokio::test]
async fn test_panicking_tool_becomes_error() {
    let sync_panic = tool_fn(
        ToolSignature::new("sync_panic"),
        |_args: Map<String, Value>| -> std::future::Ready<Result<Value, ToolError>> {
            panic!("kaboom")
        },
    );
    let async_panic = tool_fn(
        ToolSignature::new("async_panic"),
        |_args: Map<String, Value>| async move {
            let fail = true;
            if fail {
                panic!("kaboom later");
            }
            Ok(Value::Null)
        },
    );
    let registry = registry_with(vec![Arc::new(sync_panic), Arc::new(async_panic)]);
    let trace = RunTrace::detached();

    let r1 = execute_call(&registry, &ToolCall::new("1", "sync_panic", Map::new()), &trace).await;
    assert_eq!(r1.error(), Some("kaboom"));
    let r2 = execute_call(&registry, &ToolCall::new("2", "async_panic", Map::new()), &trace).await;
    assert_eq!(r2.error(), Some("kaboom later"));
}

// ── Loop: scenarios ─────────────────────────────────────────────

#[tokio::test]
async fn test_no_tool_calls_returns_after_one_request() {
    let mock = mock_with([sample_response("Hello there.")]);
    let tracer = RecordingTracer::new();
    let result = run(
        &mock,
        &weather_registry(),
        user_transcript("hi"),
        &ToolLoopConfig::default(),
        &tracer,
    )
    .await
    .unwrap();

    assert_eq!(result.content, "Hello there.");
    assert_eq!(result.requests, 1);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.termination_reason, TerminationReason::Complete);
    assert_eq!(result.transcript.len(), 1);
    assert_eq!(mock.recorded_calls().len(), 1);
}

#[tokio::test]
async fn test_single_tool_round_trip() {
    let mock = mock_with([
        sample_tool_response(vec![weather_call("call_1", "Montreal")]),
        sample_response("It is sunny in Montreal."),
    ]);
    let tracer = RecordingTracer::new();
    let result = run(
        &mock,
        &weather_registry(),
        user_transcript("What's the weather in Montreal?"),
        &ToolLoopConfig::default(),
        &tracer,
    )
    .await
    .unwrap();

    assert_eq!(result.content, "It is sunny in Montreal.");
    assert_eq!(result.requests, 2);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.total_usage, Usage::new(200, 100));

    let messages = result.transcript.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, ChatRole::Assistant);
    assert_eq!(messages[1].tool_calls.len(), 1);
    assert_eq!(messages[1].tool_calls[0].name, "get_weather");
    assert_eq!(messages[1].tool_calls[0].arguments["city"], "Montreal");
    assert_eq!(messages[2].role, ChatRole::Tool);
    assert_eq!(messages[2].content, "The weather in Montreal is sunny.");
    assert_eq!(messages[2].tool_call_id.as_deref(), Some("call_1"));

    let calls = mock.recorded_calls();
    assert_eq!(calls[0].messages.len(), 1);
    assert_eq!(calls[1].messages.len(), 3);
    assert_eq!(calls[1].model, MODEL);
    assert_eq!(calls[1].max_tokens, Some(4096));
    assert_eq!(calls[1].tools.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_trace_event_sequence() {
    let mock = mock_with([
        sample_tool_response(vec![weather_call("call_1", "Montreal")]),
        sample_response("done"),
    ]);
    let tracer = RecordingTracer::new();
    run(
        &mock,
        &weather_registry(),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &tracer,
    )
    .await
    .unwrap();

    let events = tracer.events();
    assert_eq!(events.len(), 7);
    assert!(matches!(events[0], TraceEvent::RunStarted { .. }));
    assert!(matches!(events[1], TraceEvent::CallStarted { .. }));
    assert!(matches!(events[2], TraceEvent::CallEnded { .. }));
    assert!(matches!(events[3], TraceEvent::ToolStarted { .. }));
    assert!(matches!(events[4], TraceEvent::ToolEnded { .. }));
    assert!(matches!(events[5], TraceEvent::CallStarted { .. }));
    assert!(
        matches!(&events[6], TraceEvent::CallEnded { output, usage } if output == "done" && *usage == sample_usage())
    );
}

#[tokio::test]
async fn test_tool_error_is_fed_back_and_loop_continues() {
    let mock = mock_with([
        sample_tool_response(vec![weather_call("call_1", "Montreal")]),
        sample_response("Sorry, I could not fetch the weather."),
    ]);
    let tracer = RecordingTracer::new();
    let result = run(
        &mock,
        &registry_with(vec![Arc::new(failing_tool())]),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &tracer,
    )
    .await
    .unwrap();

    assert_eq!(result.content, "Sorry, I could not fetch the weather.");
    assert_eq!(result.requests, 2);
    let tool_msg = &result.transcript.messages()[2];
    assert_eq!(tool_msg.content, "Error: city database offline");
}

#[tokio::test]
async fn test_budget_exhaustion_issues_one_final_request() {
    let mut final_response =
        sample_tool_response(vec![weather_call("call_final", "Quebec")]);
    final_response.content = Some("still thinking".into());
    let mock = mock_with([
        sample_tool_response(vec![weather_call("call_1", "Montreal")]),
        sample_tool_response(vec![weather_call("call_2", "Toronto")]),
        final_response,
    ]);
    let tracer = RecordingTracer::new();
    let config = ToolLoopConfig {
        max_iterations: 2,
        ..Default::default()
    };
    let result = run(
        &mock,
        &weather_registry(),
        user_transcript("q"),
        &config,
        &tracer,
    )
    .await
    .unwrap();

    assert_eq!(result.content, "still thinking");
    assert_eq!(result.requests, 3);
    assert_eq!(result.iterations, 2);
    assert_eq!(
        result.termination_reason,
        TerminationReason::MaxIterations { limit: 2 }
    );
    assert!(result.response.has_tool_calls());
    assert_eq!(mock.remaining(), 0);

    // The final response's tool call was never executed.
    let started: Vec<_> = tracer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TraceEvent::ToolStarted { call } => Some(call.call_id),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec!["call_1", "call_2"]);
    // user + 2 × (assistant + tool)
    assert_eq!(result.transcript.len(), 5);
}

#[tokio::test]
async fn test_request_bound_holds_for_any_budget() {
    for max_iterations in 0..5 {
        let mock = mock_with(
            (0..=max_iterations)
                .map(|i| sample_tool_response(vec![weather_call(&format!("c{i}"), "Montreal")])),
        );
        let config = ToolLoopConfig {
            max_iterations,
            ..Default::default()
        };
        let result = run(
            &mock,
            &weather_registry(),
            user_transcript("q"),
            &config,
            &RecordingTracer::new(),
        )
        .await
        .unwrap();
        assert_eq!(result.requests, max_iterations + 1);
        assert_eq!(mock.recorded_calls().len(), (max_iterations + 1) as usize);
    }
}

// ── Loop: edge cases ────────────────────────────────────────────

#[tokio::test]
async fn test_tools_run_in_extraction_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&order);
    let recorder = tool_fn(
        ToolSignature::new("record").param("tag", TypeHint::String),
        move |args: Map<String, Value>| {
            let seen = Arc::clone(&seen);
            async move {
                let tag = args.get("tag").and_then(Value::as_str).unwrap_or_default().to_owned();
                seen.lock().unwrap().push(tag.clone());
                Ok(tag)
            }
        },
    );
    let mock = mock_with([
        sample_tool_response(vec![
            directive("a", "record", &json!({"tag": "first"})),
            directive("b", "record", &json!({"tag": "second"})),
            directive("c", "record", &json!({"tag": "third"})),
        ]),
        sample_response("ok"),
    ]);
    let result = run(
        &mock,
        &registry_with(vec![Arc::new(recorder)]),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &RecordingTracer::new(),
    )
    .await
    .unwrap();

    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    let tool_ids: Vec<_> = result.transcript.messages()[2..]
        .iter()
        .map(|m| m.tool_call_id.clone().unwrap_or_default())
        .collect();
    assert_eq!(tool_ids, vec!["a", "b", "c"]);
    // One assistant message carries all three calls.
    assert_eq!(result.transcript.messages()[1].tool_calls.len(), 3);
}

#[tokio::test]
async fn test_malformed_arguments_reach_tool_as_empty_map() {
    let mock = mock_with([
        sample_tool_response(vec![crate::chat::ToolCallDirective {
            id: "c1".into(),
            name: "count_args".into(),
            arguments: "{not json".into(),
        }]),
        sample_response("ok"),
    ]);
    let result = run(
        &mock,
        &registry_with(vec![Arc::new(arg_count_tool())]),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &RecordingTracer::new(),
    )
    .await
    .unwrap();
    assert_eq!(result.transcript.messages()[2].content, "0");
}

#[tokio::test]
async fn test_unknown_tool_in_loop_is_reported_to_model() {
    let mock = mock_with([
        sample_tool_response(vec![directive("c1", "nope", &json!({}))]),
        sample_response("ok"),
    ]);
    let tracer = RecordingTracer::new();
    let result = run(
        &mock,
        &weather_registry(),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &tracer,
    )
    .await
    .unwrap();
    assert_eq!(result.transcript.messages()[2].content, "Error: Tool not found: nope");
    assert!(
        !tracer
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::ToolStarted { .. }))
    );
}

#[tokio::test]
async fn test_structured_tool_output_is_compact_json() {
    let mock = mock_with([
        sample_tool_response(vec![directive("c1", "add", &json!({"a": 2, "b": 3}))]),
        sample_response("5"),
    ]);
    let result = run(
        &mock,
        &registry_with(vec![Arc::new(add_tool())]),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &RecordingTracer::new(),
    )
    .await
    .unwrap();
    assert_eq!(result.transcript.messages()[2].content, "5");
    assert_eq!(
        result.transcript.messages()[1].tool_calls[0].arguments_json(),
        r#"{"a":2,"b":3}"#
    );
}

#[tokio::test]
async fn test_mismatched_arguments_are_fed_back_to_the_model() {
    let mock = mock_with([
        sample_tool_response(vec![directive("c1", "add", &json!({"a": 1, "b": 2, "c": 3}))]),
        sample_response("retrying"),
    ]);
    let result = run(
        &mock,
        &registry_with(vec![Arc::new(add_tool())]),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &RecordingTracer::new(),
    )
    .await
    .unwrap();
    assert_eq!(result.requests, 2);
    assert_eq!(
        result.transcript.messages()[2].content,
        "Error: add() got an unexpected keyword argument 'c'"
    );
}

#[tokio::test]
async fn test_empty_registry_sends_no_tools_and_ignores_directives() {
    let mock = mock_with([sample_tool_response(vec![weather_call("c1", "Montreal")])]);
    let result = run(
        &mock,
        &ToolRegistry::new(),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &RecordingTracer::new(),
    )
    .await
    .unwrap();
    assert_eq!(result.requests, 1);
    assert_eq!(result.termination_reason, TerminationReason::Complete);
    assert!(mock.recorded_calls()[0].tools.is_none());
}

#[tokio::test]
async fn test_provider_error_keeps_partial_output() {
    let mut first = sample_tool_response(vec![weather_call("c1", "Montreal")]);
    first.content = Some("Let me check.".into());
    let mock = mock_with([first]);
    mock.queue_error(MockError::Http {
        status: Some(http::StatusCode::BAD_GATEWAY),
        message: "upstream down".into(),
        retryable: true,
    });

    let err = run(
        &mock,
        &weather_registry(),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &RecordingTracer::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err.error, LlmError::Http { .. }));
    assert_eq!(err.partial_output, "Let me check.");
    assert_eq!(err.iterations, 1);
    assert_eq!(err.total_usage, sample_usage());
}

#[tokio::test]
async fn test_tracer_failures_do_not_change_results() {
    let responses = || {
        [
            sample_tool_response(vec![weather_call("call_1", "Montreal")]),
            sample_response("It is sunny."),
        ]
    };
    let ok_mock = mock_with(responses());
    let ok = run(
        &ok_mock,
        &weather_registry(),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &RecordingTracer::new(),
    )
    .await
    .unwrap();

    let failing_mock = mock_with(responses());
    let failing_tracer = RecordingTracer::failing();
    let with_failures = run(
        &failing_mock,
        &weather_registry(),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &failing_tracer,
    )
    .await
    .unwrap();

    assert_eq!(ok.content, with_failures.content);
    assert_eq!(ok.transcript, with_failures.transcript);
    assert_eq!(ok_mock.recorded_calls(), failing_mock.recorded_calls());
    assert_eq!(failing_tracer.events().len(), 7);
}

#[tokio::test]
async fn test_redacted_transcript_moves_in_lockstep() {
    let transcript = Transcript::new(
        vec![ChatMessage::user("my token is hunter2")],
        vec![ChatMessage::user("my token is {token}")],
    );
    let mock = mock_with([
        sample_tool_response(vec![weather_call("call_1", "Montreal")]),
        sample_response("done"),
    ]);
    let tracer = RecordingTracer::new();
    let result = run(
        &mock,
        &weather_registry(),
        transcript,
        &ToolLoopConfig::default(),
        &tracer,
    )
    .await
    .unwrap();

    let (messages, redacted) = result.transcript.into_parts();
    assert_eq!(messages.len(), redacted.len());
    assert_eq!(messages[1..], redacted[1..]);
    assert_eq!(redacted[0].content, "my token is {token}");

    // The provider saw the real values, the tracer only the redacted ones.
    assert_eq!(mock.recorded_calls()[0].messages[0].content, "my token is hunter2");
    for event in tracer.events() {
        if let TraceEvent::CallStarted { messages, .. } = event {
            assert_eq!(messages[0].content, "my token is {token}");
        }
    }
}

#[tokio::test]
async fn test_cache_marker_applied_to_every_request() {
    let mock = mock_with([
        sample_tool_response(vec![weather_call("call_1", "Montreal")]),
        sample_response("done"),
    ]);
    let transcript = Transcript::unredacted(vec![
        ChatMessage::system("You are a weather bot."),
        ChatMessage::user("q"),
    ]);
    let config = ToolLoopConfig {
        cache_control_index: Some(0),
        use_prompt_caching: true,
        ..Default::default()
    };
    run(
        &mock,
        &weather_registry(),
        transcript,
        &config,
        &RecordingTracer::new(),
    )
    .await
    .unwrap();

    for call in mock.recorded_calls() {
        assert_eq!(call.messages[0].cache_control, Some(CacheControl::ephemeral()));
        assert!(call.messages[1].cache_control.is_none());
    }
}

#[tokio::test]
async fn test_cache_marker_ignored_without_flag() {
    let mock = mock_with([sample_response("done")]);
    let config = ToolLoopConfig {
        cache_control_index: Some(0),
        ..Default::default()
    };
    run(
        &mock,
        &weather_registry(),
        user_transcript("q"),
        &config,
        &RecordingTracer::new(),
    )
    .await
    .unwrap();
    assert!(mock.recorded_calls()[0].messages[0].cache_control.is_none());
}

#[tokio::test]
async fn test_cache_marker_out_of_range_fails_before_any_request() {
    let mock = MockProvider::new();
    let config = ToolLoopConfig {
        cache_control_index: Some(3),
        use_prompt_caching: true,
        ..Default::default()
    };
    let err = run(
        &mock,
        &weather_registry(),
        user_transcript("q"),
        &config,
        &RecordingTracer::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err.error,
        LlmError::CacheControlIndex { index: 3, len: 1 }
    ));
    assert!(mock.recorded_calls().is_empty());
}

#[tokio::test]
async fn test_empty_content_final_answer_is_empty_string() {
    let mock = mock_with([ChatResponse::default()]);
    let result = run(
        &mock,
        &weather_registry(),
        user_transcript("q"),
        &ToolLoopConfig::default(),
        &RecordingTracer::new(),
    )
    .await
    .unwrap();
    assert_eq!(result.content, "");
}
