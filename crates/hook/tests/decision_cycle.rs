//! End-to-end tests of one decision cycle through `hook::run`.

use std::io::{self, Read, Write};

use hook::{run, HookError, LogSink, OutputEnvelope, USER_PROMPT_SUBMIT};
use proptest::prelude::*;
use triage::{ComplexityTier, ReasonCode};

fn cycle(input: &str) -> (Result<triage::Outcome, HookError>, OutputEnvelope, String) {
    let (sink, buffer) = LogSink::capturing();
    let mut output = Vec::new();
    let result = run(input.as_bytes(), &mut output, &sink);
    let text = String::from_utf8(output).expect("utf-8 output");
    assert!(text.ends_with('\n'));
    assert_eq!(text.lines().count(), 1, "one line of output: {text}");
    let envelope: OutputEnvelope = serde_json::from_str(text.trim_end()).expect("well-formed envelope");
    assert_eq!(envelope.hook_specific_output.hook_event_name, USER_PROMPT_SUBMIT);
    (result, envelope, buffer.contents())
}

fn envelope_for(prompt: &str) -> String {
    serde_json::json!({
        "prompt": prompt,
        "session_id": "sess-42",
        "cwd": "/home/dev/project",
        "hook_event_name": "UserPromptSubmit",
    })
    .to_string()
}

#[test]
fn explicit_request_injects_the_delegation_block() {
    let (result, envelope, logs) = cycle(&envelope_for("Please orchestrate a full review of the system"));

    let outcome = result.unwrap();
    assert_eq!(outcome.decision.reason, ReasonCode::ExplicitRequest);
    assert_eq!(outcome.decision.tier, ComplexityTier::HighComplexity);

    let context = envelope.additional_context();
    assert!(context.contains("<orchestrator-analysis-required>"));
    assert!(context.contains(r#"USER PROMPT: "Please orchestrate a full review of the system""#));
    assert!(context.contains("Total estimated: ~43,000 tokens"));

    assert!(logs.contains("Hook triggered - Session: sess-42"));
    assert!(logs.contains("CWD: /home/dev/project"));
    assert!(logs.contains("Decision: ORCHESTRATE"));
    assert!(logs.contains("Reason: explicit_request"));
    assert!(logs.contains("Complexity: high_complexity"));
    assert!(logs.contains("Cost estimate: $0.129 USD (~43,000 tokens)"));
    assert!(logs.contains("Hook completed successfully"));
}

#[test]
fn simple_query_injects_the_simple_block() {
    let (result, envelope, logs) = cycle(&envelope_for("What is recursion"));

    let outcome = result.unwrap();
    assert!(!outcome.decision.needs_delegation);
    assert_eq!(outcome.decision.reason, ReasonCode::SimpleQuery);
    assert!(envelope.additional_context().contains(r#"Query: "What is recursion""#));
    assert!(logs.contains("Decision: SKIP"));
    assert!(logs.contains("No orchestration needed - simple query"));
}

#[test]
fn cross_layer_prompt_is_logged_with_layer_count() {
    let (result, _, logs) = cycle(&envelope_for("Backfill silver from bronze and publish to gold"));
    assert_eq!(result.unwrap().decision.reason, ReasonCode::CrossLayerWork);
    assert!(logs.contains("Classified as CROSS-LAYER WORK (3 layers)"), "{logs}");
}

#[test]
fn one_word_prompt_is_too_short() {
    let (result, envelope, _) = cycle(&envelope_for("ok"));
    assert_eq!(result.unwrap().decision.reason, ReasonCode::TooShort);
    assert!(envelope.additional_context().contains("<simple-query-detected>"));
}

#[test]
fn every_line_carries_the_invocation_span() {
    let (_, _, logs) = cycle(&envelope_for("ok"));
    assert!(logs.lines().count() > 3);
    assert!(logs.lines().all(|l| l.contains("{invocation=")), "{logs}");
}

#[test]
fn missing_fields_use_defaults() {
    let (result, _, logs) = cycle("{}");
    let outcome = result.unwrap();
    assert_eq!(outcome.decision.reason, ReasonCode::TooShort);
    assert!(logs.contains("Hook triggered - Session: unknown"));
    assert!(logs.contains("CWD: unknown"));
}

#[test]
fn malformed_input_yields_an_empty_payload() {
    for input in [
        "",
        "   ",
        "{not json",
        "[1,2,3]",
        "[]",
        r#"["x"]"#,
        r#"["Rename all files across the repo"]"#,
        r#"["x", "s", "/w"]"#,
        r#"{"prompt": ["a"]}"#,
    ] {
        let (result, envelope, logs) = cycle(input);
        assert!(matches!(result, Err(HookError::MalformedEnvelope(_))), "{input:?}");
        assert_eq!(envelope.additional_context(), "");
        assert!(logs.contains("Hook error"));
        assert!(logs.contains("ERROR"));
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"))
    }
}

#[test]
fn unreadable_input_yields_an_empty_payload() {
    let (sink, buffer) = LogSink::capturing();
    let mut output = Vec::new();
    let result = run(FailingReader, &mut output, &sink);

    assert!(matches!(result, Err(HookError::Read(_))));
    let envelope: OutputEnvelope = serde_json::from_slice(&output).unwrap();
    assert_eq!(envelope.additional_context(), "");
    assert!(buffer.contents().contains("stdin closed"));
}

#[test]
fn invalid_utf8_input_yields_an_empty_payload() {
    let (sink, _) = LogSink::capturing();
    let mut output = Vec::new();
    let result = run(&[0xff, 0xfe, 0x7b][..], &mut output, &sink);

    assert!(matches!(result, Err(HookError::Read(_))));
    let envelope: OutputEnvelope = serde_json::from_slice(&output).unwrap();
    assert_eq!(envelope.additional_context(), "");
}

struct PanickingReader;

impl Read for PanickingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        panic!("reader exploded")
    }
}

#[test]
fn panic_inside_the_cycle_yields_an_empty_payload() {
    let (sink, buffer) = LogSink::capturing();
    let mut output = Vec::new();
    let result = run(PanickingReader, &mut output, &sink);

    match result {
        Err(HookError::Panicked { message }) => assert_eq!(message, "reader exploded"),
        other => panic!("unexpected {other:?}"),
    }
    let envelope: OutputEnvelope = serde_json::from_slice(&output).unwrap();
    assert_eq!(envelope.additional_context(), "");
    assert!(buffer.contents().contains("Decision cycle panicked: reader exploded"));
}

struct ClosedOutput;

impl Write for ClosedOutput {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn write_failure_is_reported_not_raised() {
    let (sink, buffer) = LogSink::capturing();
    let input = envelope_for("What is recursion");
    let result = run(input.as_bytes(), ClosedOutput, &sink);

    assert!(matches!(result, Err(HookError::Write(_))));
    assert!(buffer.contents().contains("stdout closed"));
}

proptest! {
    #[test]
    fn any_input_produces_a_well_formed_envelope(input in ".{0,300}") {
        let (sink, _) = LogSink::capturing();
        let mut output = Vec::new();
        let result = run(input.as_bytes(), &mut output, &sink);

        let envelope: OutputEnvelope = serde_json::from_slice(&output).unwrap();
        prop_assert_eq!(envelope.hook_specific_output.hook_event_name.as_str(), USER_PROMPT_SUBMIT);
        if result.is_err() {
            prop_assert_eq!(envelope.additional_context(), "");
        } else {
            prop_assert!(!envelope.additional_context().is_empty());
        }
    }

    #[test]
    fn any_prompt_inside_a_valid_envelope_is_rendered(prompt in ".{0,200}") {
        let (sink, _) = LogSink::capturing();
        let mut output = Vec::new();
        let input = serde_json::json!({ "prompt": prompt.clone() }).to_string();
        let outcome = run(input.as_bytes(), &mut output, &sink).unwrap();

        let envelope: OutputEnvelope = serde_json::from_slice(&output).unwrap();
        prop_assert!(envelope.additional_context().contains(prompt.as_str()));
        prop_assert_eq!(envelope.additional_context(), outcome.payload.as_str());
    }
}
