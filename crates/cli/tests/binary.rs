//! Runs the built hook binary the way the host does: envelope on stdin,
//! envelope on stdout, exit status checked.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn invoke(log_dir: &std::path::Path, stdin: &[u8], extra_args: &[&str]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_prompt-triage-hook"))
        .arg("--log-dir")
        .arg(log_dir)
        .args(extra_args)
        .env("HOME", log_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn hook binary");
    child
        .stdin
        .take()
        .expect("piped stdin")
        .write_all(stdin)
        .expect("write stdin");
    child.wait_with_output().expect("hook exits")
}

fn additional_context(output: &Output) -> String {
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json on stdout");
    assert_eq!(value["hookSpecificOutput"]["hookEventName"], "UserPromptSubmit");
    value["hookSpecificOutput"]["additionalContext"]
        .as_str()
        .expect("string context")
        .to_string()
}

#[test]
fn delegation_prompt_round_trip() {
    let logs = TempDir::new().unwrap();
    let output = invoke(
        logs.path(),
        br#"{"prompt":"Please orchestrate a full review of the system","session_id":"s1","cwd":"/w"}"#,
        &[],
    );

    assert!(output.status.success());
    let context = additional_context(&output);
    assert!(context.contains("Classification hint: Explicit Request"));

    let log = std::fs::read_to_string(logs.path().join("orchestrator_hook.log")).unwrap();
    assert!(log.contains("Decision: ORCHESTRATE"));
    assert!(log.contains("Hook triggered - Session: s1"));
}

#[test]
fn garbage_input_still_exits_successfully_with_empty_context() {
    let logs = TempDir::new().unwrap();
    let output = invoke(logs.path(), b"this is not json", &[]);

    assert!(output.status.success());
    assert_eq!(additional_context(&output), "");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Hook error"));
}

#[test]
fn empty_stdin_exits_successfully_with_empty_context() {
    let logs = TempDir::new().unwrap();
    let output = invoke(logs.path(), b"", &[]);

    assert!(output.status.success());
    assert_eq!(additional_context(&output), "");
}

#[test]
fn bad_arguments_fall_back_to_defaults_and_still_answer() {
    let logs = TempDir::new().unwrap();
    let output = invoke(
        logs.path(),
        br#"{"prompt":"What is recursion"}"#,
        &["--log-max-bytes", "zero"],
    );

    assert!(output.status.success());
    assert!(additional_context(&output).contains("<simple-query-detected>"));
}

#[test]
fn unusable_log_dir_does_not_block_the_hook() {
    let logs = TempDir::new().unwrap();
    let blocker = logs.path().join("not-a-dir");
    std::fs::write(&blocker, "file in the way").unwrap();

    let output = invoke(&blocker, br#"{"prompt":"ok"}"#, &[]);

    assert!(output.status.success());
    assert!(additional_context(&output).contains(r#"Query: "ok""#));
}
