//! JSON envelopes exchanged with the host pipeline.
//!
//! Input: `{"prompt": ..., "session_id": ..., "cwd": ...}`. Any other fields
//! the host sends are ignored.
//!
//! Output: `{"hookSpecificOutput": {"hookEventName": "UserPromptSubmit",
//! "additionalContext": ...}}` on a single line.

use serde::{Deserialize, Serialize};
use triage::{ContextPayload, Request, SessionId, WorkingDirectory};

use crate::HookError;

/// Event name the host expects back from a prompt-submit hook.
pub const USER_PROMPT_SUBMIT: &str = "UserPromptSubmit";

/// Raw input envelope as read from the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputEnvelope {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

impl InputEnvelope {
    /// Converts to a domain request, filling in defaults for absent fields.
    pub fn into_request(self) -> Request {
        Request {
            prompt: self.prompt.unwrap_or_default(),
            session_id: SessionId::from_optional(self.session_id),
            cwd: WorkingDirectory::from_optional(self.cwd),
        }
    }
}

/// Parses the raw input text into a [`Request`].
///
/// The top-level value must be a JSON object. Arrays are rejected even though
/// the derived struct visitor would read them positionally.
pub fn decode(raw: &str) -> Result<Request, HookError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(HookError::MalformedEnvelope)?;
    if !value.is_object() {
        return Err(HookError::MalformedEnvelope(serde::de::Error::custom(
            format_args!("input envelope must be a JSON object, found {}", json_kind(&value)),
        )));
    }
    let envelope: InputEnvelope =
        serde_json::from_value(value).map_err(HookError::MalformedEnvelope)?;
    Ok(envelope.into_request())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------

/// Response envelope written back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEnvelope {
    pub hook_specific_output: HookSpecificOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub additional_context: ContextPayload,
}

impl OutputEnvelope {
    /// Wraps a rendered payload in a `UserPromptSubmit` response.
    pub fn user_prompt_submit(payload: ContextPayload) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: USER_PROMPT_SUBMIT.to_string(),
                additional_context: payload,
            },
        }
    }

    /// The response used whenever the decision cycle fails.
    pub fn empty() -> Self {
        Self::user_prompt_submit(ContextPayload::empty())
    }

    /// The injected context text.
    pub fn additional_context(&self) -> &str {
        self.hook_specific_output.additional_context.as_str()
    }
}

/// Serialises the envelope to one line of JSON (no trailing newline).
pub fn encode(envelope: &OutputEnvelope) -> Result<String, HookError> {
    serde_json::to_string(envelope).map_err(HookError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reads_all_three_fields() {
        let request = decode(r#"{"prompt":"hi there","session_id":"s-1","cwd":"/work"}"#).unwrap();
        assert_eq!(request.prompt, "hi there");
        assert_eq!(request.session_id.as_str(), "s-1");
        assert_eq!(request.cwd.as_str(), "/work");
    }

    #[test]
    fn decode_defaults_missing_fields() {
        let request = decode("{}").unwrap();
        assert_eq!(request.prompt, "");
        assert_eq!(request.session_id.as_str(), "unknown");
        assert_eq!(request.cwd.as_str(), "unknown");
    }

    #[test]
    fn decode_keeps_present_empty_fields() {
        let request = decode(r#"{"prompt":"x","session_id":"","cwd":""}"#).unwrap();
        assert_eq!(request.session_id.as_str(), "");
        assert_eq!(request.cwd.as_str(), "");
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let request = decode(
            r#"{"prompt":"x","hook_event_name":"UserPromptSubmit","transcript_path":"/t.jsonl"}"#,
        )
        .unwrap();
        assert_eq!(request.prompt, "x");
    }

    #[test]
    fn decode_rejects_non_objects_and_wrong_types() {
        for raw in [
            "",
            "not json",
            "[]",
            r#"["x"]"#,
            r#"["x", "s", "/w"]"#,
            "42",
            "null",
            r#""prompt""#,
            r#"{"prompt": 7}"#,
            r#"{"prompt": "#,
        ] {
            assert!(
                matches!(decode(raw), Err(HookError::MalformedEnvelope(_))),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn decode_names_the_top_level_kind_it_refused() {
        let err = decode(r#"["Rename all files across the repo"]"#).unwrap_err();
        assert!(err.chain().contains("found an array"), "{}", err.chain());
    }

    #[test]
    fn encode_produces_the_host_shape() {
        let line = encode(&OutputEnvelope::empty()).unwrap();
        assert_eq!(
            line,
            r#"{"hookSpecificOutput":{"hookEventName":"UserPromptSubmit","additionalContext":""}}"#
        );
        assert!(!line.contains('\n'));
    }
}
