//! Host lifecycle events, decoded leniently from the host's JSON.

use cortexclaw_core::message::{Message, transcript_from_values};
use serde::Serialize;
use serde_json::Value;

/// Per-event host context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookContext {
    pub session_id: Option<String>,
}

impl HookContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
        }
    }

    /// Reads `sessionId`; anything else is ignored.
    pub fn from_value(value: &Value) -> Self {
        Self {
            session_id: value
                .get("sessionId")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from),
        }
    }
}

/// Fired before the agent handles a prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeforeAgentStart {
    pub prompt: Option<String>,
    /// `None` when the host did not send a transcript
    pub messages: Option<Vec<Message>>,
}

impl BeforeAgentStart {
    pub fn from_value(value: &Value) -> Self {
        Self {
            prompt: value.get("prompt").and_then(Value::as_str).map(String::from),
            messages: messages_of(value),
        }
    }
}

/// Fired after the agent finishes a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentEnd {
    pub success: bool,
    pub messages: Option<Vec<Message>>,
}

impl AgentEnd {
    pub fn from_value(value: &Value) -> Self {
        Self {
            success: value.get("success").and_then(Value::as_bool).unwrap_or(false),
            messages: messages_of(value),
        }
    }
}

/// What the recall hook hands back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptInjection {
    pub prepend_context: String,
}

fn messages_of(value: &Value) -> Option<Vec<Message>> {
    value
        .get("messages")
        .and_then(Value::as_array)
        .map(|items| transcript_from_values(items))
}
