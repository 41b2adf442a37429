//! Transcript message types.
//!
//! The host hands over its conversation as loosely shaped JSON. These
//! types pin that down into tagged variants: a message is a [`Role`] plus
//! either plain text or a list of content blocks, and only `text` blocks
//! carry anything we care about. Decoding is lenient: odd shapes become
//! inert messages rather than errors.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// Anything else (system, tool, or a tag we have never seen)
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Map a host role tag onto a role. Unrecognized tags are `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::Unknown,
        }
    }
}

/// One typed block inside structured message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    /// Images, tool calls, tool results, thinking blocks, ...
    #[serde(other)]
    Other,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Decode a block from host JSON. Anything that is not an object with
    /// `type == "text"` and a string `text` field is `Other`.
    pub fn from_value(value: &Value) -> Self {
        let kind = value.get("type").and_then(Value::as_str);
        let text = value.get("text").and_then(Value::as_str);
        match (kind, text) {
            (Some("text"), Some(text)) => Self::text(text),
            _ => Self::Other,
        }
    }
}

/// Message content: a plain string or an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl MessageContent {
    /// Decode content from host JSON. Strings and arrays are understood;
    /// every other shape yields empty content.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::Blocks(items.iter().map(ContentBlock::from_value).collect()),
            _ => Self::Blocks(Vec::new()),
        }
    }

    /// The text this content contributes: the string itself, or the
    /// newline-joined non-empty `text` blocks in order.
    pub fn text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } if !text.is_empty() => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The content, plain or structured
    #[serde(default)]
    pub content: MessageContent,
}

impl Message {
    /// Create a user message with plain text content.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message with plain text content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a message with structured content blocks.
    pub fn with_blocks(role: Role, blocks: Vec<ContentBlock>) -> Self {
        Self {
            role,
            content: MessageContent::Blocks(blocks),
        }
    }

    pub fn text(&self) -> String {
        self.content.text()
    }

    /// Decode one host transcript entry. Non-objects are skipped (`None`);
    /// a missing or unrecognized role becomes `Role::Unknown`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let role = obj
            .get("role")
            .and_then(Value::as_str)
            .map(Role::from_tag)
            .unwrap_or(Role::Unknown);
        let content = obj
            .get("content")
            .map(MessageContent::from_value)
            .unwrap_or_default();
        Some(Self { role, content })
    }
}

/// Decode a whole host transcript, dropping entries that are not objects.
pub fn transcript_from_values(values: &[Value]) -> Vec<Message> {
    values.iter().filter_map(Message::from_value).collect()
}
