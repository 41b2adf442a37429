//! MemoryApi trait: the remote memory service as the rest of the plugin sees it.
//!
//! The HTTP implementation lives in `cortexclaw-client`. Tools, hooks and
//! slash commands only hold an `Arc<dyn MemoryApi>`, so tests swap in a
//! scripted implementation.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ApiError;
use crate::recall::{RecallResponse, nullable};
use crate::turns::ConversationTurn;

pub const DEFAULT_BASE_URL: &str = "https://api.usecortex.ai";

/// Recall strategy. `Thinking` is slower and lets the service rewrite the
/// query before searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecallMode {
    Fast,
    Thinking,
}

impl RecallMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Thinking => "thinking",
        }
    }
}

impl fmt::Display for RecallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs for a recall query.
#[derive(Debug, Clone, PartialEq)]
pub struct RecallOptions {
    pub max_results: usize,
    pub mode: RecallMode,
    pub graph_context: bool,
    pub recency_bias: f64,
}

impl Default for RecallOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            mode: RecallMode::Thinking,
            graph_context: true,
            recency_bias: 0.0,
        }
    }
}

/// Knobs for free-text ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestTextOptions {
    pub source_id: Option<String>,
    pub title: Option<String>,
    /// Let the service extract memories from the text
    pub infer: bool,
    pub is_markdown: bool,
    /// Overrides the default extraction instructions when inferring
    pub custom_instructions: Option<String>,
}

impl Default for IngestTextOptions {
    fn default() -> Self {
        Self {
            source_id: None,
            title: None,
            infer: true,
            is_markdown: false,
            custom_instructions: None,
        }
    }
}

/// What `fetch_content` should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    #[default]
    Content,
    Url,
    Both,
}

/// Metadata attached to captured conversations, sent as `document_metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// RFC 3339 capture time
    pub captured_at: String,

    /// `openclaw_hook` or `openclaw_tool`
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_count: Option<usize>,

    /// Free-text note supplied with a manual store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CaptureMetadata {
    pub fn new(source: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            captured_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            source: source.into(),
            turn_count: None,
            note: None,
        }
    }

    pub fn with_turn_count(mut self, count: usize) -> Self {
        self.turn_count = Some(count);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

// --- Responses ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryResultItem {
    #[serde(default, deserialize_with = "nullable")]
    pub source_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub status: String,

    #[serde(default, deserialize_with = "nullable")]
    pub infer: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddMemoryResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub success: bool,

    #[serde(default, deserialize_with = "nullable")]
    pub message: String,

    #[serde(default, deserialize_with = "nullable")]
    pub results: Vec<MemoryResultItem>,

    #[serde(default, deserialize_with = "nullable")]
    pub success_count: usize,

    #[serde(default, deserialize_with = "nullable")]
    pub failed_count: usize,
}

/// A memory the service extracted for the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMemory {
    #[serde(default, deserialize_with = "nullable")]
    pub memory_id: String,

    #[serde(default, deserialize_with = "nullable")]
    pub memory_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListMemoriesResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub success: bool,

    #[serde(default, deserialize_with = "nullable")]
    pub user_memories: Vec<UserMemory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,

    #[serde(default, deserialize_with = "nullable")]
    pub tenant_id: String,

    #[serde(default, deserialize_with = "nullable")]
    pub sub_tenant_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSourcesResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub sources: Vec<SourceItem>,

    #[serde(default, deserialize_with = "nullable")]
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteMemoryResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub success: bool,

    #[serde(default, deserialize_with = "nullable")]
    pub user_memory_deleted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchContentResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub success: bool,

    #[serde(default, deserialize_with = "nullable")]
    pub source_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_base64: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presigned_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchContentResponse {
    /// The service reported success and no error.
    pub fn is_ok(&self) -> bool {
        self.success && self.error.is_none()
    }

    /// Text content, else the base64 payload.
    pub fn body(&self) -> Option<&str> {
        self.content.as_deref().or(self.content_base64.as_deref())
    }
}

/// The remote memory service.
///
/// Every call is a single request; failures surface as [`ApiError`] and
/// are never retried here.
#[async_trait]
pub trait MemoryApi: Send + Sync {
    fn tenant_id(&self) -> &str;

    fn sub_tenant_id(&self) -> &str;

    /// Store conversation turns under `source_id`, upserting.
    async fn ingest_conversation(
        &self,
        turns: &[ConversationTurn],
        source_id: &str,
        metadata: Option<&CaptureMetadata>,
    ) -> std::result::Result<AddMemoryResponse, ApiError>;

    /// Store free text.
    async fn ingest_text(
        &self,
        text: &str,
        options: IngestTextOptions,
    ) -> std::result::Result<AddMemoryResponse, ApiError>;

    /// Retrieve chunks (and optionally graph context) relevant to `query`.
    async fn recall(&self, query: &str, options: RecallOptions) -> std::result::Result<RecallResponse, ApiError>;

    async fn list_memories(&self) -> std::result::Result<ListMemoriesResponse, ApiError>;

    /// List stored sources, optionally restricted to `source_ids`.
    async fn list_sources(&self, source_ids: Option<&[String]>) -> std::result::Result<ListSourcesResponse, ApiError>;

    async fn delete_memory(&self, memory_id: &str) -> std::result::Result<DeleteMemoryResponse, ApiError>;

    async fn fetch_content(&self, source_id: &str, mode: FetchMode) -> std::result::Result<FetchContentResponse, ApiError>;
}
