//! Request bodies as the Cortex API expects them.
//!
//! Responses decode straight into the core types; only requests need
//! their own shapes.

use cortexclaw_core::api::{FetchMode, RecallMode};
use cortexclaw_core::turns::ConversationTurn;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct AddMemoryRequest<'a> {
    pub memories: Vec<MemoryPayload<'a>>,
    pub tenant_id: &'a str,
    pub sub_tenant_id: &'a str,
    pub upsert: bool,
}

/// One memory to ingest: either free text or user/assistant pairs.
#[derive(Debug, Default, Serialize)]
pub(crate) struct MemoryPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_assistant_pairs: Option<&'a [ConversationTurn]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_markdown: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub infer: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,

    /// JSON-encoded object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_metadata: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecallRequest<'a> {
    pub tenant_id: &'a str,
    pub sub_tenant_id: &'a str,
    pub query: &'a str,
    pub max_results: usize,
    pub mode: RecallMode,
    pub alpha: f64,
    pub recency_bias: f64,
    pub graph_context: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListDataRequest<'a> {
    pub tenant_id: &'a str,
    pub sub_tenant_id: &'a str,
    pub kind: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ids: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FetchContentRequest<'a> {
    pub tenant_id: &'a str,
    pub sub_tenant_id: &'a str,
    pub source_id: &'a str,
    pub mode: FetchMode,
}
