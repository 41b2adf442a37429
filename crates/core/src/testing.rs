//! In-process [`MemoryApi`] for tests.
//!
//! Records every call and answers with canned responses. Enabled for
//! downstream crates through the `test-util` feature.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::api::{
    AddMemoryResponse, CaptureMetadata, DeleteMemoryResponse, FetchContentResponse, FetchMode, IngestTextOptions,
    ListMemoriesResponse, ListSourcesResponse, MemoryApi, RecallOptions, UserMemory,
};
use crate::error::ApiError;
use crate::recall::RecallResponse;
use crate::turns::ConversationTurn;

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    IngestConversation {
        turns: Vec<ConversationTurn>,
        source_id: String,
        metadata: Option<CaptureMetadata>,
    },
    IngestText {
        text: String,
        options: IngestTextOptions,
    },
    Recall {
        query: String,
        options: RecallOptions,
    },
    ListMemories,
    ListSources {
        source_ids: Option<Vec<String>>,
    },
    DeleteMemory {
        memory_id: String,
    },
    FetchContent {
        source_id: String,
        mode: FetchMode,
    },
}

#[derive(Default)]
struct Script {
    recall: RecallResponse,
    memories: Vec<UserMemory>,
    deleted: bool,
    fetch: FetchContentResponse,
    failure: Option<ApiError>,
}

pub struct ScriptedApi {
    tenant_id: String,
    sub_tenant_id: String,
    calls: Mutex<Vec<ApiCall>>,
    script: Mutex<Script>,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            tenant_id: "tenant-test".into(),
            sub_tenant_id: "sub-test".into(),
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(Script::default()),
        }
    }

    pub fn with_recall(self, response: RecallResponse) -> Self {
        self.script.lock().unwrap().recall = response;
        self
    }

    pub fn with_memories(self, memories: Vec<UserMemory>) -> Self {
        self.script.lock().unwrap().memories = memories;
        self
    }

    pub fn with_deleted(self, deleted: bool) -> Self {
        self.script.lock().unwrap().deleted = deleted;
        self
    }

    pub fn with_fetch(self, response: FetchContentResponse) -> Self {
        self.script.lock().unwrap().fetch = response;
        self
    }

    /// Every call fails with `error` from now on.
    pub fn failing(self, error: ApiError) -> Self {
        self.script.lock().unwrap().failure = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match &self.script.lock().unwrap().failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn added(&self) -> AddMemoryResponse {
        AddMemoryResponse {
            success: true,
            message: "ok".into(),
            success_count: 1,
            ..Default::default()
        }
    }
}

#[async_trait]
impl MemoryApi for ScriptedApi {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn sub_tenant_id(&self) -> &str {
        &self.sub_tenant_id
    }

    async fn ingest_conversation(
        &self,
        turns: &[ConversationTurn],
        source_id: &str,
        metadata: Option<&CaptureMetadata>,
    ) -> Result<AddMemoryResponse, ApiError> {
        self.record(ApiCall::IngestConversation {
            turns: turns.to_vec(),
            source_id: source_id.into(),
            metadata: metadata.cloned(),
        })?;
        Ok(self.added())
    }

    async fn ingest_text(&self, text: &str, options: IngestTextOptions) -> Result<AddMemoryResponse, ApiError> {
        self.record(ApiCall::IngestText {
            text: text.into(),
            options,
        })?;
        Ok(self.added())
    }

    async fn recall(&self, query: &str, options: RecallOptions) -> Result<RecallResponse, ApiError> {
        self.record(ApiCall::Recall {
            query: query.into(),
            options,
        })?;
        Ok(self.script.lock().unwrap().recall.clone())
    }

    async fn list_memories(&self) -> Result<ListMemoriesResponse, ApiError> {
        self.record(ApiCall::ListMemories)?;
        Ok(ListMemoriesResponse {
            success: true,
            user_memories: self.script.lock().unwrap().memories.clone(),
        })
    }

    async fn list_sources(&self, source_ids: Option<&[String]>) -> Result<ListSourcesResponse, ApiError> {
        self.record(ApiCall::ListSources {
            source_ids: source_ids.map(<[String]>::to_vec),
        })?;
        Ok(ListSourcesResponse {
            success: true,
            ..Default::default()
        })
    }

    async fn delete_memory(&self, memory_id: &str) -> Result<DeleteMemoryResponse, ApiError> {
        self.record(ApiCall::DeleteMemory {
            memory_id: memory_id.into(),
        })?;
        Ok(DeleteMemoryResponse {
            success: true,
            user_memory_deleted: self.script.lock().unwrap().deleted,
        })
    }

    async fn fetch_content(&self, source_id: &str, mode: FetchMode) -> Result<FetchContentResponse, ApiError> {
        self.record(ApiCall::FetchContent {
            source_id: source_id.into(),
            mode,
        })?;
        Ok(self.script.lock().unwrap().fetch.clone())
    }
}

/// Logger that keeps every line, prefixed with its level.
#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }

    fn push(&self, level: &str, msg: &str) {
        self.lines.lock().unwrap().push(format!("{level} {msg}"));
    }
}

impl crate::log::Logger for RecordingLogger {
    fn info(&self, msg: &str) {
        self.push("INFO", msg);
    }

    fn warn(&self, msg: &str) {
        self.push("WARN", msg);
    }

    fn error(&self, msg: &str) {
        self.push("ERROR", msg);
    }

    fn debug(&self, msg: &str) {
        self.push("DEBUG", msg);
    }
}
