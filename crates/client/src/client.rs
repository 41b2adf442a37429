//! Cortex API client.
//!
//! Thin JSON-over-HTTPS wrapper: bearer auth, one request per call, and
//! any non-2xx status surfaces as [`ApiError::Status`] with the response
//! body. No retries.

use async_trait::async_trait;
use cortexclaw_core::api::{
    AddMemoryResponse, CaptureMetadata, DEFAULT_BASE_URL, DeleteMemoryResponse, FetchContentResponse, FetchMode,
    IngestTextOptions, ListMemoriesResponse, ListSourcesResponse, MemoryApi, RecallOptions,
};
use cortexclaw_core::error::ApiError;
use cortexclaw_core::log::Logger;
use cortexclaw_core::recall::RecallResponse;
use cortexclaw_core::turns::ConversationTurn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::wire::{AddMemoryRequest, FetchContentRequest, ListDataRequest, MemoryPayload, RecallRequest};

/// Extraction guidance sent with every inferred ingestion.
pub const INGEST_INSTRUCTIONS: &str = "Focus on extracting user preferences, habits, opinions, likes, dislikes, \
goals, and recurring themes. Capture any stated or implied personal context \
that would help personalise future interactions. Capture important personal details like \
name, age, email ids, phone numbers, etc. along with the original name and context \
so that it can be used to personalise future interactions.";

const DEFAULT_USER_NAME: &str = "User";
const RECALL_ALPHA: f64 = 0.8;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct CortexClient {
    base_url: String,
    api_key: String,
    tenant_id: String,
    sub_tenant_id: String,
    client: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl CortexClient {
    pub fn new(
        api_key: impl Into<String>,
        tenant_id: impl Into<String>,
        sub_tenant_id: impl Into<String>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let this = Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            tenant_id: tenant_id.into(),
            sub_tenant_id: sub_tenant_id.into(),
            client,
            logger,
        };
        this.logger
            .info(&format!("connected (tenant={}, sub={})", this.tenant_id, this.sub_tenant_id));
        this
    }

    /// Point the client at another deployment (or a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.logger.debug(&format!("POST {path}"));
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.decode(path, response).await
    }

    async fn delete<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.logger.debug(&format!("DELETE {path}"));
        let response = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.decode(path, response).await
    }

    async fn decode<T>(&self, path: &str, response: reqwest::Response) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.logger
                .warn(&format!("request failed: {path} -> {}", status.as_u16()));
            return Err(ApiError::Status {
                path: path.to_string(),
                status_code: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn add_memory(&self, payload: MemoryPayload<'_>) -> Result<AddMemoryResponse, ApiError> {
        let request = AddMemoryRequest {
            memories: vec![payload],
            tenant_id: &self.tenant_id,
            sub_tenant_id: &self.sub_tenant_id,
            upsert: true,
        };
        self.post("/memories/add_memory", &request).await
    }
}

#[async_trait]
impl MemoryApi for CortexClient {
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
        let document_metadata = metadata
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Decode {
                path: "/memories/add_memory".into(),
                reason: e.to_string(),
            })?;

        self.add_memory(MemoryPayload {
            user_assistant_pairs: Some(turns),
            infer: Some(true),
            source_id: Some(source_id),
            user_name: Some(DEFAULT_USER_NAME),
            custom_instructions: Some(INGEST_INSTRUCTIONS),
            document_metadata,
            ..Default::default()
        })
        .await
    }

    async fn ingest_text(&self, text: &str, options: IngestTextOptions) -> Result<AddMemoryResponse, ApiError> {
        let custom_instructions = options
            .infer
            .then(|| options.custom_instructions.as_deref().unwrap_or(INGEST_INSTRUCTIONS));

        self.add_memory(MemoryPayload {
            text: Some(text),
            infer: Some(options.infer),
            is_markdown: Some(options.is_markdown),
            custom_instructions,
            source_id: options.source_id.as_deref().filter(|s| !s.is_empty()),
            title: options.title.as_deref().filter(|s| !s.is_empty()),
            ..Default::default()
        })
        .await
    }

    async fn recall(&self, query: &str, options: RecallOptions) -> Result<RecallResponse, ApiError> {
        let request = RecallRequest {
            tenant_id: &self.tenant_id,
            sub_tenant_id: &self.sub_tenant_id,
            query,
            max_results: options.max_results,
            mode: options.mode,
            alpha: RECALL_ALPHA,
            recency_bias: options.recency_bias,
            graph_context: options.graph_context,
        };
        self.post("/recall/recall_preferences", &request).await
    }

    async fn list_memories(&self) -> Result<ListMemoriesResponse, ApiError> {
        let request = ListDataRequest {
            tenant_id: &self.tenant_id,
            sub_tenant_id: &self.sub_tenant_id,
            kind: "memories",
            source_ids: None,
        };
        self.post("/list/data", &request).await
    }

    async fn list_sources(&self, source_ids: Option<&[String]>) -> Result<ListSourcesResponse, ApiError> {
        let request = ListDataRequest {
            tenant_id: &self.tenant_id,
            sub_tenant_id: &self.sub_tenant_id,
            kind: "memories",
            source_ids,
        };
        self.post("/list/data", &request).await
    }

    async fn delete_memory(&self, memory_id: &str) -> Result<DeleteMemoryResponse, ApiError> {
        self.delete(
            "/memories/delete_memory",
            &[
                ("tenant_id", self.tenant_id.as_str()),
                ("memory_id", memory_id),
                ("sub_tenant_id", self.sub_tenant_id.as_str()),
            ],
        )
        .await
    }

    async fn fetch_content(&self, source_id: &str, mode: FetchMode) -> Result<FetchContentResponse, ApiError> {
        let request = FetchContentRequest {
            tenant_id: &self.tenant_id,
            sub_tenant_id: &self.sub_tenant_id,
            source_id,
            mode,
        };
        self.post("/fetch/content", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use cortexclaw_core::api::RecallMode;
    use cortexclaw_core::log::NoopLogger;
    use cortexclaw_core::testing::RecordingLogger;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct Seen {
        method: Method,
        path: String,
        query: Option<String>,
        auth: Option<String>,
        body: Value,
    }

    #[derive(Clone, Default)]
    struct MockApi {
        seen: Arc<Mutex<Vec<Seen>>>,
        replies: Arc<HashMap<&'static str, (StatusCode, String)>>,
    }

    async fn record(State(mock): State<MockApi>, method: Method, uri: Uri, headers: HeaderMap, body: String) -> (StatusCode, String) {
        let path = uri.path().to_string();
        mock.seen.lock().unwrap().push(Seen {
            method,
            path: path.clone(),
            query: uri.query().map(String::from),
            auth: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            body: serde_json::from_str(&body).unwrap_or(Value::Null),
        });
        mock.replies
            .get(path.as_str())
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, "no route".into()))
    }

    /// Serve canned replies on an ephemeral port; returns the client and the request log.
    async fn serve(replies: Vec<(&'static str, StatusCode, Value)>) -> (CortexClient, Arc<Mutex<Vec<Seen>>>) {
        serve_logged(replies, Arc::new(NoopLogger)).await
    }

    async fn serve_logged(
        replies: Vec<(&'static str, StatusCode, Value)>,
        logger: Arc<dyn Logger>,
    ) -> (CortexClient, Arc<Mutex<Vec<Seen>>>) {
        let mock = MockApi {
            seen: Arc::default(),
            replies: Arc::new(
                replies
                    .into_iter()
                    .map(|(path, status, body)| (path, (status, body.to_string())))
                    .collect(),
            ),
        };
        let seen = mock.seen.clone();
        let app = Router::new().fallback(record).with_state(mock);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = CortexClient::new("sk-test", "tenant-1", "sub-1", logger).with_base_url(format!("http://{addr}/"));
        (client, seen)
    }

    fn add_ok() -> Value {
        json!({"success": true, "message": "ok", "results": [], "success_count": 1, "failed_count": 0})
    }

    #[tokio::test]
    async fn conversation_ingestion_shape() {
        let (client, seen) = serve(vec![("/memories/add_memory", StatusCode::OK, add_ok())]).await;
        let turns = vec![ConversationTurn::new("I like tea", "Noted!")];
        let meta = CaptureMetadata {
            captured_at: "2026-10-18T14:30:00.000Z".into(),
            source: "openclaw_hook".into(),
            turn_count: Some(1),
            note: None,
        };

        let resp = client.ingest_conversation(&turns, "oc_hook_s1", Some(&meta)).await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.success_count, 1);

        let seen = seen.lock().unwrap();
        let req = &seen[0];
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/memories/add_memory");
        assert_eq!(req.auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(req.body["tenant_id"], "tenant-1");
        assert_eq!(req.body["sub_tenant_id"], "sub-1");
        assert_eq!(req.body["upsert"], true);

        let memory = &req.body["memories"][0];
        assert_eq!(memory["user_assistant_pairs"], json!([{"user": "I like tea", "assistant": "Noted!"}]));
        assert_eq!(memory["infer"], true);
        assert_eq!(memory["source_id"], "oc_hook_s1");
        assert_eq!(memory["user_name"], "User");
        assert_eq!(memory["custom_instructions"], INGEST_INSTRUCTIONS);
        let doc_meta: Value = serde_json::from_str(memory["document_metadata"].as_str().unwrap()).unwrap();
        assert_eq!(doc_meta["source"], "openclaw_hook");
        assert_eq!(doc_meta["turn_count"], 1);
    }

    #[tokio::test]
    async fn text_ingestion_omits_instructions_without_inference() {
        let (client, seen) = serve(vec![("/memories/add_memory", StatusCode::OK, add_ok())]).await;

        client
            .ingest_text("remember this", IngestTextOptions {
                title: Some("Manual Memory".into()),
                source_id: Some("oc_sess_s1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        client
            .ingest_text("raw note", IngestTextOptions {
                infer: false,
                ..Default::default()
            })
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        let inferred = &seen[0].body["memories"][0];
        assert_eq!(inferred["text"], "remember this");
        assert_eq!(inferred["infer"], true);
        assert_eq!(inferred["is_markdown"], false);
        assert_eq!(inferred["custom_instructions"], INGEST_INSTRUCTIONS);
        assert_eq!(inferred["title"], "Manual Memory");
        assert_eq!(inferred["source_id"], "oc_sess_s1");

        let raw = &seen[1].body["memories"][0];
        assert_eq!(raw["infer"], false);
        assert!(raw.get("custom_instructions").is_none());
        assert!(raw.get("source_id").is_none());
        assert!(raw.get("title").is_none());
    }

    #[tokio::test]
    async fn recall_request_and_response() {
        let reply = json!({
            "chunks": [{"chunk_uuid": "c1", "source_id": "s1", "chunk_content": "User likes tea", "relevancy_score": 0.9}]
        });
        let (client, seen) = serve(vec![("/recall/recall_preferences", StatusCode::OK, reply)]).await;

        let resp = client
            .recall("what do I drink?", RecallOptions {
                max_results: 5,
                mode: RecallMode::Fast,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(resp.chunks.len(), 1);
        assert_eq!(resp.chunks[0].chunk_content, "User likes tea");
        assert!(resp.graph_context.is_none());

        let body = seen.lock().unwrap()[0].body.clone();
        assert_eq!(body["query"], "what do I drink?");
        assert_eq!(body["max_results"], 5);
        assert_eq!(body["mode"], "fast");
        assert_eq!(body["alpha"], 0.8);
        assert_eq!(body["recency_bias"], 0.0);
        assert_eq!(body["graph_context"], true);
    }

    #[tokio::test]
    async fn recall_defaults_to_thinking() {
        let (client, seen) = serve(vec![("/recall/recall_preferences", StatusCode::OK, json!({"chunks": []}))]).await;
        client.recall("q", RecallOptions::default()).await.unwrap();
        let body = seen.lock().unwrap()[0].body.clone();
        assert_eq!(body["mode"], "thinking");
        assert_eq!(body["max_results"], 10);
    }

    #[tokio::test]
    async fn list_requests_use_memories_kind() {
        let reply = json!({"success": true, "user_memories": [{"memory_id": "m1", "memory_content": "likes tea"}]});
        let (client, seen) = serve(vec![("/list/data", StatusCode::OK, reply)]).await;

        let resp = client.list_memories().await.unwrap();
        assert_eq!(resp.user_memories[0].memory_id, "m1");

        let ids = vec!["oc_hook_s1".to_string()];
        let sources = client.list_sources(Some(&ids)).await.unwrap();
        assert!(sources.sources.is_empty());

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].body["kind"], "memories");
        assert!(seen[0].body.get("source_ids").is_none());
        assert_eq!(seen[1].body["source_ids"], json!(["oc_hook_s1"]));
    }

    #[tokio::test]
    async fn delete_sends_query_parameters() {
        let reply = json!({"success": true, "user_memory_deleted": true});
        let (client, seen) = serve(vec![("/memories/delete_memory", StatusCode::OK, reply)]).await;

        let resp = client.delete_memory("m 1").await.unwrap();
        assert!(resp.user_memory_deleted);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::DELETE);
        assert_eq!(seen[0].auth.as_deref(), Some("Bearer sk-test"));
        let query = seen[0].query.clone().unwrap();
        assert!(query.contains("tenant_id=tenant-1"));
        assert!(query.contains("memory_id=m+1") || query.contains("memory_id=m%201"));
        assert!(query.contains("sub_tenant_id=sub-1"));
    }

    #[tokio::test]
    async fn fetch_content_sends_mode() {
        let reply = json!({"success": true, "source_id": "s1", "content": "full text"});
        let (client, seen) = serve(vec![("/fetch/content", StatusCode::OK, reply)]).await;

        let resp = client.fetch_content("s1", FetchMode::Both).await.unwrap();
        assert_eq!(resp.body(), Some("full text"));

        let body = seen.lock().unwrap()[0].body.clone();
        assert_eq!(body["source_id"], "s1");
        assert_eq!(body["mode"], "both");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (client, _) = serve(vec![("/list/data", StatusCode::UNAUTHORIZED, json!({"detail": "bad key"}))]).await;

        let err = client.list_memories().await.unwrap_err();
        assert_eq!(err.status_code(), Some(401));
        let msg = err.to_string();
        assert!(msg.contains("/list/data"));
        assert!(msg.contains("401"));
        assert!(msg.contains("bad key"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let (client, _) = serve(vec![]).await;
        // Unrouted paths answer 404 with a plain-text body.
        assert!(matches!(client.list_memories().await, Err(ApiError::Status { status_code: 404, .. })));

        let (client, _) = serve(vec![("/list/data", StatusCode::OK, json!("not an object"))]).await;
        assert!(matches!(client.list_memories().await, Err(ApiError::Decode { .. })));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let client = CortexClient::new("k", "t", "s", Arc::new(NoopLogger)).with_base_url("http://127.0.0.1:1");
        assert!(matches!(client.list_memories().await, Err(ApiError::Network(_))));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = CortexClient::new("k", "t", "s", Arc::new(NoopLogger)).with_base_url("https://example.com/");
        assert_eq!(client.base_url(), "https://example.com");
        assert_eq!(client.tenant_id(), "t");
        assert_eq!(client.sub_tenant_id(), "s");
    }

    #[tokio::test]
    async fn requests_log_through_the_injected_logger() {
        let logger = Arc::new(RecordingLogger::new());
        let reply = json!({"success": true, "user_memory_deleted": true});
        let (client, _) = serve_logged(
            vec![
                ("/memories/delete_memory", StatusCode::OK, reply),
                ("/list/data", StatusCode::FORBIDDEN, json!({"detail": "no"})),
            ],
            logger.clone(),
        )
        .await;

        client.delete_memory("m1").await.unwrap();
        client.list_memories().await.unwrap_err();

        assert_eq!(
            logger.lines(),
            vec![
                "INFO connected (tenant=tenant-1, sub=sub-1)",
                "DEBUG DELETE /memories/delete_memory",
                "DEBUG POST /list/data",
                "WARN request failed: /list/data -> 403",
            ]
        );
    }
}
