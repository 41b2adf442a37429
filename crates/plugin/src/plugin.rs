//! Plugin wiring: one place that owns config, the API handle, the logger
//! and the shared session state, and routes host events to the hooks.

use std::fmt::Write as _;
use std::sync::Arc;

use cortexclaw_client::CortexClient;
use cortexclaw_config::PluginConfig;
use cortexclaw_core::api::MemoryApi;
use cortexclaw_core::error::ToolError;
use cortexclaw_core::log::{Logger, TracingLogger};
use cortexclaw_core::session::SessionState;
use cortexclaw_core::tool::{ToolCall, ToolDefinition, ToolRegistry, ToolResult};
use cortexclaw_tools::{ToolContext, cortex_registry};
use serde::Serialize;
use serde_json::Value;

use crate::commands::SlashCommands;
use crate::events::{AgentEnd, BeforeAgentStart, HookContext, PromptInjection};
use crate::hooks::{CaptureHook, RecallHook};

pub const PLUGIN_ID: &str = "openclaw-cortex-ai";
pub const PLUGIN_NAME: &str = "Cortex AI";
pub const PLUGIN_DESCRIPTION: &str = "Agentic memory powered by Cortex AI: auto-capture, recall, and graph-enriched context";

/// What the host shows for this plugin, configured or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginManifest {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: &'static str,
}

pub const MANIFEST: PluginManifest = PluginManifest {
    id: PLUGIN_ID,
    name: PLUGIN_NAME,
    description: PLUGIN_DESCRIPTION,
    kind: "memory",
};

pub const NOT_CONFIGURED_MSG: &str =
    "[cortex-ai] Not configured. Set apiKey and tenantId (or CORTEX_OPENCLAW_API_KEY / CORTEX_OPENCLAW_TENANT_ID).";

/// Outcome of registering with the host.
pub enum Registration {
    Configured(Box<CortexPlugin>),
    /// Credentials or config were missing or invalid; only a notice is shown.
    NotConfigured { message: &'static str },
}

impl Registration {
    /// Parse the host config and connect. Invalid config is logged and
    /// yields [`Registration::NotConfigured`].
    pub fn from_host_config(raw: &Value) -> Self {
        match PluginConfig::try_parse(raw, &TracingLogger::new(false)) {
            Some(config) => Self::Configured(Box::new(CortexPlugin::connect(config))),
            None => Self::NotConfigured {
                message: NOT_CONFIGURED_MSG,
            },
        }
    }

    pub fn manifest(&self) -> &'static PluginManifest {
        &MANIFEST
    }

    pub fn plugin(&self) -> Option<&CortexPlugin> {
        match self {
            Self::Configured(plugin) => Some(&**plugin),
            Self::NotConfigured { .. } => None,
        }
    }
}

pub struct CortexPlugin {
    config: Arc<PluginConfig>,
    api: Arc<dyn MemoryApi>,
    logger: Arc<dyn Logger>,
    session: SessionState,
    tools: ToolRegistry,
    recall: Option<RecallHook>,
    capture: Option<CaptureHook>,
    commands: SlashCommands,
}

impl CortexPlugin {
    /// Wire everything around an existing API handle.
    pub fn new(config: PluginConfig, api: Arc<dyn MemoryApi>, logger: Arc<dyn Logger>) -> Self {
        let config = Arc::new(config);
        let session = SessionState::new();

        let tools = cortex_registry(&ToolContext {
            api: api.clone(),
            config: config.clone(),
            logger: logger.clone(),
            session: session.clone(),
        });
        let recall = config
            .auto_recall
            .then(|| RecallHook::new(api.clone(), config.clone(), logger.clone()));
        let capture = config
            .auto_capture
            .then(|| CaptureHook::new(api.clone(), logger.clone()));
        let commands = SlashCommands::new(api.clone(), config.clone(), logger.clone(), session.clone());

        Self {
            config,
            api,
            logger,
            session,
            tools,
            recall,
            capture,
            commands,
        }
    }

    /// Connect to the Cortex API described by `config`, logging through `tracing`.
    /// The client shares the plugin's logger, so `debug` gates its request lines too.
    pub fn connect(config: PluginConfig) -> Self {
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new(config.debug));
        let api = CortexClient::new(&config.api_key, &config.tenant_id, &config.sub_tenant_id, logger.clone())
            .with_base_url(&config.base_url);
        Self::new(config, Arc::new(api), logger)
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn commands(&self) -> &SlashCommands {
        &self.commands
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    pub async fn call_tool(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        self.tools.execute(call).await
    }

    pub fn start(&self) {
        self.logger.info("plugin started");
    }

    pub fn stop(&self) {
        self.logger.info("plugin stopped");
    }

    /// `before_agent_start`: remember the session, then recall if enabled.
    pub async fn on_before_agent_start(&self, event: BeforeAgentStart, ctx: &HookContext) -> Option<PromptInjection> {
        let recall = self.recall.as_ref()?;
        self.session.observe(ctx.session_id.as_deref(), event.messages).await;
        self.log_session("before_agent_start").await;
        recall.handle(event.prompt.as_deref()).await
    }

    /// `agent_end`: remember the session, then capture if enabled.
    pub async fn on_agent_end(&self, event: AgentEnd, ctx: &HookContext) {
        let Some(capture) = &self.capture else {
            return;
        };
        self.session.observe(ctx.session_id.as_deref(), event.messages.clone()).await;
        self.log_session("agent_end").await;
        let session_id = self.session.session_id().await;
        capture.handle(&event, session_id.as_deref()).await;
    }

    async fn log_session(&self, event: &str) {
        let sid = self.session.session_id().await;
        let count = self.session.messages().await.len();
        self.logger.debug(&format!(
            "[session] {event}, sid={} msgs={count}",
            sid.as_deref().unwrap_or("none")
        ));
    }

    /// Configuration summary, one `label: value` per line.
    pub fn status(&self) -> String {
        let c = &self.config;
        let rows = [
            ("Tenant", self.api.tenant_id().to_string()),
            ("Sub-Tenant", self.api.sub_tenant_id().to_string()),
            ("Auto-Recall", c.auto_recall.to_string()),
            ("Auto-Capture", c.auto_capture.to_string()),
            ("Recall Mode", c.recall_mode.to_string()),
            ("Graph", c.graph_context.to_string()),
            ("Max Results", c.max_recall_results.to_string()),
            ("Ignore Term", c.ignore_term.clone()),
        ];
        let mut out = String::new();
        for (label, value) in rows {
            let _ = writeln!(out, "{:<14}{value}", format!("{label}:"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortexclaw_core::message::Message;
    use cortexclaw_core::recall::{RecallResponse, VectorChunk};
    use cortexclaw_core::testing::{ApiCall, RecordingLogger, ScriptedApi};
    use serde_json::json;

    fn plugin(config: PluginConfig, api: ScriptedApi) -> (CortexPlugin, Arc<ScriptedApi>) {
        let api = Arc::new(api);
        (CortexPlugin::new(config, api.clone(), Arc::new(RecordingLogger::new())), api)
    }

    fn recalled() -> ScriptedApi {
        ScriptedApi::new().with_recall(RecallResponse {
            chunks: vec![VectorChunk {
                chunk_uuid: "c1".into(),
                chunk_content: "User lives in Lisbon".into(),
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    fn conversation() -> Vec<Message> {
        vec![Message::user("Where do I live?"), Message::assistant("You live in Lisbon.")]
    }

    #[tokio::test]
    async fn before_agent_start_records_session_and_recalls() {
        let (plugin, _) = plugin(PluginConfig::new("k", "t"), recalled());
        let event = BeforeAgentStart {
            prompt: Some("Where do I live?".into()),
            messages: Some(conversation()),
        };

        let injection = plugin.on_before_agent_start(event, &HookContext::new("s1")).await.unwrap();
        assert!(injection.prepend_context.contains("Lisbon"));
        assert_eq!(plugin.session().session_id().await.as_deref(), Some("s1"));
        assert_eq!(plugin.session().messages().await.len(), 2);
    }

    #[tokio::test]
    async fn agent_end_captures_under_last_known_session() {
        let (plugin, api) = plugin(PluginConfig::new("k", "t"), ScriptedApi::new());
        plugin.session().observe(Some("s1"), None).await;

        let event = AgentEnd {
            success: true,
            messages: Some(conversation()),
        };
        plugin.on_agent_end(event, &HookContext::default()).await;

        let calls = api.calls();
        assert!(matches!(&calls[0], ApiCall::IngestConversation { source_id, .. } if source_id == "oc_hook_s1"));
    }

    #[tokio::test]
    async fn disabled_hooks_do_nothing() {
        let mut config = PluginConfig::new("k", "t");
        config.auto_recall = false;
        config.auto_capture = false;
        let (plugin, api) = plugin(config, recalled());

        let event = BeforeAgentStart {
            prompt: Some("Where do I live?".into()),
            messages: None,
        };
        assert!(plugin.on_before_agent_start(event, &HookContext::new("s1")).await.is_none());
        plugin
            .on_agent_end(
                AgentEnd {
                    success: true,
                    messages: Some(conversation()),
                },
                &HookContext::new("s1"),
            )
            .await;
        assert!(api.calls().is_empty());
        assert_eq!(plugin.session().session_id().await, None);
    }

    #[tokio::test]
    async fn store_tool_sees_session_from_hooks() {
        let (plugin, api) = plugin(PluginConfig::new("k", "t"), recalled());
        let event = BeforeAgentStart {
            prompt: Some("Where do I live?".into()),
            messages: Some(conversation()),
        };
        plugin.on_before_agent_start(event, &HookContext::new("s2")).await;

        let call = ToolCall {
            id: "call_7".into(),
            name: "cortex_store".into(),
            arguments: json!({"text": "home city"}),
        };
        let result = plugin.call_tool(&call).await.unwrap();
        assert_eq!(result.call_id, "call_7");
        assert!(result.output.contains("oc_tool_s2"));
        assert!(matches!(api.calls().last(), Some(ApiCall::IngestConversation { .. })));
    }

    #[test]
    fn exposes_tools() {
        let (plugin, _) = plugin(PluginConfig::new("k", "t"), ScriptedApi::new());
        assert_eq!(plugin.tool_definitions().len(), 5);
    }

    #[test]
    fn status_summary() {
        let (plugin, _) = plugin(PluginConfig::new("k", "t"), ScriptedApi::new());
        let status = plugin.status();
        let lines: Vec<&str> = status.lines().collect();
        assert_eq!(lines[0], "Tenant:       tenant-test");
        assert_eq!(lines[1], "Sub-Tenant:   sub-test");
        assert_eq!(lines[2], "Auto-Recall:  true");
        assert_eq!(lines[4], "Recall Mode:  fast");
        assert_eq!(lines[7], "Ignore Term:  cortex-ignore");
    }

    #[test]
    fn registration_without_credentials() {
        let registration = Registration::from_host_config(&json!({"unknownKey": true}));
        assert!(registration.plugin().is_none());
        assert_eq!(registration.manifest().id, PLUGIN_ID);
        assert!(matches!(registration, Registration::NotConfigured { message } if message == NOT_CONFIGURED_MSG));
    }

    #[test]
    fn registration_with_credentials_connects() {
        let registration = Registration::from_host_config(&json!({
            "apiKey": "k",
            "tenantId": "acme",
            "baseUrl": "http://127.0.0.1:9"
        }));
        let plugin = registration.plugin().unwrap();
        assert_eq!(plugin.config().tenant_id, "acme");
        assert!(plugin.status().starts_with("Tenant:       acme"));
    }

    #[test]
    fn manifest_serializes_for_the_host() {
        let manifest = serde_json::to_value(MANIFEST).unwrap();
        assert_eq!(
            manifest,
            json!({
                "id": "openclaw-cortex-ai",
                "name": "Cortex AI",
                "description": PLUGIN_DESCRIPTION,
                "kind": "memory"
            })
        );
    }
}
