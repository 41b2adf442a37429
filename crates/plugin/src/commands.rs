//! Slash commands for the chat surface.
//!
//! Each command answers with a short text reply. Remote failures are
//! logged and turned into a fixed "Check logs." reply; nothing propagates
//! to the host.

use std::sync::Arc;

use cortexclaw_config::PluginConfig;
use cortexclaw_core::api::{FetchMode, IngestTextOptions, MemoryApi};
use cortexclaw_core::log::Logger;
use cortexclaw_core::session::{SessionState, session_source_id};
use cortexclaw_tools::preview;

const MAX_RECALL_LINES: usize = 10;

/// Static description of a command, for host registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub accepts_args: bool,
    pub require_auth: bool,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "cortex-remember",
        description: "Save a piece of information to Cortex memory",
        accepts_args: true,
        require_auth: true,
    },
    CommandSpec {
        name: "cortex-recall",
        description: "Search your Cortex memories",
        accepts_args: true,
        require_auth: true,
    },
    CommandSpec {
        name: "cortex-list",
        description: "List all stored user memories",
        accepts_args: false,
        require_auth: true,
    },
    CommandSpec {
        name: "cortex-delete",
        description: "Delete a specific memory by its ID",
        accepts_args: true,
        require_auth: true,
    },
    CommandSpec {
        name: "cortex-get",
        description: "Fetch the content of a specific source by its ID",
        accepts_args: true,
        require_auth: true,
    },
];

pub struct SlashCommands {
    api: Arc<dyn MemoryApi>,
    config: Arc<PluginConfig>,
    logger: Arc<dyn Logger>,
    session: SessionState,
}

fn args_of(args: Option<&str>) -> Option<&str> {
    args.map(str::trim).filter(|a| !a.is_empty())
}

impl SlashCommands {
    pub fn new(
        api: Arc<dyn MemoryApi>,
        config: Arc<PluginConfig>,
        logger: Arc<dyn Logger>,
        session: SessionState,
    ) -> Self {
        Self {
            api,
            config,
            logger,
            session,
        }
    }

    pub fn specs(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    /// Run a command by name (without the leading slash). `None` for
    /// names this plugin does not own.
    pub async fn dispatch(&self, name: &str, args: Option<&str>) -> Option<String> {
        let reply = match name.trim_start_matches('/') {
            "cortex-remember" => self.remember(args).await,
            "cortex-recall" => self.recall(args).await,
            "cortex-list" => self.list().await,
            "cortex-delete" => self.delete(args).await,
            "cortex-get" => self.get(args).await,
            _ => return None,
        };
        Some(reply)
    }

    pub async fn remember(&self, args: Option<&str>) -> String {
        let Some(text) = args_of(args) else {
            return "Usage: /cortex-remember <text to store>".into();
        };

        let source_id = self.session.session_id().await.as_deref().map(session_source_id);
        let options = IngestTextOptions {
            source_id,
            title: Some("Manual Memory".into()),
            infer: true,
            ..Default::default()
        };
        match self.api.ingest_text(text, options).await {
            Ok(_) => format!("Saved: \"{}\"", preview(text, 60)),
            Err(e) => {
                self.logger.error(&format!("/cortex-remember: {e}"));
                "Failed to save. Check logs.".into()
            }
        }
    }

    pub async fn recall(&self, args: Option<&str>) -> String {
        let Some(query) = args_of(args) else {
            return "Usage: /cortex-recall <query>".into();
        };

        let response = match self.api.recall(query, self.config.recall_options()).await {
            Ok(r) => r,
            Err(e) => {
                self.logger.error(&format!("/cortex-recall: {e}"));
                return "Recall failed. Check logs.".into();
            }
        };

        if response.chunks.is_empty() {
            return format!("No memories found for \"{query}\"");
        }

        let lines: Vec<String> = response
            .chunks
            .iter()
            .take(MAX_RECALL_LINES)
            .enumerate()
            .map(|(i, c)| {
                let title = c
                    .source_title
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .map(|t| format!(" [{t}]"))
                    .unwrap_or_default();
                let score = c
                    .relevancy_score
                    .map(|s| format!(" ({}%)", (s * 100.0).round()))
                    .unwrap_or_default();
                format!("{}.{title} {}{score}", i + 1, preview(&c.chunk_content, 120))
            })
            .collect();

        format!("Found {} chunks:\n\n{}", response.chunks.len(), lines.join("\n"))
    }

    pub async fn list(&self) -> String {
        let memories = match self.api.list_memories().await {
            Ok(r) => r.user_memories,
            Err(e) => {
                self.logger.error(&format!("/cortex-list: {e}"));
                return "Failed to list memories. Check logs.".into();
            }
        };

        if memories.is_empty() {
            return "No memories stored yet.".into();
        }

        let lines: Vec<String> = memories
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{}. [{}] {}", i + 1, m.memory_id, preview(&m.memory_content, 100)))
            .collect();
        format!("{} memories:\n\n{}", memories.len(), lines.join("\n"))
    }

    pub async fn delete(&self, args: Option<&str>) -> String {
        let Some(memory_id) = args_of(args) else {
            return "Usage: /cortex-delete <memory_id>".into();
        };

        match self.api.delete_memory(memory_id).await {
            Ok(r) if r.user_memory_deleted => format!("Deleted memory: {memory_id}"),
            Ok(_) => format!("Memory {memory_id} was not found or already deleted."),
            Err(e) => {
                self.logger.error(&format!("/cortex-delete: {e}"));
                "Delete failed. Check logs.".into()
            }
        }
    }

    pub async fn get(&self, args: Option<&str>) -> String {
        let Some(source_id) = args_of(args) else {
            return "Usage: /cortex-get <source_id>".into();
        };

        match self.api.fetch_content(source_id, FetchMode::Content).await {
            Ok(r) if !r.is_ok() => format!(
                "Could not fetch source {source_id}: {}",
                r.error.as_deref().unwrap_or("unknown error")
            ),
            Ok(r) => format!(
                "Source: {source_id}\n\n{}",
                preview(r.body().unwrap_or("(no text content)"), 2000)
            ),
            Err(e) => {
                self.logger.error(&format!("/cortex-get: {e}"));
                "Fetch failed. Check logs.".into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortexclaw_core::api::{FetchContentResponse, UserMemory};
    use cortexclaw_core::error::ApiError;
    use cortexclaw_core::recall::{RecallResponse, VectorChunk};
    use cortexclaw_core::testing::{ApiCall, RecordingLogger, ScriptedApi};

    fn commands(api: ScriptedApi) -> (SlashCommands, Arc<ScriptedApi>, Arc<RecordingLogger>, SessionState) {
        let api = Arc::new(api);
        let logger = Arc::new(RecordingLogger::new());
        let session = SessionState::new();
        let cmds = SlashCommands::new(
            api.clone(),
            Arc::new(PluginConfig::new("k", "t")),
            logger.clone(),
            session.clone(),
        );
        (cmds, api, logger, session)
    }

    fn down() -> ApiError {
        ApiError::Network("down".into())
    }

    #[tokio::test]
    async fn empty_args_print_usage() {
        let (cmds, api, _, _) = commands(ScriptedApi::new());
        assert_eq!(cmds.remember(None).await, "Usage: /cortex-remember <text to store>");
        assert_eq!(cmds.recall(Some("   ")).await, "Usage: /cortex-recall <query>");
        assert_eq!(cmds.delete(Some("")).await, "Usage: /cortex-delete <memory_id>");
        assert_eq!(cmds.get(None).await, "Usage: /cortex-get <source_id>");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn remember_uses_session_source() {
        let (cmds, api, _, session) = commands(ScriptedApi::new());
        session.observe(Some("s9"), None).await;

        let reply = cmds.remember(Some("  my birthday is in May  ")).await;
        assert_eq!(reply, "Saved: \"my birthday is in May\"");

        let ApiCall::IngestText { text, options } = &api.calls()[0] else {
            panic!("expected text ingestion");
        };
        assert_eq!(text, "my birthday is in May");
        assert_eq!(options.source_id.as_deref(), Some("oc_sess_s9"));
        assert_eq!(options.title.as_deref(), Some("Manual Memory"));
    }

    #[tokio::test]
    async fn recall_lists_top_chunks_with_scores() {
        let mut chunks: Vec<VectorChunk> = (0..12)
            .map(|i| VectorChunk {
                chunk_uuid: format!("c{i}"),
                chunk_content: format!("memory {i}"),
                ..Default::default()
            })
            .collect();
        chunks[0].source_title = Some("Journal".into());
        chunks[0].relevancy_score = Some(0.876);
        let api = ScriptedApi::new().with_recall(RecallResponse {
            chunks,
            ..Default::default()
        });
        let (cmds, _, _, _) = commands(api);

        let reply = cmds.recall(Some("memories")).await;
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines[0], "Found 12 chunks:");
        assert_eq!(lines[2], "1. [Journal] memory 0 (88%)");
        assert_eq!(lines[3], "2. memory 1");
        assert_eq!(lines.len(), 2 + MAX_RECALL_LINES);
    }

    #[tokio::test]
    async fn recall_with_no_results() {
        let (cmds, _, _, _) = commands(ScriptedApi::new());
        assert_eq!(cmds.recall(Some("tea")).await, "No memories found for \"tea\"");
    }

    #[tokio::test]
    async fn list_and_delete() {
        let api = ScriptedApi::new()
            .with_memories(vec![UserMemory {
                memory_id: "m1".into(),
                memory_content: "Likes tea".into(),
            }])
            .with_deleted(true);
        let (cmds, _, _, _) = commands(api);
        assert_eq!(cmds.list().await, "1 memories:\n\n1. [m1] Likes tea");
        assert_eq!(cmds.delete(Some("m1")).await, "Deleted memory: m1");

        let (cmds, _, _, _) = commands(ScriptedApi::new());
        assert_eq!(cmds.list().await, "No memories stored yet.");
        assert_eq!(cmds.delete(Some("m1")).await, "Memory m1 was not found or already deleted.");
    }

    #[tokio::test]
    async fn get_previews_content() {
        let api = ScriptedApi::new().with_fetch(FetchContentResponse {
            success: true,
            content: Some("c".repeat(2500)),
            ..Default::default()
        });
        let (cmds, _, _, _) = commands(api);
        let reply = cmds.get(Some("s1")).await;
        assert_eq!(reply, format!("Source: s1\n\n{}…", "c".repeat(2000)));

        let api = ScriptedApi::new().with_fetch(FetchContentResponse {
            success: false,
            ..Default::default()
        });
        let (cmds, _, _, _) = commands(api);
        assert_eq!(cmds.get(Some("s1")).await, "Could not fetch source s1: unknown error");
    }

    #[tokio::test]
    async fn failures_say_check_logs() {
        let (cmds, _, logger, _) = commands(ScriptedApi::new().failing(down()));
        assert_eq!(cmds.remember(Some("x")).await, "Failed to save. Check logs.");
        assert_eq!(cmds.recall(Some("x")).await, "Recall failed. Check logs.");
        assert_eq!(cmds.list().await, "Failed to list memories. Check logs.");
        assert_eq!(cmds.delete(Some("x")).await, "Delete failed. Check logs.");
        assert_eq!(cmds.get(Some("x")).await, "Fetch failed. Check logs.");
        assert_eq!(logger.lines().iter().filter(|l| l.starts_with("ERROR")).count(), 5);
    }

    #[tokio::test]
    async fn dispatch_by_name() {
        let (cmds, _, _, _) = commands(ScriptedApi::new());
        assert_eq!(cmds.dispatch("/cortex-list", None).await.as_deref(), Some("No memories stored yet."));
        assert_eq!(cmds.dispatch("cortex-unknown", None).await, None);
        assert_eq!(cmds.specs().len(), 5);
    }
}
