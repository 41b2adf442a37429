//! `cortex_store`: persist the recent conversation, or a note when there
//! is no conversation to send.

use async_trait::async_trait;
use chrono::Utc;
use cortexclaw_core::api::{CaptureMetadata, IngestTextOptions};
use cortexclaw_core::capture::{annotate_first, clean_turns};
use cortexclaw_core::error::ToolError;
use cortexclaw_core::session::tool_source_id;
use cortexclaw_core::tool::{Tool, ToolResult, optional_str, required_str};
use cortexclaw_core::turns::extract_turns;

use crate::{ToolContext, preview};

/// Only the most recent turns are sent.
pub const MAX_STORE_TURNS: usize = 10;

const FALLBACK_TITLE: &str = "Agent Memory";

pub struct StoreTool {
    ctx: ToolContext,
}

impl StoreTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for StoreTool {
    fn name(&self) -> &str {
        "cortex_store"
    }

    fn label(&self) -> &str {
        "Cortex Store"
    }

    fn description(&self) -> &str {
        "Save the full conversation history to Cortex long-term memory. Use this to persist facts, \
         preferences, or decisions the user wants remembered. The complete chat history will be sent \
         for context-rich storage."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "A brief summary or note about what is being saved"
                },
                "title": {
                    "type": "string",
                    "description": "Optional title for the memory entry"
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let text = required_str(&arguments, "text")?;
        let title = optional_str(&arguments, "title");

        let session_id = self.ctx.session.session_id().await;
        let source_id = session_id.as_deref().map(tool_source_id);
        let messages = self.ctx.session.messages().await;
        let logger = &self.ctx.logger;

        logger.debug(&format!(
            "[store] tool called, sid={} msgs={} text=\"{}\"",
            session_id.as_deref().unwrap_or("none"),
            messages.len(),
            preview(text, 50)
        ));

        let all_turns = extract_turns(&messages);
        let recent = &all_turns[all_turns.len().saturating_sub(MAX_STORE_TURNS)..];
        let turns = clean_turns(recent);

        logger.debug(&format!(
            "[store] extracted {} total turns, using last {}",
            all_turns.len(),
            turns.len()
        ));

        if let (false, Some(source_id)) = (turns.is_empty(), source_id.as_deref()) {
            let now = Utc::now();
            let annotated = annotate_first(turns, now);
            let metadata = CaptureMetadata::new("openclaw_tool", now).with_note(text);

            logger.debug(&format!("[store] ingesting {} conversation turns -> {source_id}", annotated.len()));

            return Ok(match self.ctx.api.ingest_conversation(&annotated, source_id, Some(&metadata)).await {
                Ok(_) => ToolResult::ok(format!(
                    "Saved {} conversation turns to Cortex ({source_id}). Note: \"{}\"",
                    annotated.len(),
                    preview(text, 80)
                )),
                Err(e) => {
                    logger.error(&format!("[store] conversation ingestion failed: {e}"));
                    ToolResult::failure(format!("Failed to save to Cortex: {e}"))
                }
            });
        }

        logger.debug("[store] no conversation turns found, falling back to text ingestion");

        let options = IngestTextOptions {
            source_id,
            title: Some(title.unwrap_or(FALLBACK_TITLE).to_string()),
            infer: true,
            ..Default::default()
        };
        Ok(match self.ctx.api.ingest_text(text, options).await {
            Ok(_) => ToolResult::ok(format!("Saved to Cortex: \"{}\"", preview(text, 80))),
            Err(e) => {
                logger.error(&format!("[store] text ingestion failed: {e}"));
                ToolResult::failure(format!("Failed to save to Cortex: {e}"))
            }
        })
    }
}
