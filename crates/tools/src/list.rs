//! `cortex_list_memories`: everything the service has extracted for the user.

use async_trait::async_trait;
use cortexclaw_core::error::ToolError;
use cortexclaw_core::tool::{Tool, ToolResult};

use crate::{ToolContext, preview};

const PREVIEW_CHARS: usize = 100;

pub struct ListMemoriesTool {
    ctx: ToolContext,
}

impl ListMemoriesTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListMemoriesTool {
    fn name(&self) -> &str {
        "cortex_list_memories"
    }

    fn label(&self) -> &str {
        "Cortex List Memories"
    }

    fn description(&self) -> &str {
        "List all user memories stored in Cortex. Returns memory IDs and content summaries. Use this when \
         the user asks what you remember about them or wants to see their stored information."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        self.ctx.logger.debug("list tool: fetching all memories");

        let memories = match self.ctx.api.list_memories().await {
            Ok(r) => r.user_memories,
            Err(e) => {
                self.ctx.logger.error(&format!("list tool failed: {e}"));
                return Ok(ToolResult::failure(format!("Failed to list memories: {e}")));
            }
        };

        if memories.is_empty() {
            return Ok(ToolResult::ok("No memories stored yet."));
        }

        let lines: Vec<String> = memories
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{}. [ID: {}]\n   {}", i + 1, m.memory_id, preview(&m.memory_content, PREVIEW_CHARS)))
            .collect();

        Ok(ToolResult::ok(format!("Found {} memories:\n\n{}", memories.len(), lines.join("\n\n"))))
    }
}
