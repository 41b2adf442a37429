//! `cortex_delete_memory`

use async_trait::async_trait;
use cortexclaw_core::error::ToolError;
use cortexclaw_core::tool::{Tool, ToolResult, required_str};

use crate::ToolContext;

pub struct DeleteMemoryTool {
    ctx: ToolContext,
}

impl DeleteMemoryTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for DeleteMemoryTool {
    fn name(&self) -> &str {
        "cortex_delete_memory"
    }

    fn label(&self) -> &str {
        "Cortex Delete Memory"
    }

    fn description(&self) -> &str {
        "Delete a specific memory from Cortex by its memory ID. Use this when the user explicitly asks you \
         to forget something or remove a specific piece of stored information. Always confirm the memory \
         ID before deleting."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "memory_id": {
                    "type": "string",
                    "description": "The unique ID of the memory to delete"
                }
            },
            "required": ["memory_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let memory_id = required_str(&arguments, "memory_id")?;
        self.ctx.logger.debug(&format!("delete tool: memory_id={memory_id}"));

        Ok(match self.ctx.api.delete_memory(memory_id).await {
            Ok(r) if r.user_memory_deleted => ToolResult::ok(format!("Successfully deleted memory: {memory_id}")),
            Ok(_) => ToolResult::ok(format!(
                "Memory {memory_id} was not found or has already been deleted."
            )),
            Err(e) => {
                self.ctx.logger.error(&format!("delete tool failed: {e}"));
                ToolResult::failure(format!("Failed to delete memory {memory_id}: {e}"))
            }
        })
    }
}
