//! `cortex_get_content`: full text of one stored source.

use async_trait::async_trait;
use cortexclaw_core::api::FetchMode;
use cortexclaw_core::error::ToolError;
use cortexclaw_core::tool::{Tool, ToolResult, required_str};

use crate::ToolContext;

/// Content longer than this is cut off.
pub const MAX_CONTENT_CHARS: usize = 3000;

pub struct GetContentTool {
    ctx: ToolContext,
}

impl GetContentTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

fn truncate(content: &str) -> String {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((idx, _)) => format!(
            "{}…\n\n[Content truncated, showing first {MAX_CONTENT_CHARS} characters]",
            &content[..idx]
        ),
        None => content.to_string(),
    }
}

#[async_trait]
impl Tool for GetContentTool {
    fn name(&self) -> &str {
        "cortex_get_content"
    }

    fn label(&self) -> &str {
        "Cortex Get Content"
    }

    fn description(&self) -> &str {
        "Fetch the full content of a specific source from Cortex by its source ID. Use this to retrieve \
         the complete text of a memory source when you need more details than what's shown in search results."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "source_id": {
                    "type": "string",
                    "description": "The unique source ID to fetch content for"
                }
            },
            "required": ["source_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let source_id = required_str(&arguments, "source_id")?;
        self.ctx.logger.debug(&format!("get tool: source_id={source_id}"));

        let response = match self.ctx.api.fetch_content(source_id, FetchMode::Content).await {
            Ok(r) => r,
            Err(e) => {
                self.ctx.logger.error(&format!("get tool failed: {e}"));
                return Ok(ToolResult::failure(format!("Failed to fetch source {source_id}: {e}")));
            }
        };

        if !response.is_ok() {
            return Ok(ToolResult::failure(format!(
                "Failed to fetch source {source_id}: {}",
                response.error.as_deref().unwrap_or("unknown error")
            )));
        }

        let content = response.body().unwrap_or("(no text content available)");
        Ok(ToolResult::ok(format!("Source: {source_id}\n\n{}", truncate(content))))
    }
}
