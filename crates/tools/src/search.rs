//! `cortex_search`: recall memories for an explicit query.

use async_trait::async_trait;
use cortexclaw_config::MAX_RECALL_RESULTS_LIMIT;
use cortexclaw_core::context::build_context;
use cortexclaw_core::error::ToolError;
use cortexclaw_core::tool::{Tool, ToolResult, required_str};

use crate::ToolContext;

pub struct SearchTool {
    ctx: ToolContext,
}

impl SearchTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "cortex_search"
    }

    fn label(&self) -> &str {
        "Cortex Search"
    }

    fn description(&self) -> &str {
        "Search through Cortex AI memories. Returns relevant chunks with graph-enriched context."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "limit": {
                    "type": "integer",
                    "description": "Max results (default: 10)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "query")?;

        let mut options = self.ctx.config.recall_options();
        if let Some(limit) = arguments.get("limit").and_then(|v| v.as_u64()) {
            options.max_results = (limit as usize).clamp(1, MAX_RECALL_RESULTS_LIMIT);
        }
        self.ctx
            .logger
            .debug(&format!("search tool: \"{query}\" limit={}", options.max_results));

        let response = match self.ctx.api.recall(query, options).await {
            Ok(r) => r,
            Err(e) => {
                self.ctx.logger.error(&format!("search tool failed: {e}"));
                return Ok(ToolResult::failure(format!("Memory search failed: {e}")));
            }
        };

        if response.chunks.is_empty() {
            return Ok(ToolResult::ok("No relevant memories found."));
        }

        let context = build_context(&response, &self.ctx.config.context_options());
        let count = response.chunks.len();

        Ok(
            ToolResult::ok(format!("Found {count} memories.\n\n---\nFull context:\n{context}")).with_data(
                serde_json::json!({
                    "count": count,
                    "hasGraphContext": response.graph_context.is_some(),
                }),
            ),
        )
    }
}
