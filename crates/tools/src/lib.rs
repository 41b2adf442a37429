//! Memory tools the agent can call directly.
//!
//! Each tool wraps one Cortex operation and renders the answer as text
//! for the model:
//! - `cortex_search`: recall with graph-enriched context
//! - `cortex_store`: save the recent conversation (or a note)
//! - `cortex_list_memories`, `cortex_delete_memory`, `cortex_get_content`

pub mod delete;
pub mod get;
pub mod list;
pub mod search;
pub mod store;

use std::sync::Arc;

use cortexclaw_config::PluginConfig;
use cortexclaw_core::api::MemoryApi;
use cortexclaw_core::log::Logger;
use cortexclaw_core::session::SessionState;
use cortexclaw_core::tool::ToolRegistry;

pub use delete::DeleteMemoryTool;
pub use get::GetContentTool;
pub use list::ListMemoriesTool;
pub use search::SearchTool;
pub use store::StoreTool;

/// What every tool may need. Cheap to clone.
#[derive(Clone)]
pub struct ToolContext {
    pub api: Arc<dyn MemoryApi>,
    pub config: Arc<PluginConfig>,
    pub logger: Arc<dyn Logger>,
    pub session: SessionState,
}

/// Registry with all five memory tools.
pub fn cortex_registry(ctx: &ToolContext) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SearchTool::new(ctx.clone())));
    registry.register(Box::new(StoreTool::new(ctx.clone())));
    registry.register(Box::new(ListMemoriesTool::new(ctx.clone())));
    registry.register(Box::new(DeleteMemoryTool::new(ctx.clone())));
    registry.register(Box::new(GetContentTool::new(ctx.clone())));
    registry
}

/// First `max` characters of `text`, with `…` appended when cut.
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use cortexclaw_core::testing::{RecordingLogger, ScriptedApi};

    pub fn context(api: ScriptedApi) -> (ToolContext, Arc<ScriptedApi>, Arc<RecordingLogger>) {
        let api = Arc::new(api);
        let logger = Arc::new(RecordingLogger::new());
        let ctx = ToolContext {
            api: api.clone(),
            config: Arc::new(PluginConfig::new("k", "t")),
            logger: logger.clone(),
            session: SessionState::new(),
        };
        (ctx, api, logger)
    }
}
