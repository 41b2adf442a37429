//! Auto-recall: look up memories for the incoming prompt and prepend them.

use std::sync::Arc;

use cortexclaw_config::PluginConfig;
use cortexclaw_core::api::MemoryApi;
use cortexclaw_core::capture::{MIN_PROMPT_CHARS, contains_ignore_term};
use cortexclaw_core::context::ContextAssembler;
use cortexclaw_core::log::Logger;

use crate::events::PromptInjection;

pub struct RecallHook {
    api: Arc<dyn MemoryApi>,
    config: Arc<PluginConfig>,
    logger: Arc<dyn Logger>,
    assembler: ContextAssembler,
}

impl RecallHook {
    pub fn new(api: Arc<dyn MemoryApi>, config: Arc<PluginConfig>, logger: Arc<dyn Logger>) -> Self {
        let assembler = ContextAssembler::new(config.context_options());
        Self {
            api,
            config,
            logger,
            assembler,
        }
    }

    /// Never fails: errors are logged and yield `None`.
    pub async fn handle(&self, prompt: Option<&str>) -> Option<PromptInjection> {
        let prompt = prompt?;
        if prompt.chars().count() < MIN_PROMPT_CHARS {
            return None;
        }

        if contains_ignore_term(prompt, &self.config.ignore_term) {
            self.logger.debug(&format!(
                "[recall] skipped, prompt contains ignore term \"{}\"",
                self.config.ignore_term
            ));
            return None;
        }

        self.logger
            .debug(&format!("[recall] query ({} chars)", prompt.chars().count()));

        let response = match self.api.recall(prompt, self.config.recall_options()).await {
            Ok(r) => r,
            Err(e) => {
                self.logger.error(&format!("[recall] failed: {e}"));
                return None;
            }
        };

        if response.chunks.is_empty() {
            self.logger.debug("[recall] no memories matched");
            return None;
        }

        let envelope = self.assembler.assemble_envelope(&response);
        if envelope.is_empty() {
            return None;
        }

        self.logger.debug(&format!(
            "[recall] injecting {} chunks ({} chars)",
            response.chunks.len(),
            envelope.chars().count()
        ));
        Some(PromptInjection {
            prepend_context: envelope,
        })
    }
}
