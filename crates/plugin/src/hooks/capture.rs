//! Auto-capture: after a successful run, send the conversation to Cortex.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cortexclaw_core::api::{CaptureMetadata, MemoryApi};
use cortexclaw_core::capture::prepare_for_capture;
use cortexclaw_core::log::Logger;
use cortexclaw_core::message::Message;
use cortexclaw_core::session::hook_source_id;
use cortexclaw_core::turns::extract_turns;

use crate::events::AgentEnd;

pub struct CaptureHook {
    api: Arc<dyn MemoryApi>,
    logger: Arc<dyn Logger>,
}

impl CaptureHook {
    pub fn new(api: Arc<dyn MemoryApi>, logger: Arc<dyn Logger>) -> Self {
        Self { api, logger }
    }

    pub async fn handle(&self, event: &AgentEnd, session_id: Option<&str>) {
        self.handle_at(event, session_id, Utc::now()).await
    }

    /// [`CaptureHook::handle`] with an explicit capture time.
    pub async fn handle_at(&self, event: &AgentEnd, session_id: Option<&str>, now: DateTime<Utc>) {
        let log = &self.logger;
        let messages = event.messages.as_deref().unwrap_or_default();
        log.debug(&format!(
            "[capture] hook fired, success={} msgs={} sid={}",
            event.success,
            messages.len(),
            session_id.unwrap_or("none")
        ));

        if !event.success {
            log.debug("[capture] skipped, run did not succeed");
            return;
        }
        if messages.is_empty() {
            log.debug("[capture] skipped, no messages in event");
            return;
        }
        let Some(session_id) = session_id else {
            log.debug("[capture] skipped, no session id available");
            return;
        };

        let all_turns = extract_turns(messages);
        if all_turns.is_empty() {
            log.debug(&format!(
                "[capture] skipped, no user-assistant turns found in {} messages (last roles: {})",
                messages.len(),
                last_roles(messages)
            ));
            return;
        }

        let turns = prepare_for_capture(&all_turns, now);
        if turns.is_empty() {
            log.debug("[capture] skipped, all turns too short after cleaning");
            return;
        }

        let source_id = hook_source_id(session_id);
        let metadata = CaptureMetadata::new("openclaw_hook", now).with_turn_count(turns.len());
        log.debug(&format!(
            "[capture] ingesting {} turns (of {} total) @ {} -> {source_id}",
            turns.len(),
            all_turns.len(),
            metadata.captured_at
        ));

        match self.api.ingest_conversation(&turns, &source_id, Some(&metadata)).await {
            Ok(_) => log.debug("[capture] ingestion succeeded"),
            Err(e) => log.error(&format!("[capture] hook error: {e}")),
        }
    }
}

fn last_roles(messages: &[Message]) -> String {
    let start = messages.len().saturating_sub(5);
    messages[start..]
        .iter()
        .map(|m| format!("{:?}", m.role))
        .collect::<Vec<_>>()
        .join(", ")
}
