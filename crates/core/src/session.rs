//! Session bookkeeping.
//!
//! The host tells us the active session id and the latest transcript on
//! each lifecycle event. Tools and slash commands run outside those
//! events, so the plugin keeps the last seen values here.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::message::Message;

/// Source id for turns captured automatically at the end of a run.
pub fn hook_source_id(session_id: &str) -> String {
    format!("oc_hook_{session_id}")
}

/// Source id for conversations saved through the store tool.
pub fn tool_source_id(session_id: &str) -> String {
    format!("oc_tool_{session_id}")
}

/// Source id for manual `/cortex-remember` entries.
pub fn session_source_id(session_id: &str) -> String {
    format!("oc_sess_{session_id}")
}

#[derive(Debug, Default)]
struct SessionInner {
    session_id: Option<String>,
    messages: Vec<Message>,
}

/// Shared, cheaply cloneable view of the active session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<RwLock<SessionInner>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record what a lifecycle event told us. `None` leaves the previous
    /// session id in place; an empty id counts as `None`.
    pub async fn observe(&self, session_id: Option<&str>, messages: Option<Vec<Message>>) {
        let mut inner = self.inner.write().await;
        if let Some(sid) = session_id.filter(|s| !s.is_empty()) {
            inner.session_id = Some(sid.to_string());
        }
        if let Some(messages) = messages {
            inner.messages = messages;
        }
    }

    pub async fn session_id(&self) -> Option<String> {
        self.inner.read().await.session_id.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.inner.read().await.messages.clone()
    }
}
