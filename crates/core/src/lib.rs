//! # cortexclaw core
//!
//! Domain types, traits, and error definitions for the Cortex memory plugin.
//! The two central transforms live here and are pure:
//! - [`turns`]: flat transcript → `(user, assistant)` turns
//! - [`context`]: recall response → one prompt-ready text block
//!
//! The remote service is a trait ([`MemoryApi`]); its HTTP implementation
//! lives in `cortexclaw-client`.

pub mod error;
pub mod message;
pub mod turns;
pub mod recall;
pub mod context;
pub mod capture;
pub mod session;
pub mod log;
pub mod api;
pub mod tool;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export key types at crate root for ergonomics
pub use error::{ApiError, Error, Result, ToolError};
pub use message::{ContentBlock, Message, MessageContent, Role};
pub use turns::{ConversationTurn, extract_turns, latest_turn};
pub use recall::{Entity, GraphContext, PathTriplet, RecallResponse, Relation, ScoredPath, VectorChunk};
pub use context::{ContextAssembler, ContextOptions, build_context, envelope};
pub use session::SessionState;
pub use log::{Logger, NoopLogger, TracingLogger};
pub use api::{
    AddMemoryResponse, CaptureMetadata, DeleteMemoryResponse, FetchContentResponse, FetchMode, IngestTextOptions,
    ListMemoriesResponse, ListSourcesResponse, MemoryApi, MemoryResultItem, RecallMode, RecallOptions, SourceItem,
    UserMemory,
};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
