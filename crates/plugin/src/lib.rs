//! # cortexclaw plugin
//!
//! Long-term memory for an agent host, backed by Cortex AI.
//!
//! - Before each run, relevant memories are recalled and prepended to the
//!   prompt inside a `<cortex-context>` envelope.
//! - After each successful run, the conversation is captured and stored.
//! - Five agent tools and five slash commands expose the same operations
//!   on demand.
//!
//! Hosts call [`Registration::from_host_config`] with their plugin config
//! and route lifecycle events to the resulting [`CortexPlugin`].

pub mod commands;
pub mod events;
pub mod hooks;
pub mod plugin;

pub use commands::{COMMANDS, CommandSpec, SlashCommands};
pub use events::{AgentEnd, BeforeAgentStart, HookContext, PromptInjection};
pub use hooks::{CaptureHook, RecallHook};
pub use plugin::{CortexPlugin, MANIFEST, NOT_CONFIGURED_MSG, PLUGIN_ID, PluginManifest, Registration};
