//! Lifecycle hooks: recall before a run, capture after it.

pub mod capture;
pub mod recall;

pub use capture::CaptureHook;
pub use recall::RecallHook;
